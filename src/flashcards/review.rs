//! Active deck review session
//!
//! Holds the queue of the deck being studied, the flip state of the head
//! card, running stats and the shuffle toggle. Every mutation is written
//! back to the deck progress store before returning.

use std::fs;
use std::path::Path;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::algorithm::{light_shuffle, queue_ids, reconcile_queue, rotate, truncate_chars};
use super::import::{is_json_file, parse_json_cards, parse_text_cards, title_from_path};
use super::models::*;
use super::storage::{DeckStore, FlashcardError, Result};
use crate::activity::{ActivityEntry, ActivityKind, ActivityLog, NewActivity};
use crate::settings::SettingsStore;
use crate::storage::KvStore;

/// Longest question excerpt copied into the activity log
const DETAILS_MAX_CHARS: usize = 120;

#[derive(Debug, Clone, Default)]
struct ReviewState {
    deck_id: String,
    deck_title: String,
    cards: Vec<Card>,
    queue: Vec<Card>,
    flipped: bool,
    shuffle: bool,
    stats: ReviewStats,
}

/// Result of grading the head card
#[derive(Debug, Clone)]
pub struct MarkOutcome {
    pub card: Card,
    pub correct: bool,
    pub activity: ActivityEntry,
}

/// Deck review engine over a key-value store.
///
/// Single-threaded: one engine per store, never shared across threads.
pub struct ReviewEngine<'a> {
    store: &'a dyn KvStore,
    decks: DeckStore<'a>,
    state: ReviewState,
    rng: StdRng,
}

impl<'a> ReviewEngine<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Engine with a caller-provided shuffle RNG
    pub fn with_rng(store: &'a dyn KvStore, rng: StdRng) -> Self {
        Self {
            store,
            decks: DeckStore::new(store),
            state: ReviewState::default(),
            rng,
        }
    }

    pub fn decks(&self) -> DeckStore<'a> {
        self.decks
    }

    // ==================== Session Accessors ====================

    /// Id of the loaded deck, if any
    pub fn deck_id(&self) -> Option<&str> {
        if self.state.deck_id.is_empty() {
            None
        } else {
            Some(&self.state.deck_id)
        }
    }

    /// Head of the queue, if the deck has cards
    pub fn current_card(&self) -> Option<&Card> {
        self.state.queue.first()
    }

    pub fn queue(&self) -> &[Card] {
        &self.state.queue
    }

    pub fn is_flipped(&self) -> bool {
        self.state.flipped
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.state.shuffle
    }

    pub fn stats(&self) -> ReviewStats {
        self.state.stats
    }

    pub fn snapshot(&self) -> ReviewSnapshot {
        ReviewSnapshot {
            deck_id: self.state.deck_id.clone(),
            deck_title: self.state.deck_title.clone(),
            deck_size: self.state.cards.len(),
            stats: self.state.stats,
            shuffle: self.state.shuffle,
            flipped: self.state.flipped,
            current: self.current_card().cloned(),
        }
    }

    // ==================== Session Operations ====================

    /// Make `deck_id` the active deck, restoring saved progress.
    ///
    /// Returns `false` without touching anything when the deck does not
    /// exist.
    pub fn load_deck(&mut self, deck_id: &str) -> Result<bool> {
        let Some(deck) = self.decks.get_deck(deck_id) else {
            debug!("Deck {} not found, nothing loaded", deck_id);
            return Ok(false);
        };

        let (queue, stats, shuffle) = match self.decks.get_progress(deck_id) {
            Some(progress) => (
                reconcile_queue(&progress.queue, &deck.cards),
                progress.stats,
                progress.shuffle,
            ),
            None => (deck.cards.clone(), ReviewStats::default(), false),
        };

        self.state = ReviewState {
            deck_id: deck.id,
            deck_title: deck.title,
            cards: deck.cards,
            queue,
            flipped: false,
            shuffle,
            stats,
        };
        self.persist()?;

        info!("Loaded: {} ({} cards)", self.state.deck_title, self.state.cards.len());
        Ok(true)
    }

    /// Toggle between question and answer. Not persisted.
    pub fn flip(&mut self) -> bool {
        self.state.flipped = !self.state.flipped;
        self.state.flipped
    }

    /// Grade the head card and send it to the back of the queue.
    ///
    /// The answer must be showing: otherwise [`FlashcardError::FlipFirst`]
    /// is returned and nothing changes. Returns `Ok(None)` for an empty
    /// queue.
    pub fn mark(&mut self, correct: bool) -> Result<Option<MarkOutcome>> {
        if !self.state.flipped {
            return Err(FlashcardError::FlipFirst);
        }
        let Some(card) = self.current_card().cloned() else {
            return Ok(None);
        };

        if correct {
            self.state.stats.correct = self.state.stats.correct.saturating_add(1);
        } else {
            self.state.stats.wrong = self.state.stats.wrong.saturating_add(1);
        }

        rotate(&mut self.state.queue);
        if self.state.shuffle {
            light_shuffle(&mut self.state.queue, &mut self.rng);
        }
        self.state.flipped = false;
        self.persist()?;

        let cert_id = SettingsStore::new(self.store).get().current_cert;
        let activity = ActivityLog::new(self.store).append(
            NewActivity::new(cert_id, ActivityKind::CardsSession)
                .title(format!("Card: {}", if correct { "correct" } else { "wrong" }))
                .details(truncate_chars(&card.question, DETAILS_MAX_CHARS)),
        )?;

        Ok(Some(MarkOutcome {
            card,
            correct,
            activity,
        }))
    }

    /// Skip the head card without grading it
    pub fn advance(&mut self) -> Result<()> {
        if self.state.queue.is_empty() {
            return Ok(());
        }
        rotate(&mut self.state.queue);
        self.state.flipped = false;
        self.persist()
    }

    /// Toggle shuffling. The queue is only reshuffled on the next mark.
    pub fn toggle_shuffle(&mut self) -> Result<bool> {
        self.state.shuffle = !self.state.shuffle;
        self.persist()?;
        Ok(self.state.shuffle)
    }

    /// Forget saved progress for a deck and reload it in natural order
    pub fn reset_progress(&mut self, deck_id: &str) -> Result<bool> {
        self.decks.delete_progress(deck_id)?;
        self.load_deck(deck_id)
    }

    /// Create a deck from parsed records and make it the active deck.
    ///
    /// Rejected with [`FlashcardError::NoCardsFound`] when no record
    /// survives normalization.
    pub fn import_deck(&mut self, raw: Vec<RawCard>, title: &str) -> Result<Deck> {
        let cards = normalize_cards(raw);
        if cards.is_empty() {
            return Err(FlashcardError::NoCardsFound);
        }

        let deck = Deck::new(title.to_string(), cards);
        self.decks.add_deck(&deck)?;
        info!("Imported deck: {} ({} cards)", deck.title, deck.cards.len());

        self.load_deck(&deck.id)?;
        Ok(deck)
    }

    /// Read a `.json` or text card file and import it as a new deck
    /// titled after the file name
    pub fn import_file(&mut self, path: &Path) -> Result<Deck> {
        let text = fs::read_to_string(path)?;
        let raw = if is_json_file(path) {
            parse_json_cards(&text).map_err(FlashcardError::InvalidJson)?
        } else {
            parse_text_cards(&text)
        };
        self.import_deck(raw, &title_from_path(path))
    }

    fn persist(&self) -> Result<()> {
        if self.state.deck_id.is_empty() {
            return Ok(());
        }
        let progress = SessionProgress::new(
            queue_ids(&self.state.queue),
            self.state.stats,
            self.state.shuffle,
        );
        self.decks.save_progress(&self.state.deck_id, &progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use tempfile::TempDir;

    fn seeded(store: &MemoryStore) -> ReviewEngine<'_> {
        ReviewEngine::with_rng(store, StdRng::seed_from_u64(42))
    }

    fn add_deck(store: &MemoryStore, id: &str, card_ids: &[&str]) -> Deck {
        let deck = Deck {
            id: id.to_string(),
            title: format!("Deck {}", id),
            cards: card_ids
                .iter()
                .map(|cid| Card {
                    id: cid.to_string(),
                    question: format!("Question {}", cid),
                    answer: format!("Answer {}", cid),
                    explanation: String::new(),
                })
                .collect(),
        };
        DeckStore::new(store).add_deck(&deck).unwrap();
        deck
    }

    fn queue_order(engine: &ReviewEngine<'_>) -> Vec<String> {
        queue_ids(engine.queue())
    }

    #[test]
    fn test_load_missing_deck_is_noop() {
        let store = MemoryStore::new();
        let mut engine = seeded(&store);

        assert!(!engine.load_deck("nope").unwrap());
        assert!(engine.deck_id().is_none());
        assert!(engine.current_card().is_none());
        assert!(DeckStore::new(&store).get_progress("nope").is_none());
    }

    #[test]
    fn test_first_load_uses_natural_order_and_persists() {
        let store = MemoryStore::new();
        add_deck(&store, "d1", &["a", "b", "c"]);
        let mut engine = seeded(&store);

        assert!(engine.load_deck("d1").unwrap());
        assert_eq!(queue_order(&engine), vec!["a", "b", "c"]);
        assert_eq!(engine.current_card().unwrap().id, "a");
        assert_eq!(engine.stats(), ReviewStats::default());
        assert!(!engine.is_flipped());
        assert!(!engine.shuffle_enabled());

        let progress = DeckStore::new(&store).get_progress("d1").unwrap();
        assert_eq!(progress.queue, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_deck_has_no_current_card() {
        let store = MemoryStore::new();
        add_deck(&store, "empty", &[]);
        let mut engine = seeded(&store);

        assert!(engine.load_deck("empty").unwrap());
        assert!(engine.current_card().is_none());

        engine.flip();
        assert!(engine.mark(true).unwrap().is_none());
        engine.advance().unwrap();
        assert_eq!(engine.stats(), ReviewStats::default());
    }

    #[test]
    fn test_mark_requires_flip() {
        let store = MemoryStore::new();
        add_deck(&store, "d1", &["a", "b", "c"]);
        let mut engine = seeded(&store);
        engine.load_deck("d1").unwrap();

        let err = engine.mark(true).unwrap_err();
        assert!(matches!(err, FlashcardError::FlipFirst));
        assert!(err.is_rejection());

        assert_eq!(engine.stats(), ReviewStats::default());
        assert_eq!(queue_order(&engine), vec!["a", "b", "c"]);
        assert!(!engine.is_flipped());
        assert!(ActivityLog::new(&store).list().is_empty());
    }

    #[test]
    fn test_mark_rotates_counts_and_logs() {
        let store = MemoryStore::new();
        add_deck(&store, "d1", &["a", "b", "c"]);
        SettingsStore::new(&store).set_current_cert("secplus").unwrap();
        let mut engine = seeded(&store);
        engine.load_deck("d1").unwrap();

        engine.flip();
        let outcome = engine.mark(false).unwrap().unwrap();

        assert_eq!(outcome.card.id, "a");
        assert_eq!(queue_order(&engine), vec!["b", "c", "a"]);
        assert_eq!(engine.stats(), ReviewStats { correct: 0, wrong: 1 });
        assert!(!engine.is_flipped());

        let log = ActivityLog::new(&store).list();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, ActivityKind::CardsSession);
        assert_eq!(log[0].cert_id, "secplus");
        assert_eq!(log[0].title, "Card: wrong");
        assert_eq!(log[0].details, "Question a");
        assert_eq!(log[0].minutes, 0);

        let progress = DeckStore::new(&store).get_progress("d1").unwrap();
        assert_eq!(progress.queue, vec!["b", "c", "a"]);
        assert_eq!(progress.stats.wrong, 1);
    }

    #[test]
    fn test_full_cycle_returns_to_original_order() {
        let store = MemoryStore::new();
        add_deck(&store, "d1", &["a", "b", "c", "d"]);
        let mut engine = seeded(&store);
        engine.load_deck("d1").unwrap();

        let grades = [true, false, true, true];
        for (i, correct) in grades.iter().enumerate() {
            engine.flip();
            let outcome = engine.mark(*correct).unwrap().unwrap();
            // the graded card sits at the tail until the queue comes round
            assert_eq!(engine.queue().last().unwrap().id, outcome.card.id);
            assert_eq!(engine.queue().len(), 4);
            assert_eq!(outcome.card.id, ["a", "b", "c", "d"][i]);
        }

        assert_eq!(queue_order(&engine), vec!["a", "b", "c", "d"]);
        assert_eq!(engine.stats(), ReviewStats { correct: 3, wrong: 1 });
    }

    #[test]
    fn test_mark_truncates_long_question() {
        let store = MemoryStore::new();
        let long_question = "x".repeat(300);
        let deck = Deck {
            id: "long".to_string(),
            title: "Long".to_string(),
            cards: vec![Card {
                id: "c".to_string(),
                question: long_question,
                answer: "A".to_string(),
                explanation: String::new(),
            }],
        };
        DeckStore::new(&store).add_deck(&deck).unwrap();
        let mut engine = seeded(&store);
        engine.load_deck("long").unwrap();

        engine.flip();
        let outcome = engine.mark(true).unwrap().unwrap();
        assert_eq!(outcome.activity.details.chars().count(), DETAILS_MAX_CHARS);
    }

    #[test]
    fn test_advance_skips_without_grading() {
        let store = MemoryStore::new();
        add_deck(&store, "d1", &["a", "b", "c"]);
        let mut engine = seeded(&store);
        engine.load_deck("d1").unwrap();

        engine.flip();
        engine.advance().unwrap();

        assert_eq!(queue_order(&engine), vec!["b", "c", "a"]);
        assert!(!engine.is_flipped());
        assert_eq!(engine.stats(), ReviewStats::default());
        assert!(ActivityLog::new(&store).list().is_empty());
        assert_eq!(DeckStore::new(&store).get_progress("d1").unwrap().queue, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_shuffle_toggle_persists_and_applies_on_mark() {
        let store = MemoryStore::new();
        let ids: Vec<String> = (0..8).map(|i| format!("c{}", i)).collect();
        let id_refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
        add_deck(&store, "d1", &id_refs);
        let mut engine = seeded(&store);
        engine.load_deck("d1").unwrap();

        assert!(engine.toggle_shuffle().unwrap());
        assert_eq!(queue_order(&engine), ids);
        assert!(DeckStore::new(&store).get_progress("d1").unwrap().shuffle);

        engine.flip();
        engine.mark(true).unwrap();

        let mut order = queue_order(&engine);
        assert_eq!(order.len(), 8);
        assert_eq!(order[0], "c1");
        order.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_reload_restores_and_reconciles_progress() {
        let store = MemoryStore::new();
        add_deck(&store, "d1", &["a", "b", "c"]);
        {
            let mut engine = seeded(&store);
            engine.load_deck("d1").unwrap();
            engine.flip();
            engine.mark(true).unwrap();
            engine.toggle_shuffle().unwrap();
        }

        // deck content changed since the last session: "b" removed, "d" added
        let decks = DeckStore::new(&store);
        let mut deck = decks.get_deck("d1").unwrap();
        deck.cards.retain(|c| c.id != "b");
        deck.cards.push(Card {
            id: "d".to_string(),
            question: "Question d".to_string(),
            answer: "Answer d".to_string(),
            explanation: String::new(),
        });
        crate::storage::save(&store, crate::storage::keys::DECKS, &vec![deck]).unwrap();

        let mut engine = seeded(&store);
        engine.load_deck("d1").unwrap();
        assert_eq!(queue_order(&engine), vec!["c", "a", "d"]);
        assert_eq!(engine.stats(), ReviewStats { correct: 1, wrong: 0 });
        assert!(engine.shuffle_enabled());
        assert!(!engine.is_flipped());
    }

    #[test]
    fn test_reset_progress_restores_natural_order() {
        let store = MemoryStore::new();
        add_deck(&store, "d1", &["a", "b", "c"]);
        let mut engine = seeded(&store);
        engine.load_deck("d1").unwrap();
        engine.toggle_shuffle().unwrap();
        for _ in 0..2 {
            engine.flip();
            engine.mark(false).unwrap();
        }

        assert!(engine.reset_progress("d1").unwrap());
        assert_eq!(queue_order(&engine), vec!["a", "b", "c"]);
        assert_eq!(engine.stats(), ReviewStats { correct: 0, wrong: 0 });
        assert!(!engine.shuffle_enabled());
    }

    #[test]
    fn test_import_deck_becomes_active() {
        let store = MemoryStore::new();
        let mut engine = seeded(&store);

        let deck = engine
            .import_deck(parse_text_cards("Q1\nA1\n\nQ2\nA2\nWhy2"), "ports")
            .unwrap();

        assert!(deck.id.starts_with("deck_"));
        assert_eq!(deck.cards.len(), 2);
        assert_eq!(engine.deck_id(), Some(deck.id.as_str()));
        assert_eq!(engine.current_card().unwrap().question, "Q1");
        assert_eq!(DeckStore::new(&store).list_decks().len(), 1);
    }

    #[test]
    fn test_import_with_repeated_ids_keeps_every_card_queued() {
        let store = MemoryStore::new();
        let mut engine = seeded(&store);
        let raw = parse_json_cards(r#"[{"id":"x","q":"Q1","a":"A1"},{"id":"x","q":"Q2","a":"A2"}]"#).unwrap();

        let deck = engine.import_deck(raw, "dupes").unwrap();
        assert_eq!(engine.queue().len(), 2);

        let mut reloaded = seeded(&store);
        reloaded.load_deck(&deck.id).unwrap();
        let questions: Vec<&str> = reloaded.queue().iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["Q1", "Q2"]);
        assert_eq!(DeckStore::new(&store).get_progress(&deck.id).unwrap().queue.len(), 2);
    }

    #[test]
    fn test_mark_saturates_stored_counters() {
        let store = MemoryStore::new();
        add_deck(&store, "d1", &["a", "b"]);
        DeckStore::new(&store)
            .save_progress(
                "d1",
                &SessionProgress::new(Vec::new(), ReviewStats { correct: u32::MAX, wrong: 0 }, false),
            )
            .unwrap();

        let mut engine = seeded(&store);
        engine.load_deck("d1").unwrap();
        engine.flip();
        engine.mark(true).unwrap();

        assert_eq!(engine.stats().correct, u32::MAX);
    }

    #[test]
    fn test_import_without_valid_cards_is_rejected() {
        let store = MemoryStore::new();
        let mut engine = seeded(&store);

        let err = engine
            .import_deck(vec![RawCard::new("only a question", "", "")], "bad")
            .unwrap_err();
        assert!(matches!(err, FlashcardError::NoCardsFound));
        assert!(DeckStore::new(&store).list_decks().is_empty());
        assert!(engine.deck_id().is_none());
    }

    #[test]
    fn test_import_file_by_extension() {
        let temp = TempDir::new().unwrap();
        let json_path = temp.path().join("acronyms.json");
        fs::write(&json_path, r#"[{"question":"PKI?","answer":"Public key infrastructure"}]"#).unwrap();
        let text_path = temp.path().join("ports.txt");
        fs::write(&text_path, "SSH port\n22\n\nDNS port\n53\nUDP and TCP").unwrap();
        let bad_path = temp.path().join("broken.json");
        fs::write(&bad_path, "[{").unwrap();

        let store = MemoryStore::new();
        let mut engine = seeded(&store);

        let json_deck = engine.import_file(&json_path).unwrap();
        assert_eq!(json_deck.title, "acronyms");
        assert_eq!(json_deck.cards.len(), 1);

        let text_deck = engine.import_file(&text_path).unwrap();
        assert_eq!(text_deck.title, "ports");
        assert_eq!(text_deck.cards[1].explanation, "UDP and TCP");

        let err = engine.import_file(&bad_path).unwrap_err();
        assert!(matches!(err, FlashcardError::InvalidJson(_)));
        assert_eq!(DeckStore::new(&store).list_decks().len(), 2);
    }

    #[test]
    fn test_snapshot_reflects_session() {
        let store = MemoryStore::new();
        add_deck(&store, "d1", &["a", "b"]);
        let mut engine = seeded(&store);
        engine.load_deck("d1").unwrap();
        engine.flip();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.deck_id, "d1");
        assert_eq!(snapshot.deck_title, "Deck d1");
        assert_eq!(snapshot.deck_size, 2);
        assert!(snapshot.flipped);
        assert_eq!(snapshot.current.unwrap().id, "a");
    }
}
