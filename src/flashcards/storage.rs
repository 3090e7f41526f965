//! Storage operations for decks and per-deck review progress
//!
//! Layout in the key-value store:
//! ```text
//! studyhub_decks_v1          # Array of all decks
//! studyhub_deck_progress_v1  # Map of deck id -> SessionProgress
//! ```

use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde_json::{Map, Value};
use thiserror::Error;

use super::models::*;
use crate::storage::{self, keys, KvStore, StorageError};

#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Flip first (so you see answer + why).")]
    FlipFirst,

    #[error("No cards found in that file.")]
    NoCardsFound,

    #[error("Invalid JSON.")]
    InvalidJson(#[source] serde_json::Error),
}

impl FlashcardError {
    /// True for user-facing rejections that left all state unchanged
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::FlipFirst | Self::NoCardsFound | Self::InvalidJson(_))
    }
}

pub type Result<T> = std::result::Result<T, FlashcardError>;

/// Deck and progress collections over a key-value store
#[derive(Clone, Copy)]
pub struct DeckStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> DeckStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    // ==================== Deck Operations ====================

    /// List all decks. Records that fail to decode are skipped.
    pub fn list_decks(&self) -> Vec<Deck> {
        storage::decode_records(storage::load_records(self.store, keys::DECKS), "deck")
    }

    /// Get a specific deck
    pub fn get_deck(&self, deck_id: &str) -> Option<Deck> {
        self.list_decks().into_iter().find(|d| d.id == deck_id)
    }

    /// Append a deck to the deck list. Stored records that fail to decode
    /// are written back untouched.
    pub fn add_deck(&self, deck: &Deck) -> Result<()> {
        let mut records = storage::load_records(self.store, keys::DECKS);
        records.push(serde_json::to_value(deck).map_err(StorageError::from)?);
        storage::save(self.store, keys::DECKS, &records)?;
        Ok(())
    }

    /// The deck to open when none is chosen: the example deck if present,
    /// otherwise the first one
    pub fn default_deck_id(&self) -> Option<String> {
        let decks = self.list_decks();
        if decks.iter().any(|d| d.id == EXAMPLE_DECK_ID) {
            return Some(EXAMPLE_DECK_ID.to_string());
        }
        decks.first().map(|d| d.id.clone())
    }

    /// Add the example deck from a JSON card file, unless already present.
    ///
    /// Returns whether the example deck is available afterwards. A missing
    /// or unreadable file only logs a warning.
    pub fn ensure_example_deck(&self, path: &Path) -> Result<bool> {
        if self.get_deck(EXAMPLE_DECK_ID).is_some() {
            return Ok(true);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Example deck not available at {:?}: {}", path, e);
                return Ok(false);
            }
        };
        let values: Vec<Value> = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                warn!("Example deck at {:?} is not a JSON card list: {}", path, e);
                return Ok(false);
            }
        };

        let deck = Deck {
            id: EXAMPLE_DECK_ID.to_string(),
            title: EXAMPLE_DECK_TITLE.to_string(),
            cards: normalize_stored_cards(&values),
        };
        self.add_deck(&deck)?;
        info!("Added example deck with {} cards", deck.cards.len());
        Ok(true)
    }

    // ==================== Progress Operations ====================

    /// Raw progress map, as stored
    fn progress_map(&self) -> Map<String, Value> {
        storage::load_or(self.store, keys::DECK_PROGRESS, Map::new)
    }

    /// Saved progress for a deck, if any. A malformed record counts as absent.
    pub fn get_progress(&self, deck_id: &str) -> Option<SessionProgress> {
        let value = self.progress_map().remove(deck_id)?;
        match serde_json::from_value(value) {
            Ok(progress) => Some(progress),
            Err(e) => {
                warn!("Ignoring malformed progress for deck {}: {}", deck_id, e);
                None
            }
        }
    }

    /// Store progress for a deck, replacing any previous record
    pub fn save_progress(&self, deck_id: &str, progress: &SessionProgress) -> Result<()> {
        let mut all = self.progress_map();
        all.insert(deck_id.to_string(), serde_json::to_value(progress).map_err(StorageError::from)?);
        storage::save(self.store, keys::DECK_PROGRESS, &all)?;
        Ok(())
    }

    /// Delete the progress record for a deck. No-op if absent.
    pub fn delete_progress(&self, deck_id: &str) -> Result<()> {
        let mut all = self.progress_map();
        if all.remove(deck_id).is_none() {
            debug!("No progress to delete for deck {}", deck_id);
            return Ok(());
        }
        storage::save(self.store, keys::DECK_PROGRESS, &all)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use tempfile::TempDir;

    fn deck(id: &str, cards: &[(&str, &str)]) -> Deck {
        Deck {
            id: id.to_string(),
            title: format!("Deck {}", id),
            cards: cards
                .iter()
                .map(|(cid, q)| Card {
                    id: cid.to_string(),
                    question: q.to_string(),
                    answer: "A".to_string(),
                    explanation: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_add_and_get_deck() {
        let store = MemoryStore::new();
        let decks = DeckStore::new(&store);

        decks.add_deck(&deck("d1", &[("c1", "Q1")])).unwrap();
        decks.add_deck(&deck("d2", &[])).unwrap();

        assert_eq!(decks.list_decks().len(), 2);
        assert_eq!(decks.get_deck("d1").unwrap().cards[0].question, "Q1");
        assert!(decks.get_deck("missing").is_none());
        assert_eq!(decks.default_deck_id().as_deref(), Some("d1"));
    }

    #[test]
    fn test_default_deck_prefers_example() {
        let store = MemoryStore::new();
        let decks = DeckStore::new(&store);
        decks.add_deck(&deck("d1", &[])).unwrap();
        decks.add_deck(&deck(EXAMPLE_DECK_ID, &[])).unwrap();

        assert_eq!(decks.default_deck_id().as_deref(), Some(EXAMPLE_DECK_ID));
    }

    #[test]
    fn test_progress_round_trip_and_delete() {
        let store = MemoryStore::new();
        let decks = DeckStore::new(&store);

        let progress = SessionProgress::new(
            vec!["b".to_string(), "a".to_string()],
            ReviewStats { correct: 1, wrong: 2 },
            true,
        );
        decks.save_progress("d1", &progress).unwrap();
        decks.save_progress("d2", &SessionProgress::new(Vec::new(), ReviewStats::default(), false)).unwrap();

        let loaded = decks.get_progress("d1").unwrap();
        assert_eq!(loaded.queue, vec!["b", "a"]);
        assert_eq!(loaded.stats.wrong, 2);

        decks.delete_progress("d1").unwrap();
        assert!(decks.get_progress("d1").is_none());
        assert!(decks.get_progress("d2").is_some());

        // deleting again is a no-op
        decks.delete_progress("d1").unwrap();
    }

    #[test]
    fn test_malformed_progress_record_is_ignored() {
        let store = MemoryStore::new();
        store.insert_raw(keys::DECK_PROGRESS, json!({"d1": {"queue": "nope"}}));

        assert!(DeckStore::new(&store).get_progress("d1").is_none());
    }

    #[test]
    fn test_malformed_deck_is_skipped() {
        let store = MemoryStore::new();
        store.insert_raw(
            keys::DECKS,
            json!([
                {"title": "no id", "cards": []},
                {"id": "d1", "title": "ok", "cards": [{"q": "Q", "a": "A"}]}
            ]),
        );

        let decks = DeckStore::new(&store).list_decks();
        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0].id, "d1");
    }

    #[test]
    fn test_add_deck_keeps_malformed_records() {
        let store = MemoryStore::new();
        store.insert_raw(keys::DECKS, json!([{"title": "no id yet", "cards": [{"q": "Q", "a": "A"}]}]));
        let decks = DeckStore::new(&store);

        decks.add_deck(&deck("d1", &[("c1", "Q1")])).unwrap();

        let stored = storage::load_records(&store, keys::DECKS);
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["title"], "no id yet");
        assert_eq!(decks.list_decks().len(), 1);
    }

    #[test]
    fn test_ensure_example_deck() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("example_deck.json");
        fs::write(&path, r#"[{"q":"Q1","a":"A1"},{"q":"Q2","a":"A2","why":"W"}]"#).unwrap();

        let store = MemoryStore::new();
        let decks = DeckStore::new(&store);

        assert!(decks.ensure_example_deck(&path).unwrap());
        assert!(decks.ensure_example_deck(&path).unwrap());

        let all = decks.list_decks();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, EXAMPLE_DECK_TITLE);
        assert_eq!(all[0].cards.len(), 2);
    }

    #[test]
    fn test_ensure_example_deck_missing_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let decks = DeckStore::new(&store);

        assert!(!decks.ensure_example_deck(&temp.path().join("nope.json")).unwrap());
        assert!(decks.list_decks().is_empty());
    }
}
