//! Data models for the flashcard system

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::storage::lenient;

/// Fixed id of the bundled example deck
pub const EXAMPLE_DECK_ID: &str = "example";
pub const EXAMPLE_DECK_TITLE: &str = "Example Deck (Basics)";

/// A named, ordered collection of cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "stored_cards")]
    pub cards: Vec<Card>,
}

impl Deck {
    /// Create an imported deck with a fresh id
    pub fn new(title: String, cards: Vec<Card>) -> Self {
        Self {
            id: format!("deck_{}", Uuid::new_v4()),
            title,
            cards,
        }
    }
}

/// A flashcard with question (front), answer and optional explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "a")]
    pub answer: String,
    #[serde(rename = "why", default)]
    pub explanation: String,
}

impl Card {
    /// Normalize a raw record. Returns `None` when question or answer is
    /// empty after trimming; `fallback_id` supplies an id when none is set.
    pub fn from_raw(raw: RawCard, fallback_id: impl FnOnce(&str, &str) -> String) -> Option<Self> {
        let question = raw.q.trim().to_string();
        let answer = raw.a.trim().to_string();
        if question.is_empty() || answer.is_empty() {
            return None;
        }

        let id = match raw.id.trim() {
            "" => fallback_id(&question, &answer),
            id => id.to_string(),
        };

        Some(Self {
            id,
            question,
            answer,
            explanation: raw.why.trim().to_string(),
        })
    }
}

/// An unvalidated card record as produced by an importer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub id: String,
    pub q: String,
    pub a: String,
    pub why: String,
}

impl RawCard {
    pub fn new(q: impl Into<String>, a: impl Into<String>, why: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            q: q.into(),
            a: a.into(),
            why: why.into(),
        }
    }

    /// Read a `{q|question, a|answer, why|explanation, id}` record.
    /// Non-object values yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| obj.get(*name))
                .map(lenient::to_text)
                .unwrap_or_default()
        };

        Some(Self {
            id: field(&["id"]),
            q: field(&["q", "question"]),
            a: field(&["a", "answer"]),
            why: field(&["why", "explanation"]),
        })
    }
}

/// Normalize freshly imported records. Missing or repeated ids get a
/// random one.
pub fn normalize_cards(raw: Vec<RawCard>) -> Vec<Card> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|r| Card::from_raw(r, |_, _| Uuid::new_v4().to_string()))
        .map(|mut card| {
            if !seen.insert(card.id.clone()) {
                card.id = Uuid::new_v4().to_string();
                seen.insert(card.id.clone());
            }
            card
        })
        .collect()
}

/// Normalize records read back from storage. Missing or repeated ids are
/// derived from position and content so they stay stable between loads.
pub fn normalize_stored_cards(values: &[Value]) -> Vec<Card> {
    let mut seen = HashSet::new();
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let raw = RawCard::from_value(value)?;
            let mut card = Card::from_raw(raw, |q, a| positional_id(index, q, a))?;
            if !seen.insert(card.id.clone()) {
                card.id = positional_id(index, &card.question, &card.answer);
                seen.insert(card.id.clone());
            }
            Some(card)
        })
        .collect()
}

fn positional_id(index: usize, question: &str, answer: &str) -> String {
    let name = format!("{}\u{1f}{}\u{1f}{}", index, question, answer);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

fn stored_cards<'de, D>(deserializer: D) -> Result<Vec<Card>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(normalize_stored_cards(&values))
}

/// Running correctness counters for a deck session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub wrong: u32,
}

impl ReviewStats {
    pub fn total(&self) -> u32 {
        self.correct.saturating_add(self.wrong)
    }
}

/// Persisted review state for one deck
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Card ids in current rotation order
    #[serde(default, alias = "queueOrder")]
    pub queue: Vec<String>,
    #[serde(default)]
    pub stats: ReviewStats,
    #[serde(default, alias = "shuffleEnabled")]
    pub shuffle: bool,
}

impl SessionProgress {
    pub fn new(queue: Vec<String>, stats: ReviewStats, shuffle: bool) -> Self {
        Self {
            updated_at: Utc::now(),
            queue,
            stats,
            shuffle,
        }
    }
}

/// Read-only view of the active review session, used for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSnapshot {
    pub deck_id: String,
    pub deck_title: String,
    pub deck_size: usize,
    pub stats: ReviewStats,
    pub shuffle: bool,
    pub flipped: bool,
    pub current: Option<Card>,
}
