//! Flashcard decks and the round-robin review engine
//!
//! This module provides:
//! - Deck and card models with import normalization
//! - Text and JSON card import parsing
//! - Per-deck review progress persistence
//! - The review engine (flip, mark, advance, shuffle, reset)

pub mod algorithm;
pub mod import;
pub mod models;
pub mod review;
pub mod storage;

pub use models::*;
pub use review::{MarkOutcome, ReviewEngine};
pub use storage::{DeckStore, FlashcardError};
