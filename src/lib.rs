//! StudyHub: flashcard review, activity streaks and certification study
//! tracking over a pluggable key-value store.

pub mod activity;
pub mod backup;
pub mod certs;
pub mod config;
pub mod flashcards;
pub mod hub;
pub mod journal;
pub mod settings;
pub mod storage;
pub mod tags;

pub use hub::StudyHub;
