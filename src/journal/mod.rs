//! Freeform study journal

mod models;
mod storage;

pub use models::*;
pub use storage::{JournalStore, MAX_NOTES};
