//! Activity log and streak tracking module

pub mod models;
pub mod stats;
pub mod storage;

pub use models::*;
pub use storage::{ActivityLog, MAX_ENTRIES};
