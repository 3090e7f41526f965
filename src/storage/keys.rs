//! Storage keys, shared with exported backups

pub const SETTINGS: &str = "studyhub_settings_v1";
pub const ACTIVITY: &str = "studyhub_activity_v1";
pub const DECKS: &str = "studyhub_decks_v1";
pub const DECK_PROGRESS: &str = "studyhub_deck_progress_v1";
pub const JOURNAL: &str = "studyhub_journal_v1";

/// Per-certification workspace key
pub fn cert(cert_id: &str) -> String {
    format!("studyhub_cert_{}_v1", cert_id)
}
