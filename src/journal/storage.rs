//! Journal storage

use log::debug;
use serde_json::Value;

use super::models::*;
use crate::settings::SettingsStore;
use crate::storage::{self, keys, KvStore, Result, StorageError};
use crate::tags::normalize_tags;

/// Maximum number of notes kept; oldest are evicted first
pub const MAX_NOTES: usize = 5000;

#[derive(Clone, Copy)]
pub struct JournalStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> JournalStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// All notes in stored order (most recent first)
    pub fn list(&self) -> Vec<JournalNote> {
        storage::decode_records(storage::load_records(self.store, keys::JOURNAL), "journal note")
    }

    /// Add a note. Rejected when both title and body are empty.
    pub fn add(&self, request: NewNote) -> Result<JournalNote> {
        let title = request.title.trim().to_string();
        let body = request.body.trim().to_string();
        if title.is_empty() && body.is_empty() {
            return Err(StorageError::InvalidInput("Add a title or body.".to_string()));
        }

        let note = JournalNote::new(request.cert_id.clone(), title, body, normalize_tags(&request.tags));

        let mut records = storage::load_records(self.store, keys::JOURNAL);
        records.insert(0, serde_json::to_value(&note)?);
        records.truncate(MAX_NOTES);
        storage::save(self.store, keys::JOURNAL, &records)?;

        SettingsStore::new(self.store).set_current_cert(&request.cert_id)?;
        Ok(note)
    }

    /// Remove a note by id. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut records = storage::load_records(self.store, keys::JOURNAL);
        let len_before = records.len();
        records.retain(|r| storage::record_id(r) != Some(id));
        if records.len() == len_before {
            debug!("No journal note {} to delete", id);
            return Ok(false);
        }
        storage::save(self.store, keys::JOURNAL, &records)?;
        Ok(true)
    }

    /// Notes newest first, optionally narrowed by query and certification
    pub fn search(&self, query: Option<&str>, cert_id: Option<&str>) -> Vec<JournalNote> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        let mut notes: Vec<JournalNote> = self
            .list()
            .into_iter()
            .filter(|n| cert_id.map_or(true, |c| n.cert_id == c))
            .filter(|n| query.map_or(true, |q| n.matches(q)))
            .collect();
        notes.sort_by(|a, b| b.ts.cmp(&a.ts));
        notes
    }

    /// The journal as pretty JSON, exactly as stored
    pub fn export_json(&self) -> Result<String> {
        let raw = storage::load_raw(self.store, keys::JOURNAL, Value::Array(Vec::new()));
        Ok(serde_json::to_string_pretty(&raw)?)
    }
}
