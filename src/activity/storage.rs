//! Activity log storage
//!
//! The log is a single JSON array, newest entry first, capped at
//! [`MAX_ENTRIES`]. Entries that fail to decode are skipped individually
//! on read so one bad record does not hide the rest of the log. Writes
//! operate on the stored records, so such entries are kept as they are.

use log::debug;
use serde_json::{json, Map, Value};

use super::models::*;
use super::stats;
use crate::settings::SettingsStore;
use crate::storage::{self, keys, KvStore, Result, StorageError};
use crate::tags::normalize_tags;

/// Maximum number of entries kept; oldest are evicted first
pub const MAX_ENTRIES: usize = 5000;

/// Append-only activity log over a key-value store
#[derive(Clone, Copy)]
pub struct ActivityLog<'a> {
    store: &'a dyn KvStore,
}

impl<'a> ActivityLog<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// All entries in stored order (most recent first)
    pub fn list(&self) -> Vec<ActivityEntry> {
        storage::decode_records(storage::load_records(self.store, keys::ACTIVITY), "activity entry")
    }

    fn save_all(&self, entries: &[ActivityEntry]) -> Result<()> {
        storage::save(self.store, keys::ACTIVITY, entries)
    }

    /// Prepend an entry, assigning id and timestamp when absent
    pub fn append(&self, activity: NewActivity) -> Result<ActivityEntry> {
        let entry = activity.into_entry();

        let mut records = storage::load_records(self.store, keys::ACTIVITY);
        records.insert(0, serde_json::to_value(&entry)?);
        records.truncate(MAX_ENTRIES);
        storage::save(self.store, keys::ACTIVITY, &records)?;

        debug!("Logged {} activity {}", entry.kind, entry.id);
        Ok(entry)
    }

    /// Log a study entry from the did/learned/next form.
    ///
    /// Rejected when minutes is zero and every text field is empty.
    /// Also makes the entry's certification the current one.
    pub fn log_study(&self, form: StudyLogForm) -> Result<ActivityEntry> {
        let title = form.title.trim().to_string();
        let did = form.did.trim().to_string();
        let learned = form.learned.trim().to_string();
        let next = form.next.trim().to_string();
        let tags = normalize_tags(&form.tags);

        if title.is_empty() && did.is_empty() && learned.is_empty() && next.is_empty() && form.minutes == 0 {
            return Err(StorageError::InvalidInput(
                "Add minutes or at least one text field.".to_string(),
            ));
        }

        let details = [("Did", &did), ("Learned", &learned), ("Next", &next)]
            .iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(label, text)| format!("{}: {}", label, text))
            .collect::<Vec<_>>()
            .join(" | ");

        let mut meta = Map::new();
        meta.insert("tags".to_string(), json!(tags));
        meta.insert("did".to_string(), json!(did));
        meta.insert("learned".to_string(), json!(learned));
        meta.insert("next".to_string(), json!(next));

        let mut activity = NewActivity::new(form.cert_id.clone(), form.kind.unwrap_or(ActivityKind::StudySession))
            .minutes(form.minutes)
            .title(title)
            .details(details)
            .meta(meta);
        activity.timestamp = form.timestamp;

        let entry = self.append(activity)?;
        SettingsStore::new(self.store).set_current_cert(&form.cert_id)?;
        Ok(entry)
    }

    /// Remove an entry by id. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut records = storage::load_records(self.store, keys::ACTIVITY);
        let len_before = records.len();
        records.retain(|r| storage::record_id(r) != Some(id));

        if records.len() == len_before {
            debug!("No activity entry {} to delete", id);
            return Ok(false);
        }
        storage::save(self.store, keys::ACTIVITY, &records)?;
        Ok(true)
    }

    /// Empty the log
    pub fn clear(&self) -> Result<()> {
        self.save_all(&[])
    }

    /// Entries matching `filter`, newest first
    pub fn search(&self, filter: &ActivityFilter) -> Vec<ActivityEntry> {
        let query = filter
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        let tz = chrono::Local;

        let mut entries: Vec<ActivityEntry> = self
            .list()
            .into_iter()
            .filter(|e| filter.cert_id.as_deref().map_or(true, |c| e.cert_id == c))
            .filter(|e| filter.kind.as_ref().map_or(true, |k| &e.kind == k))
            .filter(|e| {
                let day = stats::day_key(&e.timestamp, &tz);
                filter.from_day.map_or(true, |from| day >= from)
                    && filter.to_day.map_or(true, |to| day <= to)
            })
            .filter(|e| query.as_deref().map_or(true, |q| e.search_haystack().contains(q)))
            .collect();

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    /// Dashboard totals as of now
    pub fn summary(&self) -> ActivitySummary {
        stats::summarize(&self.list(), &chrono::Local::now())
    }

    /// The log as pretty JSON, exactly as stored
    pub fn export_json(&self) -> Result<String> {
        let raw = storage::load_raw(self.store, keys::ACTIVITY, Value::Array(Vec::new()));
        Ok(serde_json::to_string_pretty(&raw)?)
    }
}
