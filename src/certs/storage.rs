//! Certification workspace storage
//!
//! One key per certification (`studyhub_cert_<id>_v1`) holding notes,
//! study sessions and the objectives checklist.

use std::sync::OnceLock;

use chrono::Utc;
use log::{debug, warn};
use regex::Regex;
use serde_json::{Map, Value};

use super::models::*;
use crate::activity::{ActivityKind, ActivityLog, NewActivity};
use crate::settings::SettingsStore;
use crate::storage::{self, keys, KvStore, Result, StorageError};

/// Maximum number of sessions kept per certification
pub const MAX_SESSIONS: usize = 2000;

#[derive(Clone, Copy)]
pub struct CertStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> CertStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// Stored data for a certification, empty when none exists yet
    pub fn get(&self, cert_id: &str) -> CertData {
        storage::load_or(self.store, &keys::cert(cert_id), CertData::default)
    }

    /// The stored record as a raw object. Mutations go through this so
    /// sessions the typed model skips are written back unchanged.
    fn load_map(&self, cert_id: &str) -> Map<String, Value> {
        match storage::load_raw(self.store, &keys::cert(cert_id), Value::Null) {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                warn!("Data for {} is not an object, starting over", cert_id);
                Map::new()
            }
        }
    }

    /// Bump `updatedAt`, save, and return the decoded result
    fn save_map(&self, cert_id: &str, mut map: Map<String, Value>) -> Result<CertData> {
        map.insert("updatedAt".to_string(), serde_json::to_value(Utc::now())?);
        let value = Value::Object(map);
        self.store.set(&keys::cert(cert_id), &value)?;
        Ok(serde_json::from_value(value)?)
    }

    // ===== Notes =====

    pub fn set_notes(&self, cert_id: &str, notes: &str) -> Result<CertData> {
        let mut map = self.load_map(cert_id);
        map.insert("notes".to_string(), Value::String(notes.to_string()));
        self.save_map(cert_id, map)
    }

    // ===== Sessions =====

    /// Record a study session and mirror it into the activity log.
    ///
    /// Rejected when both topic and minutes are empty. The certification
    /// becomes the current one.
    pub fn add_session(&self, cert_id: &str, topic: &str, minutes: u32) -> Result<StudySession> {
        let topic = topic.trim();
        if topic.is_empty() && minutes == 0 {
            return Err(StorageError::InvalidInput("Add a topic and/or minutes.".to_string()));
        }

        let topic = if topic.is_empty() { "Study" } else { topic };
        let session = StudySession::new(topic.to_string(), minutes);

        let mut map = self.load_map(cert_id);
        let mut sessions = take_list(&mut map, "sessions");
        sessions.insert(0, serde_json::to_value(&session)?);
        sessions.truncate(MAX_SESSIONS);
        map.insert("sessions".to_string(), Value::Array(sessions));
        self.save_map(cert_id, map)?;

        ActivityLog::new(self.store).append(
            NewActivity::new(cert_id, ActivityKind::StudySession)
                .minutes(session.minutes)
                .title(session.topic.clone())
                .details("Logged from certification page.")
                .at(session.ts),
        )?;
        SettingsStore::new(self.store).set_current_cert(cert_id)?;

        Ok(session)
    }

    /// Remove a session by id. Returns whether anything was removed.
    pub fn delete_session(&self, cert_id: &str, session_id: &str) -> Result<bool> {
        let mut map = self.load_map(cert_id);
        let mut sessions = take_list(&mut map, "sessions");
        let len_before = sessions.len();
        sessions.retain(|s| storage::record_id(s) != Some(session_id));
        if sessions.len() == len_before {
            debug!("No session {} for {}", session_id, cert_id);
            return Ok(false);
        }
        map.insert("sessions".to_string(), Value::Array(sessions));
        self.save_map(cert_id, map)?;
        Ok(true)
    }

    // ===== Objectives =====

    /// Replace the checklist with one unchecked objective per non-blank line
    pub fn replace_objectives(&self, cert_id: &str, text: &str) -> Result<CertData> {
        let mut map = self.load_map(cert_id);
        map.insert("objectives".to_string(), serde_json::to_value(parse_objectives(text))?);
        self.save_map(cert_id, map)
    }

    /// Check or uncheck an objective. Out-of-range indexes are ignored.
    pub fn set_objective_done(&self, cert_id: &str, index: usize, done: bool) -> Result<bool> {
        self.edit_objectives(cert_id, |objectives| match objectives.get_mut(index) {
            Some(objective) => {
                objective.done = done;
                true
            }
            None => false,
        })
    }

    /// Remove an objective. Out-of-range indexes are ignored.
    pub fn remove_objective(&self, cert_id: &str, index: usize) -> Result<bool> {
        self.edit_objectives(cert_id, |objectives| {
            if index >= objectives.len() {
                return false;
            }
            objectives.remove(index);
            true
        })
    }

    /// Apply `f` to the checklist and save when it reports a change
    fn edit_objectives<F>(&self, cert_id: &str, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<Objective>) -> bool,
    {
        let mut map = self.load_map(cert_id);
        let mut objectives: Vec<Objective> = take_list(&mut map, "objectives")
            .into_iter()
            .map(Objective::from)
            .collect();
        if !f(&mut objectives) {
            return Ok(false);
        }
        map.insert("objectives".to_string(), serde_json::to_value(&objectives)?);
        self.save_map(cert_id, map)?;
        Ok(true)
    }

    // ===== Export =====

    pub fn export(&self, cert_id: &str) -> CertExport {
        CertExport {
            exported_at: Utc::now(),
            cert_id: cert_id.to_string(),
            data: self.get(cert_id),
        }
    }
}

/// Remove the list stored under `field`; anything that is not a list
/// reads as empty
fn take_list(map: &mut Map<String, Value>, field: &str) -> Vec<Value> {
    match map.remove(field) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn list_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"^(?:[-*]\s+|\d+\.\s+)").expect("valid list marker regex"))
}

/// Strip a leading bullet (`- `, `* `) or ordinal (`1. `) from a line
pub fn sanitize_line(line: &str) -> String {
    list_marker().replace(line.trim(), "").trim().to_string()
}

/// One objective per non-blank line, all unchecked
pub fn parse_objectives(text: &str) -> Vec<Objective> {
    text.lines()
        .map(sanitize_line)
        .filter(|line| !line.is_empty())
        .map(|text| Objective { text, done: false })
        .collect()
}
