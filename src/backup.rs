//! Full backup export
//!
//! Every collection is copied exactly as stored so the document can be
//! re-imported by any tool that understands the storage keys.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::certs::{CertData, CertStore, CERTIFICATIONS};
use crate::settings::{Settings, SettingsStore};
use crate::storage::{self, keys, KvStore, Result};

/// Default file name for a full backup
pub const BACKUP_FILE_NAME: &str = "studyhub_backup.json";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(rename = "exported_at")]
    pub exported_at: DateTime<Utc>,
    pub settings: Settings,
    pub activity: Value,
    /// One entry per catalog certification
    pub certs: BTreeMap<String, CertData>,
    pub decks: Value,
    pub deck_progress: Value,
    pub journal: Value,
}

/// Snapshot every stored collection
pub fn export_all(store: &dyn KvStore) -> Backup {
    let certs = CertStore::new(store);

    Backup {
        exported_at: Utc::now(),
        settings: SettingsStore::new(store).get(),
        activity: storage::load_raw(store, keys::ACTIVITY, Value::Array(Vec::new())),
        certs: CERTIFICATIONS
            .iter()
            .map(|c| (c.id.to_string(), certs.get(c.id)))
            .collect(),
        decks: storage::load_raw(store, keys::DECKS, Value::Array(Vec::new())),
        deck_progress: storage::load_raw(store, keys::DECK_PROGRESS, Value::Object(Map::new())),
        journal: storage::load_raw(store, keys::JOURNAL, Value::Array(Vec::new())),
    }
}

/// Write a full backup as pretty JSON
pub fn write_backup(store: &dyn KvStore, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_all(store))?;
    fs::write(path, json)?;
    info!("Exported backup to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityKind, ActivityLog, NewActivity};
    use crate::journal::{JournalStore, NewNote};
    use crate::storage::MemoryStore;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_export_empty_store() {
        let store = MemoryStore::new();
        let value = serde_json::to_value(export_all(&store)).unwrap();

        assert_eq!(value["settings"]["currentCert"], "netplus");
        assert_eq!(value["activity"], json!([]));
        assert_eq!(value["decks"], json!([]));
        assert_eq!(value["deckProgress"], json!({}));
        assert_eq!(value["journal"], json!([]));
        assert!(value.get("exported_at").is_some());

        let certs = value["certs"].as_object().unwrap();
        assert_eq!(certs.len(), CERTIFICATIONS.len());
        assert_eq!(certs["secai"]["notes"], "");
    }

    #[test]
    fn test_export_contains_every_collection() {
        let store = MemoryStore::new();
        ActivityLog::new(&store)
            .append(NewActivity::new("secplus", ActivityKind::StudySession).minutes(15))
            .unwrap();
        JournalStore::new(&store)
            .add(NewNote {
                cert_id: "secplus".to_string(),
                title: "Hashing".to_string(),
                ..Default::default()
            })
            .unwrap();
        CertStore::new(&store).set_notes("netplus", "subnet cheat sheet").unwrap();
        store.insert_raw(keys::DECKS, json!([{"id": "d1", "title": "T", "cards": []}]));
        store.insert_raw(keys::DECK_PROGRESS, json!({"d1": {"queue": [], "shuffle": true}}));

        let value = serde_json::to_value(export_all(&store)).unwrap();
        assert_eq!(value["activity"][0]["minutes"], 15);
        assert_eq!(value["journal"][0]["title"], "Hashing");
        assert_eq!(value["certs"]["netplus"]["notes"], "subnet cheat sheet");
        assert_eq!(value["decks"][0]["id"], "d1");
        assert_eq!(value["deckProgress"]["d1"]["shuffle"], true);
        assert_eq!(value["settings"]["currentCert"], "secplus");
    }

    #[test]
    fn test_write_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(BACKUP_FILE_NAME);
        let store = MemoryStore::new();

        write_backup(&store, &path).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written["certs"]["netplus"].is_object());
    }
}
