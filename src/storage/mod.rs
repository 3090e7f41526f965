//! Persistence boundary for every StudyHub collection
//!
//! All state lives in a key-value store holding JSON documents. Each
//! collection is read whole, modified in memory and written back after
//! every mutation (last writer wins).

mod file_storage;
mod memory;
pub mod keys;
pub mod lenient;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use file_storage::{FileStore, Result, StorageError};
pub use memory::MemoryStore;

/// Key-value persistence collaborator
pub trait KvStore {
    /// Fetch the JSON value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the JSON value stored under `key`
    fn set(&self, key: &str, value: &Value) -> Result<()>;
}

/// Decode the value under `key`, falling back to `fallback` when it is
/// missing, unreadable or malformed.
pub fn load_or<T, F>(store: &dyn KvStore, key: &str, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match store.get(key) {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Malformed data under {}, using default: {}", key, e);
                fallback()
            }
        },
        Ok(None) => fallback(),
        Err(e) => {
            warn!("Failed to read {}, using default: {}", key, e);
            fallback()
        }
    }
}

/// Encode `value` and store it under `key`
pub fn save<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let encoded = serde_json::to_value(value)?;
    store.set(key, &encoded)
}

/// Records of a JSON array collection, as stored. Mutations work on these
/// so records the typed models cannot decode survive a rewrite.
pub fn load_records(store: &dyn KvStore, key: &str) -> Vec<Value> {
    load_or(store, key, Vec::new)
}

/// Decode each record on its own, skipping the ones that fail
pub fn decode_records<T: DeserializeOwned>(records: Vec<Value>, what: &str) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect()
}

/// The string `id` of a raw record, if it has one
pub fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Raw value under `key`, or `fallback` when missing or unreadable.
/// Used by exports, which copy collections exactly as stored.
pub fn load_raw(store: &dyn KvStore, key: &str, fallback: Value) -> Value {
    match store.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => fallback,
        Err(e) => {
            warn!("Failed to read {}, exporting default: {}", key, e);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_or_missing_uses_fallback() {
        let store = MemoryStore::new();
        let decks: Vec<String> = load_or(&store, keys::DECKS, Vec::new);
        assert!(decks.is_empty());
    }

    #[test]
    fn test_load_or_malformed_uses_fallback() {
        let store = MemoryStore::new();
        store.insert_raw(keys::JOURNAL, json!({"not": "a list"}));

        let notes: Vec<String> = load_or(&store, keys::JOURNAL, || vec!["fallback".to_string()]);
        assert_eq!(notes, vec!["fallback".to_string()]);
    }

    #[test]
    fn test_decode_records_skips_bad_entries() {
        let records = vec![json!(1), json!("two"), json!(3)];
        let decoded: Vec<u32> = decode_records(records, "number");
        assert_eq!(decoded, vec![1, 3]);
        assert_eq!(record_id(&json!({"id": "a"})), Some("a"));
        assert_eq!(record_id(&json!({"id": 7})), None);
    }

    #[test]
    fn test_save_round_trips_through_store() {
        let store = MemoryStore::new();
        save(&store, "numbers", &vec![1u32, 2, 3]).unwrap();

        let loaded: Vec<u32> = load_or(&store, "numbers", Vec::new);
        assert_eq!(loaded, vec![1, 2, 3]);
        assert_eq!(load_raw(&store, "numbers", Value::Null), json!([1, 2, 3]));
    }
}
