use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use super::KvStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl StorageError {
    /// True for user-facing validation failures that leave state untouched
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key-value store writing one pretty-printed JSON file per key
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("studyhub"))
            .ok_or(StorageError::DataDirNotFound)
    }

    /// Create the data directory if needed
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// File for `key`. Keys become file names, so anything that could
    /// leave the data directory is refused.
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(&['/', '\\', '\0'][..]) || key.starts_with('.') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.key_path(key)?;
        self.init()?;
        fs::write(path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("data"));
        (store, temp_dir)
    }

    #[test]
    fn test_missing_key_is_none() {
        let (store, _temp) = create_test_store();
        assert!(store.get("studyhub_decks_v1").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let (store, _temp) = create_test_store();
        store.set("k", &json!({"a": [1, 2, 3]})).unwrap();

        let value = store.get("k").unwrap().unwrap();
        assert_eq!(value["a"][2], 3);
        assert!(store.base_path().join("k.json").exists());
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let (store, _temp) = create_test_store();
        store.init().unwrap();
        fs::write(store.base_path().join("broken.json"), "{not json").unwrap();

        assert!(matches!(store.get("broken"), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_keys_cannot_escape_data_dir() {
        let (store, _temp) = create_test_store();

        let err = store.set(&crate::storage::keys::cert("../x"), &json!({})).unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
        assert!(matches!(store.get("a\\b"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
        assert!(!store.base_path().exists());
    }
}
