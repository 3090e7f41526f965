//! User settings

use serde::{Deserialize, Serialize};

use crate::storage::{self, keys, KvStore, Result};

pub const DEFAULT_CERT: &str = "netplus";

fn default_cert() -> String {
    DEFAULT_CERT.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Certification used when an action does not name one
    #[serde(default = "default_cert")]
    pub current_cert: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            current_cert: default_cert(),
        }
    }
}

#[derive(Clone, Copy)]
pub struct SettingsStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> SettingsStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Settings {
        let mut settings: Settings = storage::load_or(self.store, keys::SETTINGS, Settings::default);
        if settings.current_cert.trim().is_empty() {
            settings.current_cert = default_cert();
        }
        settings
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        storage::save(self.store, keys::SETTINGS, settings)
    }

    /// Make `cert_id` the sticky current certification
    pub fn set_current_cert(&self, cert_id: &str) -> Result<()> {
        let mut settings = self.get();
        if settings.current_cert == cert_id || cert_id.trim().is_empty() {
            return Ok(());
        }
        settings.current_cert = cert_id.to_string();
        self.save(&settings)
    }

    /// Seed settings with a default certification if none are stored yet
    pub fn init_default(&self, cert_id: &str) -> Result<()> {
        if self.store.get(keys::SETTINGS)?.is_some() {
            return Ok(());
        }
        self.save(&Settings {
            current_cert: cert_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_defaults_to_netplus() {
        let store = MemoryStore::new();
        assert_eq!(SettingsStore::new(&store).get().current_cert, DEFAULT_CERT);

        store.insert_raw(keys::SETTINGS, json!({"currentCert": ""}));
        assert_eq!(SettingsStore::new(&store).get().current_cert, DEFAULT_CERT);
    }

    #[test]
    fn test_set_current_cert() {
        let store = MemoryStore::new();
        let settings = SettingsStore::new(&store);
        settings.set_current_cert("secai").unwrap();
        assert_eq!(settings.get().current_cert, "secai");
    }

    #[test]
    fn test_init_default_does_not_overwrite() {
        let store = MemoryStore::new();
        let settings = SettingsStore::new(&store);

        settings.init_default("secplus").unwrap();
        assert_eq!(settings.get().current_cert, "secplus");

        settings.init_default("secai").unwrap();
        assert_eq!(settings.get().current_cert, "secplus");
    }
}
