//! The StudyHub context: owns the store and hands out borrowed views

use std::path::{Path, PathBuf};

use log::info;

use crate::activity::ActivityLog;
use crate::backup::{self, Backup};
use crate::certs::CertStore;
use crate::config::Config;
use crate::flashcards::{DeckStore, ReviewEngine};
use crate::journal::JournalStore;
use crate::settings::SettingsStore;
use crate::storage::{FileStore, KvStore, MemoryStore, Result};

pub struct StudyHub {
    store: Box<dyn KvStore>,
    config: Config,
    data_dir: Option<PathBuf>,
}

impl StudyHub {
    /// Open a file-backed hub, creating the data directory if needed
    pub fn open(config: Config, data_dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = config.resolve_data_dir(data_dir_override)?;
        let store = FileStore::new(data_dir.clone());
        store.init()?;
        info!("Opened StudyHub data at {:?}", data_dir);

        let hub = Self {
            store: Box::new(store),
            config,
            data_dir: Some(data_dir),
        };
        hub.settings().init_default(&hub.config.default_cert)?;
        Ok(hub)
    }

    /// Hub over an arbitrary store, with default config
    pub fn with_store(store: Box<dyn KvStore>) -> Self {
        Self {
            store,
            config: Config::default(),
            data_dir: None,
        }
    }

    /// Throwaway in-memory hub
    pub fn in_memory() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    pub fn decks(&self) -> DeckStore<'_> {
        DeckStore::new(self.store())
    }

    pub fn review(&self) -> ReviewEngine<'_> {
        ReviewEngine::new(self.store())
    }

    pub fn activity(&self) -> ActivityLog<'_> {
        ActivityLog::new(self.store())
    }

    pub fn certs(&self) -> CertStore<'_> {
        CertStore::new(self.store())
    }

    pub fn journal(&self) -> JournalStore<'_> {
        JournalStore::new(self.store())
    }

    pub fn settings(&self) -> SettingsStore<'_> {
        SettingsStore::new(self.store())
    }

    /// Seed the example deck from the configured path. Returns whether the
    /// example deck is available.
    pub fn ensure_example_deck(&self) -> crate::flashcards::storage::Result<bool> {
        let Some(data_dir) = self.data_dir() else {
            return Ok(false);
        };
        let path = self.config.example_deck_path(data_dir);
        self.decks().ensure_example_deck(&path)
    }

    pub fn export_all(&self) -> Backup {
        backup::export_all(self.store())
    }
}
