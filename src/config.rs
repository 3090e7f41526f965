//! User configuration
//!
//! Read from `<config_dir>/studyhub/config.toml`. Every field is optional:
//!
//! ```toml
//! data_dir = "/home/me/.local/share/studyhub"
//! example_deck = "/home/me/decks/example_deck.json"
//! default_cert = "secplus"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::settings::DEFAULT_CERT;
use crate::storage::{FileStore, Result};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "STUDYHUB_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub example_deck: Option<PathBuf>,
    pub default_cert: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            example_deck: None,
            default_cert: DEFAULT_CERT.to_string(),
        }
    }
}

impl Config {
    /// `<config_dir>/studyhub/config.toml`, if a config directory exists
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("studyhub").join("config.toml"))
    }

    /// Load the user config, falling back to defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::user_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. A missing file yields defaults; a
    /// malformed one is an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Storage directory. Precedence: explicit override, then
    /// `STUDYHUB_DATA_DIR`, then the config file, then the platform default.
    pub fn resolve_data_dir(&self, cli_override: Option<PathBuf>) -> Result<PathBuf> {
        let from_env = env::var_os(DATA_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.resolve_data_dir_with(cli_override, from_env)
    }

    fn resolve_data_dir_with(
        &self,
        cli_override: Option<PathBuf>,
        from_env: Option<PathBuf>,
    ) -> Result<PathBuf> {
        if let Some(dir) = cli_override.or(from_env).or_else(|| self.data_dir.clone()) {
            return Ok(dir);
        }
        FileStore::default_data_dir()
    }

    /// Location of the example deck JSON for a given data directory
    pub fn example_deck_path(&self, data_dir: &Path) -> PathBuf {
        self.example_deck
            .clone()
            .unwrap_or_else(|| data_dir.join("decks").join("example_deck.json"))
    }
}
