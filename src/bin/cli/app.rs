use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use studyhub_lib::certs::{find_cert, CERTIFICATIONS};
use studyhub_lib::config::Config;
use studyhub_lib::flashcards::Deck;
use studyhub_lib::StudyHub;

/// Shared application state for CLI commands
pub struct App {
    pub hub: StudyHub,
}

impl App {
    /// Load config and open the data directory
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let config = Config::load().context("Failed to load config")?;
        let hub = StudyHub::open(config, data_dir).context("Failed to open data directory")?;

        // Missing example deck is only a warning
        hub.ensure_example_deck()
            .context("Failed to add example deck")?;

        Ok(Self { hub })
    }

    /// Find a deck by id or title (case-insensitive prefix match).
    /// Without a name, the default deck is used.
    pub fn find_deck(&self, name: Option<&str>) -> Result<Deck> {
        let decks = self.hub.decks().list_decks();

        let Some(name) = name else {
            let Some(id) = self.hub.decks().default_deck_id() else {
                bail!("No decks yet. Import one with `cards import <file>`.");
            };
            return decks
                .into_iter()
                .find(|d| d.id == id)
                .context("Default deck disappeared");
        };

        if let Some(deck) = decks.iter().find(|d| d.id == name) {
            return Ok(deck.clone());
        }

        let name_lower = name.to_lowercase();
        if let Some(deck) = decks.iter().find(|d| d.title.to_lowercase() == name_lower) {
            return Ok(deck.clone());
        }

        let matches: Vec<&Deck> = decks.iter()
            .filter(|d| d.title.to_lowercase().starts_with(&name_lower))
            .collect();

        match matches.len() {
            0 => bail!("No deck matching '{}'. Available decks:\n{}", name,
                decks.iter().map(|d| format!("  - {} ({})", d.title, d.id)).collect::<Vec<_>>().join("\n")),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous deck name '{}'. Matches:\n{}", name,
                matches.iter().map(|d| format!("  - {} ({})", d.title, d.id)).collect::<Vec<_>>().join("\n")),
        }
    }

    /// Validate a certification id, defaulting to the current one
    pub fn resolve_cert(&self, cert: Option<&str>) -> Result<String> {
        let cert = match cert {
            Some(c) => c.trim().to_lowercase(),
            None => return Ok(self.hub.settings().get().current_cert),
        };

        if find_cert(&cert).is_none() {
            bail!("Unknown certification '{}'. Known: {}", cert,
                CERTIFICATIONS.iter().map(|c| c.id).collect::<Vec<_>>().join(", "));
        }
        Ok(cert)
    }

    /// Write exported JSON, defaulting to `default_name` in the working directory
    pub fn write_export(&self, path: Option<PathBuf>, default_name: &str, json: &str) -> Result<PathBuf> {
        let path = path.unwrap_or_else(|| Path::new(default_name).to_path_buf());
        fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
