//! Journal data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::lenient;

/// A freeform note tagged with a certification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalNote {
    #[serde(default)]
    pub id: String,
    pub ts: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub cert_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JournalNote {
    pub fn new(cert_id: String, title: String, body: String, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ts: Utc::now(),
            cert_id,
            title,
            body,
            tags,
        }
    }

    /// Case-insensitive substring match over title, body and tags
    pub fn matches(&self, query: &str) -> bool {
        let haystack = format!("{} {} {}", self.title, self.body, self.tags.join(" ")).to_lowercase();
        haystack.contains(&query.to_lowercase())
    }
}

/// Request to add a journal note
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub cert_id: String,
    pub title: String,
    pub body: String,
    /// Comma separated
    pub tags: String,
}
