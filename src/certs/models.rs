//! Certification workspace data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::storage::lenient;

/// A certification known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Certification {
    pub id: &'static str,
    pub title: &'static str,
}

pub const CERTIFICATIONS: &[Certification] = &[
    Certification {
        id: "netplus",
        title: "Network+",
    },
    Certification {
        id: "secplus",
        title: "Security+",
    },
    Certification {
        id: "secai",
        title: "Security AI",
    },
];

/// Look up a catalog entry by id
pub fn find_cert(id: &str) -> Option<&'static Certification> {
    CERTIFICATIONS.iter().find(|c| c.id == id)
}

/// Display title for a certification id, falling back to the id itself
pub fn cert_title(id: &str) -> &str {
    find_cert(id).map_or(id, |c| c.title)
}

/// A logged study session on a certification page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub id: String,
    pub ts: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub minutes: u32,
}

impl StudySession {
    pub fn new(topic: String, minutes: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ts: Utc::now(),
            topic,
            minutes,
        }
    }
}

/// One line of the exam objectives checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Objective {
    pub text: String,
    pub done: bool,
}

/// Accepts `{text, done}` records as well as bare strings or numbers
impl From<Value> for Objective {
    fn from(value: Value) -> Self {
        match value.as_object() {
            Some(obj) => Self {
                text: obj.get("text").map(lenient::to_text).unwrap_or_default(),
                done: obj.get("done").and_then(Value::as_bool).unwrap_or(false),
            },
            None => Self {
                text: lenient::to_text(&value),
                done: false,
            },
        }
    }
}

/// Everything stored for one certification.
///
/// Decoding is per field and per record: a bad session is skipped without
/// losing notes or objectives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub notes: String,
    /// Most recent first
    #[serde(default, deserialize_with = "lenient::records")]
    pub sessions: Vec<StudySession>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub objectives: Vec<Objective>,
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp_or_now")]
    pub updated_at: DateTime<Utc>,
}

impl Default for CertData {
    fn default() -> Self {
        Self {
            notes: String::new(),
            sessions: Vec::new(),
            objectives: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

impl CertData {
    pub fn objectives_done(&self) -> usize {
        self.objectives.iter().filter(|o| o.done).count()
    }

    pub fn total_minutes(&self) -> u64 {
        self.sessions.iter().map(|s| u64::from(s.minutes)).sum()
    }
}

/// Export payload for a single certification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertExport {
    #[serde(rename = "exported_at")]
    pub exported_at: DateTime<Utc>,
    pub cert_id: String,
    pub data: CertData,
}
