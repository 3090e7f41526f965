//! Activity log data models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::storage::lenient;

/// Kind of logged activity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityKind {
    StudySession,
    CardsSession,
    Other(String),
}

impl ActivityKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::StudySession => "study_session",
            Self::CardsSession => "cards_session",
            Self::Other(s) => s,
        }
    }
}

impl Default for ActivityKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ActivityKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "study_session" => Self::StudySession,
            "cards_session" => Self::CardsSession,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for ActivityKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single logged study or review event. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub cert_id: String,
    #[serde(rename = "type", default)]
    pub kind: ActivityKind,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub minutes: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub details: String,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl ActivityEntry {
    /// Text searched by free-text queries
    pub fn search_haystack(&self) -> String {
        let meta_text = |key: &str| self.meta.get(key).map(lenient::to_text).unwrap_or_default();
        let tags = self.tags().join(" ");
        [
            self.kind.as_str().to_string(),
            self.title.clone(),
            self.details.clone(),
            tags,
            meta_text("did"),
            meta_text("learned"),
            meta_text("next"),
        ]
        .join(" ")
        .to_lowercase()
    }

    /// Tags stored in `meta.tags`
    pub fn tags(&self) -> Vec<String> {
        self.meta
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|tags| tags.iter().map(lenient::to_text).collect())
            .unwrap_or_default()
    }
}

/// Request to append an activity entry. Id and timestamp are assigned
/// when absent.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub cert_id: String,
    pub kind: ActivityKind,
    pub minutes: u32,
    pub title: String,
    pub details: String,
    pub meta: Map<String, Value>,
}

impl NewActivity {
    pub fn new(cert_id: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            id: None,
            timestamp: None,
            cert_id: cert_id.into(),
            kind,
            minutes: 0,
            title: String::new(),
            details: String::new(),
            meta: Map::new(),
        }
    }

    pub fn minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }

    pub(crate) fn into_entry(self) -> ActivityEntry {
        ActivityEntry {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            cert_id: self.cert_id,
            kind: self.kind,
            minutes: self.minutes,
            title: self.title,
            details: self.details,
            meta: self.meta,
        }
    }
}

/// Study log form (did / learned / next) as entered by the user
#[derive(Debug, Clone, Default)]
pub struct StudyLogForm {
    pub timestamp: Option<DateTime<Utc>>,
    pub cert_id: String,
    pub kind: Option<ActivityKind>,
    pub minutes: u32,
    pub title: String,
    pub did: String,
    pub learned: String,
    pub next: String,
    /// Comma separated
    pub tags: String,
}

/// Filters for listing the activity log
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub cert_id: Option<String>,
    pub kind: Option<ActivityKind>,
    /// Inclusive local-calendar day bounds
    pub from_day: Option<chrono::NaiveDate>,
    pub to_day: Option<chrono::NaiveDate>,
    pub query: Option<String>,
}

/// Derived totals shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub streak_days: u32,
    pub longest_streak: u32,
    pub today_minutes: u64,
    pub week_minutes: u64,
    pub total_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(ActivityKind::from("cards_session"), ActivityKind::CardsSession);
        assert_eq!(ActivityKind::from("lab"), ActivityKind::Other("lab".to_string()));
        assert_eq!(serde_json::to_value(ActivityKind::StudySession).unwrap(), json!("study_session"));
    }

    #[test]
    fn test_entry_decodes_stored_shape() {
        let entry: ActivityEntry = serde_json::from_value(json!({
            "id": "e1",
            "ts": "2026-03-02T10:00:00.000Z",
            "certId": "netplus",
            "type": "study_session",
            "minutes": "not a number",
            "title": "Subnetting",
            "details": "",
            "meta": {"tags": ["ipv4", "cidr"], "did": "drills"}
        }))
        .unwrap();

        assert_eq!(entry.minutes, 0);
        assert_eq!(entry.kind, ActivityKind::StudySession);
        assert_eq!(entry.tags(), vec!["ipv4", "cidr"]);
        assert!(entry.search_haystack().contains("drills"));
    }

    #[test]
    fn test_entry_encodes_ts_and_type() {
        let entry = NewActivity::new("secplus", ActivityKind::CardsSession)
            .title("Card: correct")
            .into_entry();
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("ts").is_some());
        assert_eq!(value["type"], "cards_session");
        assert_eq!(value["certId"], "secplus");
    }
}
