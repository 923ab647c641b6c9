//! Published report entries.

use crate::utils::{format_iso8601, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A set of key-value pairs published by a context at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Unique id of the publishing context.
    pub context_id: String,
    /// When the entry was published.
    pub timestamp: Timestamp,
    /// The published pairs.
    pub entries: HashMap<String, String>,
}

impl ReportEntry {
    /// Creates a new report entry.
    #[must_use]
    pub fn new(context_id: impl Into<String>, entries: HashMap<String, String>, timestamp: Timestamp) -> Self {
        Self {
            context_id: context_id.into(),
            timestamp,
            entries,
        }
    }

    /// Gets a published value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::json!({
            "context_id": self.context_id,
            "timestamp": format_iso8601(&self.timestamp),
            "entries": self.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> ReportEntry {
        let mut entries = HashMap::new();
        entries.insert("user name".to_string(), "dk38".to_string());
        entries.insert("award year".to_string(), "1974".to_string());
        let ts = chrono::Utc.with_ymd_and_hms(2016, 3, 1, 9, 30, 0).unwrap();
        ReportEntry::new("[engine:junit]/[method:report]", entries, ts)
    }

    #[test]
    fn test_get() {
        let entry = entry();
        assert_eq!(entry.get("award year"), Some("1974"));
        assert_eq!(entry.get("missing"), None);
    }

    #[test]
    fn test_to_dict() {
        let dict = entry().to_dict();
        assert_eq!(dict["context_id"], "[engine:junit]/[method:report]");
        assert_eq!(dict["timestamp"], "2016-03-01T09:30:00.000000+00:00");
        assert_eq!(dict["entries"]["user name"], "dk38");
    }

    #[test]
    fn test_serialization() {
        let entry = entry();
        let json = serde_json::to_string(&entry).unwrap();
        let back: ReportEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
