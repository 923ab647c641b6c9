//! Report sink trait and implementations.

use super::{ReportEntry, ReportListener};
use crate::utils::Timestamp;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, trace, Level};

/// Receives the entries published by contexts.
///
/// This is the boundary to the engine's execution listener. Delivery is
/// best-effort: implementations must not block for long, and a panicking
/// implementation is caught and logged by the publishing context.
#[cfg_attr(test, mockall::automock)]
pub trait ReportSink: Send + Sync {
    /// Accepts the entries published by the context with id `context_id`.
    fn accept(&self, context_id: &str, entries: &HashMap<String, String>, timestamp: Timestamp);
}

/// A sink that discards all entries.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReportSink;

impl ReportSink for NoOpReportSink {
    fn accept(&self, _context_id: &str, _entries: &HashMap<String, String>, _timestamp: Timestamp) {
        // Intentionally empty - discards all entries
    }
}

/// A sink that logs entries using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingReportSink {
    level: Level,
}

impl Default for LoggingReportSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingReportSink {
    /// Creates a new logging sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Returns the configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    fn log_entry(&self, context_id: &str, entries: &HashMap<String, String>, timestamp: &Timestamp) {
        match self.level {
            Level::TRACE => {
                trace!(context_id = %context_id, entries = ?entries, timestamp = %timestamp, "Report entry published");
            }
            Level::DEBUG => {
                debug!(context_id = %context_id, entries = ?entries, timestamp = %timestamp, "Report entry published");
            }
            _ => {
                info!(context_id = %context_id, entries = ?entries, timestamp = %timestamp, "Report entry published");
            }
        }
    }
}

impl ReportSink for LoggingReportSink {
    fn accept(&self, context_id: &str, entries: &HashMap<String, String>, timestamp: Timestamp) {
        self.log_entry(context_id, entries, &timestamp);
    }
}

#[async_trait]
impl ReportListener for LoggingReportSink {
    async fn report_entry_published(&self, entry: ReportEntry) {
        self.log_entry(&entry.context_id, &entry.entries, &entry.timestamp);
    }
}

/// A sink that records every entry, for tests.
#[derive(Debug, Default)]
pub struct CollectingReportSink {
    entries: parking_lot::RwLock<Vec<ReportEntry>>,
}

impl CollectingReportSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected entries in publication order.
    #[must_use]
    pub fn entries(&self) -> Vec<ReportEntry> {
        self.entries.read().clone()
    }

    /// Returns the entries published by one context.
    #[must_use]
    pub fn entries_for(&self, context_id: &str) -> Vec<ReportEntry> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.context_id == context_id)
            .cloned()
            .collect()
    }

    /// Returns the number of collected entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clears all collected entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl ReportSink for CollectingReportSink {
    fn accept(&self, context_id: &str, entries: &HashMap<String, String>, timestamp: Timestamp) {
        self.entries
            .write()
            .push(ReportEntry::new(context_id, entries.clone(), timestamp));
    }
}

#[async_trait]
impl ReportListener for CollectingReportSink {
    async fn report_entry_published(&self, entry: ReportEntry) {
        self.entries.write().push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_utc;

    fn pairs(key: &str, value: &str) -> HashMap<String, String> {
        HashMap::from([(key.to_string(), value.to_string())])
    }

    #[test]
    fn test_noop_sink() {
        NoOpReportSink.accept("ctx", &pairs("a", "b"), now_utc());
        // Should not panic
    }

    #[test]
    fn test_logging_sink() {
        let sink = LoggingReportSink::debug();
        assert_eq!(sink.level(), Level::DEBUG);
        sink.accept("ctx", &pairs("a", "b"), now_utc());
        // Should not panic
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingReportSink::new();
        assert!(sink.is_empty());

        sink.accept("ctx-1", &pairs("a", "1"), now_utc());
        sink.accept("ctx-2", &pairs("b", "2"), now_utc());
        sink.accept("ctx-1", &pairs("c", "3"), now_utc());

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.entries_for("ctx-1").len(), 2);
        assert_eq!(sink.entries()[1].get("b"), Some("2"));

        sink.clear();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_collecting_sink_as_listener() {
        let sink = CollectingReportSink::new();
        sink.report_entry_published(ReportEntry::new("ctx", pairs("k", "v"), now_utc()))
            .await;

        assert_eq!(sink.entries_for("ctx").len(), 1);
    }
}
