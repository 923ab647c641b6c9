//! Report entry publication.
//!
//! Contexts relay published entries to a [`ReportSink`], the boundary to the
//! engine's execution listener. Nothing is retained by the context tree.

mod buffered;
mod entry;
mod sink;

pub use buffered::{BufferedReportSink, DeliveryMetrics, ReportListener};
pub use entry::ReportEntry;
#[cfg(test)]
pub use sink::MockReportSink;
pub use sink::{CollectingReportSink, LoggingReportSink, NoOpReportSink, ReportSink};

use crate::utils::Timestamp;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

static GLOBAL_REPORT_SINK: RwLock<Option<Arc<dyn ReportSink>>> = RwLock::new(None);

/// Sets the process-wide sink used by root contexts built without one.
pub fn set_report_sink(sink: Arc<dyn ReportSink>) {
    *GLOBAL_REPORT_SINK.write() = Some(sink);
}

/// Clears the process-wide sink.
pub fn clear_report_sink() {
    *GLOBAL_REPORT_SINK.write() = None;
}

/// Gets the process-wide sink.
///
/// Returns a `NoOpReportSink` if no sink is set.
pub fn get_report_sink() -> Arc<dyn ReportSink> {
    GLOBAL_REPORT_SINK
        .read()
        .clone()
        .unwrap_or_else(|| Arc::new(NoOpReportSink))
}

/// Hands entries to `sink`, swallowing any panic it raises.
///
/// Publishing must never fail a test, so a misbehaving sink is only logged.
pub(crate) fn deliver(
    sink: &dyn ReportSink,
    context_id: &str,
    entries: &HashMap<String, String>,
    timestamp: Timestamp,
) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| sink.accept(context_id, entries, timestamp))) {
        let reason = panic
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        warn!(context_id = %context_id, reason = %reason, "Report sink failed; entry discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_utc;

    #[test]
    fn test_global_sink_default_and_override() {
        clear_report_sink();
        get_report_sink().accept("ctx", &HashMap::new(), now_utc());

        let collecting = Arc::new(CollectingReportSink::new());
        set_report_sink(collecting.clone());
        get_report_sink().accept("ctx", &HashMap::new(), now_utc());
        clear_report_sink();

        assert_eq!(collecting.len(), 1);
    }

    struct PanickingSink;

    impl ReportSink for PanickingSink {
        fn accept(&self, _context_id: &str, _entries: &HashMap<String, String>, _timestamp: Timestamp) {
            panic!("listener exploded");
        }
    }

    #[test]
    fn test_deliver_swallows_panics() {
        deliver(&PanickingSink, "ctx", &HashMap::new(), now_utc());
    }

    #[test]
    fn test_deliver_passes_arguments_through() {
        let mut sink = MockReportSink::new();
        sink.expect_accept()
            .withf(|id, entries, _| id.to_string() == "[engine:e]" && entries.get("k").map(String::as_str) == Some("v"))
            .times(1)
            .return_const(());

        let entries = HashMap::from([("k".to_string(), "v".to_string())]);
        deliver(&sink, "[engine:e]", &entries, now_utc());
    }
}
