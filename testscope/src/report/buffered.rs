//! A report sink that hands entries to an async listener through a bounded queue.

use super::{ReportEntry, ReportSink};
use crate::errors::TestscopeError;
use crate::utils::Timestamp;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// An async consumer of report entries, typically the engine's execution
/// listener.
#[async_trait]
pub trait ReportListener: Send + Sync {
    /// Called once per published entry, in publication order.
    async fn report_entry_published(&self, entry: ReportEntry);
}

/// Counters for a [`BufferedReportSink`].
#[derive(Debug, Default)]
pub struct DeliveryMetrics {
    accepted: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl DeliveryMetrics {
    /// Records an entry accepted into the queue.
    pub fn record_accept(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an entry handed to the listener.
    pub fn record_delivery(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an entry dropped because the queue was full or closed.
    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of accepted entries.
    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Returns the number of delivered entries.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Returns the number of dropped entries.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns the drop rate as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn drop_rate(&self) -> f64 {
        let accepted = self.accepted();
        let dropped = self.dropped();
        let total = accepted + dropped;
        if total == 0 {
            0.0
        } else {
            (dropped as f64 / total as f64) * 100.0
        }
    }

    /// Converts metrics to a dictionary.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::json!({
            "accepted": self.accepted(),
            "delivered": self.delivered(),
            "dropped": self.dropped(),
            "drop_rate_percent": (self.drop_rate() * 100.0).round() / 100.0
        })
    }
}

/// A sink that never blocks the publishing test.
///
/// Entries go into a bounded queue drained by a worker task that awaits the
/// listener. When the queue is full the entry is dropped and counted.
pub struct BufferedReportSink {
    tx: Mutex<Option<mpsc::Sender<ReportEntry>>>,
    capacity: usize,
    metrics: Arc<DeliveryMetrics>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BufferedReportSink {
    /// Creates the sink and spawns its worker on `handle`.
    #[must_use]
    pub fn new(listener: Arc<dyn ReportListener>, capacity: usize, handle: &Handle) -> Self {
        let capacity = capacity.max(1);
        let (tx, mut rx) = mpsc::channel::<ReportEntry>(capacity);
        let metrics = Arc::new(DeliveryMetrics::default());

        let worker_metrics = metrics.clone();
        let worker = handle.spawn(async move {
            while let Some(entry) = rx.recv().await {
                listener.report_entry_published(entry).await;
                worker_metrics.record_delivery();
            }
            debug!("Report queue closed");
        });

        Self {
            tx: Mutex::new(Some(tx)),
            capacity,
            metrics,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Creates the sink on the runtime of the calling task.
    ///
    /// # Errors
    ///
    /// Returns `TestscopeError::Config` when called outside a tokio runtime.
    pub fn on_current_runtime(listener: Arc<dyn ReportListener>, capacity: usize) -> Result<Self, TestscopeError> {
        let handle = Handle::try_current()
            .map_err(|err| TestscopeError::Config(format!("buffered report sink needs a tokio runtime: {err}")))?;
        Ok(Self::new(listener, capacity, &handle))
    }

    /// Stops accepting entries and waits until the queued ones are delivered.
    pub async fn shutdown(&self) {
        drop(self.tx.lock().take());

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(err) = worker.await {
                warn!(error = %err, "Report worker terminated abnormally");
            }
        }
    }

    /// Returns the number of queued, undelivered entries.
    #[must_use]
    pub fn queue_size(&self) -> usize {
        self.tx
            .lock()
            .as_ref()
            .map_or(0, |tx| self.capacity - tx.capacity())
    }

    /// Returns the delivery metrics.
    #[must_use]
    pub fn metrics(&self) -> &DeliveryMetrics {
        &self.metrics
    }
}

impl ReportSink for BufferedReportSink {
    fn accept(&self, context_id: &str, entries: &HashMap<String, String>, timestamp: Timestamp) {
        let entry = ReportEntry::new(context_id, entries.clone(), timestamp);
        let sent = self
            .tx
            .lock()
            .as_ref()
            .is_some_and(|tx| tx.try_send(entry).is_ok());

        if sent {
            self.metrics.record_accept();
        } else {
            self.metrics.record_drop();
            warn!(
                context_id = %context_id,
                dropped_total = %self.metrics.dropped(),
                "Report entry dropped"
            );
        }
    }
}

impl std::fmt::Debug for BufferedReportSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedReportSink")
            .field("capacity", &self.capacity)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
