//! A convenience facade for publishing report entries from a test.

use super::ExtensionContext;
use std::collections::HashMap;
use std::sync::Arc;

/// Publishes entries on behalf of the current test or container.
#[derive(Debug, Clone)]
pub struct TestReporter {
    context: Arc<ExtensionContext>,
}

impl TestReporter {
    /// Creates a reporter publishing through `context`.
    #[must_use]
    pub fn new(context: Arc<ExtensionContext>) -> Self {
        Self { context }
    }

    /// Publishes a single key-value pair.
    pub fn publish_entry(&self, key: impl Into<String>, value: impl Into<String>) {
        self.context
            .publish_report_entry(HashMap::from([(key.into(), value.into())]));
    }

    /// Publishes several key-value pairs as one entry.
    pub fn publish_entries<K, V>(&self, values: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.context.publish_report_entry(entries);
    }

    /// Returns the context entries are published through.
    #[must_use]
    pub fn context(&self) -> &Arc<ExtensionContext> {
        &self.context
    }
}
