//! Configuration for the tracing output, the report sink and the root context.

use crate::context::{ContextBuilder, ExtensionContext};
use crate::errors::TestscopeError;
use crate::report::{BufferedReportSink, LoggingReportSink, NoOpReportSink, ReportSink};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Level;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestscopeConfig {
    /// Tracing output.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Where published report entries go.
    #[serde(default)]
    pub report: ReportConfig,
    /// Identity of the root context.
    #[serde(default)]
    pub root: RootConfig,
}

impl TestscopeConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, TestscopeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the logging section.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the report section.
    #[must_use]
    pub fn with_report(mut self, report: ReportConfig) -> Self {
        self.report = report;
        self
    }

    /// Sets the root section.
    #[must_use]
    pub fn with_root(mut self, root: RootConfig) -> Self {
        self.root = root;
        self
    }

    /// Builds the configured report sink.
    ///
    /// # Errors
    ///
    /// Returns `TestscopeError::Config` for an unknown log level, or for the
    /// buffered mode outside a tokio runtime.
    pub fn build_report_sink(&self) -> Result<Arc<dyn ReportSink>, TestscopeError> {
        let sink: Arc<dyn ReportSink> = match self.report.mode {
            ReportMode::Noop => Arc::new(NoOpReportSink),
            ReportMode::Logging => Arc::new(LoggingReportSink::new(self.report.level()?)),
            ReportMode::Buffered => {
                let listener = Arc::new(LoggingReportSink::new(self.report.level()?));
                Arc::new(BufferedReportSink::on_current_runtime(
                    listener,
                    self.report.buffer_capacity,
                )?)
            }
        };
        Ok(sink)
    }

    /// Builds the root context with the configured identity and report sink.
    pub fn build_root_context(&self) -> Result<Arc<ExtensionContext>, TestscopeError> {
        let sink = self.build_report_sink()?;
        let root = ContextBuilder::new(
            self.root.unique_id.clone(),
            self.root.name.clone(),
            self.root.display_name.clone(),
        )
        .with_report_sink(sink)
        .build()?;
        Ok(root)
    }
}

/// Tracing output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "testscope=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Sets the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enables or disables JSON output.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Which report sink to install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Discard entries.
    Noop,
    /// Log entries synchronously.
    #[default]
    Logging,
    /// Queue entries and log them on a background task.
    Buffered,
}

/// Report sink settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Sink kind.
    #[serde(default)]
    pub mode: ReportMode,
    /// Queue capacity of the buffered sink.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Level logged entries are emitted at.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_buffer_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: ReportMode::default(),
            buffer_capacity: default_buffer_capacity(),
            log_level: default_log_level(),
        }
    }
}

impl ReportConfig {
    /// Sets the sink kind.
    #[must_use]
    pub fn with_mode(mut self, mode: ReportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the buffered queue capacity.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Parses the configured log level.
    pub fn level(&self) -> Result<Level, TestscopeError> {
        self.log_level
            .parse()
            .map_err(|_| TestscopeError::Config(format!("unknown log level: {}", self.log_level)))
    }
}

/// Identity of the root context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Unique id of the root.
    #[serde(default = "default_root_id")]
    pub unique_id: String,
    /// Technical name.
    #[serde(default = "default_root_name")]
    pub name: String,
    /// Display name; blank falls back to the name.
    #[serde(default)]
    pub display_name: String,
}

fn default_root_id() -> String {
    "[engine:testscope]".to_string()
}

fn default_root_name() -> String {
    "testscope".to_string()
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            unique_id: default_root_id(),
            name: default_root_name(),
            display_name: String::new(),
        }
    }
}

impl RootConfig {
    /// Creates a root identity.
    #[must_use]
    pub fn new(unique_id: impl Into<String>, name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            display_name: display_name.into(),
        }
    }
}
