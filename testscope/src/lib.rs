//! # Testscope
//!
//! Hierarchical, namespace-scoped state for test engine extensions.
//!
//! A test engine builds a tree of [`ExtensionContext`](context::ExtensionContext)
//! nodes while it runs: one for the engine, one per container, one per test.
//! Extensions attached anywhere in that tree share state through stores:
//!
//! - **Namespaces**: unordered sets of parts that keep extensions from
//!   colliding; equal namespaces address the same store
//! - **Ancestor fallback**: a lookup that misses locally continues up the tree,
//!   while writes and removals stay local
//! - **Compute once**: `get_or_compute_if_absent` runs its creator at most once
//!   per key, even under contention
//! - **Report entries**: key/value pairs forwarded to a pluggable sink
//!
//! ## Quick Start
//!
//! ```rust
//! use testscope::prelude::*;
//!
//! let engine = ExtensionContext::root("[engine:demo]", "demo", "Demo").unwrap();
//! let class = engine.child("[engine:demo]/[class:A]", "A", "A").unwrap();
//!
//! let ns = Namespace::single("database");
//! engine.store(&ns).put("url", StoredValue::new("postgres://localhost"));
//!
//! let url = class.store(&ns).get_as::<&str>("url").unwrap();
//! assert_eq!(url.as_deref(), Some(&"postgres://localhost"));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod errors;
pub mod namespace;
pub mod observability;
pub mod report;
pub mod store;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{LoggingConfig, ReportConfig, ReportMode, RootConfig, TestscopeConfig};
    pub use crate::context::{
        create_child_context, ContextBuilder, Element, ElementKind, ExtensionContext, Segment,
        TestReporter, TestType, UniqueId,
    };
    pub use crate::errors::{
        InvalidArgumentError, TestscopeError, TypeMismatchError, UniqueIdError,
    };
    pub use crate::namespace::{Namespace, NamespacePart};
    pub use crate::report::{
        set_report_sink, BufferedReportSink, CollectingReportSink, LoggingReportSink,
        NoOpReportSink, ReportEntry, ReportListener, ReportSink,
    };
    pub use crate::store::{Store, StoreKey, StoredValue};
}
