//! The execution-context tree.
//!
//! This module provides:
//! - `ExtensionContext` nodes, one per test or container invocation
//! - Builders for growing the tree top-down
//! - Descriptors and unique ids identifying what a node runs
//! - A test reporter relaying entries to the report sink

mod builder;
#[cfg(test)]
mod context_tests;
mod descriptor;
mod node;
mod reporter;
mod unique_id;

pub use builder::{create_child_context, ContextBuilder};
pub use descriptor::{Element, ElementKind, TestType};
pub use node::ExtensionContext;
pub use reporter::TestReporter;
pub use unique_id::{Segment, UniqueId};
