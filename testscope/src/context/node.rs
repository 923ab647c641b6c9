//! The extension context: one node of the execution tree.

use super::{ContextBuilder, Element, TestType};
use crate::errors::InvalidArgumentError;
use crate::namespace::Namespace;
use crate::report::{self, ReportSink};
use crate::store::{Store, StoreTable};
use crate::utils::now_utc;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The context in which the current test or container is being executed.
///
/// Extensions receive a context to share state through namespaced stores and to
/// publish report entries. Contexts form a tree: each one holds its parent
/// alive, so a descendant can always walk up to its ancestors' stores.
pub struct ExtensionContext {
    unique_id: String,
    name: String,
    display_name: String,
    test_type: Option<TestType>,
    element: Option<Element>,
    parent: Option<Arc<ExtensionContext>>,
    depth: usize,
    stores: DashMap<Namespace, Arc<StoreTable>>,
    report_sink: Arc<dyn ReportSink>,
}

impl ExtensionContext {
    pub(crate) fn from_builder(builder: ContextBuilder) -> Arc<Self> {
        let ContextBuilder {
            unique_id,
            name,
            display_name,
            test_type,
            element,
            parent,
            report_sink,
        } = builder;

        let depth = parent.as_ref().map_or(0, |p| p.depth + 1);
        let report_sink = report_sink
            .or_else(|| parent.as_ref().map(|p| p.report_sink.clone()))
            .unwrap_or_else(report::get_report_sink);

        debug!(
            unique_id = %unique_id,
            parent = ?parent.as_ref().map(|p| p.unique_id.as_str()),
            depth,
            "Created extension context"
        );

        Arc::new(Self {
            unique_id,
            name,
            display_name,
            test_type,
            element,
            parent,
            depth,
            stores: DashMap::new(),
            report_sink,
        })
    }

    /// Creates a root context using the process-wide report sink.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgumentError` if `unique_id` is blank.
    pub fn root(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Arc<Self>, InvalidArgumentError> {
        ContextBuilder::new(unique_id, name, display_name).build()
    }

    /// Creates a child of this context.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgumentError` if `unique_id` is blank.
    pub fn child(
        self: &Arc<Self>,
        unique_id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Arc<Self>, InvalidArgumentError> {
        ContextBuilder::new(unique_id, name, display_name)
            .with_parent(self.clone())
            .build()
    }

    /// Returns the unique id of the current test or container.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Returns the technical name, e.g. the qualified path of the underlying
    /// artifact.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-facing display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the type that owns the current test or container.
    #[must_use]
    pub fn test_type(&self) -> Option<&TestType> {
        self.test_type.as_ref()
    }

    /// Returns the declaration the context was created for.
    #[must_use]
    pub fn element(&self) -> Option<&Element> {
        self.element.as_ref()
    }

    /// Returns the parent context, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Iterates over the ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Arc<Self>> {
        std::iter::successors(self.parent.as_ref(), |ctx| ctx.parent.as_ref())
    }

    /// Returns the number of ancestors.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the root of the tree this context belongs to.
    #[must_use]
    pub fn tree_root(self: &Arc<Self>) -> Arc<Self> {
        self.ancestors().last().unwrap_or(self).clone()
    }

    /// Returns the report sink entries are forwarded to.
    #[must_use]
    pub fn report_sink(&self) -> &Arc<dyn ReportSink> {
        &self.report_sink
    }

    /// Gets the store for `namespace`, creating it on first access.
    ///
    /// Stores obtained with equal namespaces share their entries.
    #[must_use]
    pub fn store(self: &Arc<Self>, namespace: &Namespace) -> Store {
        let table = self
            .stores
            .entry(namespace.clone())
            .or_insert_with(|| {
                debug!(unique_id = %self.unique_id, namespace = ?namespace, "Materialized store");
                Arc::new(StoreTable::new())
            })
            .clone();
        Store::new(self.clone(), namespace.clone(), table)
    }

    /// Gets the store for the default namespace.
    #[must_use]
    pub fn default_store(self: &Arc<Self>) -> Store {
        self.store(Namespace::default_namespace())
    }

    /// Returns this context's entries for `namespace` without creating them.
    pub(crate) fn existing_table(&self, namespace: &Namespace) -> Option<Arc<StoreTable>> {
        self.stores.get(namespace).map(|table| table.value().clone())
    }

    /// Publishes `entries` to the report sink, tagged with this context's id.
    ///
    /// Entries are relayed, not retained. A failing sink never fails the caller.
    pub fn publish_report_entry(&self, entries: HashMap<String, String>) {
        report::deliver(self.report_sink.as_ref(), &self.unique_id, &entries, now_utc());
    }
}

impl fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("unique_id", &self.unique_id)
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("test_type", &self.test_type)
            .field("element", &self.element)
            .field("parent", &self.parent.as_ref().map(|p| p.unique_id.as_str()))
            .field("stores", &self.stores.len())
            .finish_non_exhaustive()
    }
}
