//! Construction of context nodes.

use super::{Element, ExtensionContext, TestType, UniqueId};
use crate::errors::{InvalidArgumentError, TestscopeError};
use crate::report::ReportSink;
use std::sync::Arc;

/// Builder for [`ExtensionContext`] nodes.
///
/// The engine grows the tree one node at a time; a node's parent is fixed
/// here and never reassigned.
pub struct ContextBuilder {
    pub(crate) unique_id: String,
    pub(crate) name: String,
    pub(crate) display_name: String,
    pub(crate) test_type: Option<TestType>,
    pub(crate) element: Option<Element>,
    pub(crate) parent: Option<Arc<ExtensionContext>>,
    pub(crate) report_sink: Option<Arc<dyn ReportSink>>,
}

impl ContextBuilder {
    /// Starts a builder for a node with the given identity.
    #[must_use]
    pub fn new(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            display_name: display_name.into(),
            test_type: None,
            element: None,
            parent: None,
            report_sink: None,
        }
    }

    /// Starts a builder for a child of `parent` whose id appends
    /// `[kind:value]` to the parent's id. The value doubles as the name.
    ///
    /// # Errors
    ///
    /// Returns `TestscopeError::UniqueId` if the parent's id is not in
    /// segment form.
    pub fn for_segment(
        parent: &Arc<ExtensionContext>,
        kind: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, TestscopeError> {
        let value = value.into();
        let unique_id = parent
            .unique_id()
            .parse::<UniqueId>()?
            .append(kind, value.clone());

        Ok(Self::new(unique_id.to_string(), value.clone(), value).with_parent(parent.clone()))
    }

    /// Sets the parent node.
    #[must_use]
    pub fn with_parent(mut self, parent: Arc<ExtensionContext>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the owning test type.
    #[must_use]
    pub fn with_test_type(mut self, test_type: TestType) -> Self {
        self.test_type = Some(test_type);
        self
    }

    /// Sets the underlying declaration.
    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    /// Sets the report sink. Without one, a child uses its parent's sink and a
    /// root uses the process-wide sink.
    #[must_use]
    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.report_sink = Some(sink);
        self
    }

    /// Builds the node.
    ///
    /// A blank display name falls back to the name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgumentError` if the unique id is blank.
    pub fn build(mut self) -> Result<Arc<ExtensionContext>, InvalidArgumentError> {
        if self.unique_id.trim().is_empty() {
            return Err(InvalidArgumentError::new("unique_id", "must not be blank"));
        }
        if self.display_name.trim().is_empty() {
            self.display_name = self.name.clone();
        }
        Ok(ExtensionContext::from_builder(self))
    }
}

/// Creates a context node: a root when `parent` is `None`, otherwise a child
/// of `parent`.
///
/// This is the entry point the engine uses to grow the tree while it descends
/// into containers and tests.
///
/// # Errors
///
/// Returns `TestscopeError::InvalidArgument` if `unique_id` is blank.
pub fn create_child_context(
    parent: Option<&Arc<ExtensionContext>>,
    unique_id: impl Into<String>,
    name: impl Into<String>,
    display_name: impl Into<String>,
    test_type: Option<TestType>,
    element: Option<Element>,
) -> Result<Arc<ExtensionContext>, TestscopeError> {
    let mut builder = ContextBuilder::new(unique_id, name, display_name);
    builder.parent = parent.cloned();
    builder.test_type = test_type;
    builder.element = element;
    builder.build().map_err(Into::into)
}
