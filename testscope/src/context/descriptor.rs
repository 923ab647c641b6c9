//! Descriptors of the artifact a context was created for.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The type that owns the current test or container.
#[derive(Clone, Copy)]
pub struct TestType {
    id: TypeId,
    name: &'static str,
}

impl TestType {
    /// Describes the type `T`.
    #[must_use]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the fully qualified type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without its module path.
    #[must_use]
    pub fn simple_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    /// Returns true if this describes `T`.
    #[must_use]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TestType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TestType {}

impl Hash for TestType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TestType({})", self.name)
    }
}

/// Kinds of declarations an extension can be registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// A module or crate.
    Module,
    /// A type, such as a test struct.
    Type,
    /// A function or method.
    Method,
    /// A field of a type.
    Field,
    /// A parameter of a method.
    Parameter,
}

/// Handle to the declaration a context was created for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Element {
    /// What kind of declaration this is.
    pub kind: ElementKind,
    /// Fully qualified path of the declaration.
    pub qualified_name: String,
    /// Attributes (annotations) present on the declaration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl Element {
    /// Creates an element handle.
    #[must_use]
    pub fn new(kind: ElementKind, qualified_name: impl Into<String>) -> Self {
        Self {
            kind,
            qualified_name: qualified_name.into(),
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    /// Returns true if the declaration carries `attribute`.
    #[must_use]
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }

    /// Returns the last path segment of the qualified name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit("::")
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CalculatorTests;

    #[test]
    fn test_test_type() {
        let ty = TestType::of::<CalculatorTests>();

        assert!(ty.is::<CalculatorTests>());
        assert!(!ty.is::<String>());
        assert_eq!(ty.simple_name(), "CalculatorTests");
        assert!(ty.name().ends_with("::CalculatorTests"));
        assert_eq!(ty, TestType::of::<CalculatorTests>());
    }

    #[test]
    fn test_element() {
        let element = Element::new(ElementKind::Method, "calc::tests::adds_numbers")
            .with_attribute("test")
            .with_attribute("tag(fast)");

        assert!(element.has_attribute("test"));
        assert!(!element.has_attribute("ignore"));
        assert_eq!(element.simple_name(), "adds_numbers");
    }

    #[test]
    fn test_element_serialization() {
        let element = Element::new(ElementKind::Type, "calc::tests::CalculatorTests");
        let json = serde_json::to_value(&element).unwrap();

        assert_eq!(json["kind"], "type");
        assert!(json.get("attributes").is_none());
    }
}
