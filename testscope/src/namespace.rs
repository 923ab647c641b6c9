//! Namespaces partition a context's store into isolated regions.
//!
//! A namespace is identified by the *set* of parts it was built from: order is
//! irrelevant and duplicates collapse. Extensions that build a namespace from the
//! same parts collaborate on the same entries; anything else is isolated.

use crate::errors::InvalidArgumentError;
use crate::utils::ErasedKey;
use std::any::{Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Marker behind [`Namespace::default_namespace`]; private so no caller can
/// rebuild it.
#[derive(Debug, PartialEq, Eq, Hash)]
struct DefaultNamespaceMarker;

static DEFAULT_NAMESPACE: OnceLock<Namespace> = OnceLock::new();

/// One identity object a namespace is anchored to.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NamespacePart(ErasedKey);

impl NamespacePart {
    /// Wraps an arbitrary value as a namespace part.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + fmt::Debug + Eq + Hash + Send + Sync,
    {
        Self(ErasedKey::new(value))
    }

    /// A part identifying the type `T` itself.
    #[must_use]
    pub fn of_type<T: Any + ?Sized>() -> Self {
        Self::new(TypeMarker {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        })
    }

    /// Returns the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for NamespacePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl From<&'static str> for NamespacePart {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NamespacePart {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Type identity used by [`NamespacePart::of_type`].
#[derive(Clone, Copy)]
struct TypeMarker {
    id: TypeId,
    name: &'static str,
}

impl PartialEq for TypeMarker {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeMarker {}

impl Hash for TypeMarker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type {}", self.name)
    }
}

/// An immutable identity value scoping the entries of a store.
#[derive(Clone)]
pub struct Namespace {
    parts: Arc<HashSet<NamespacePart>>,
}

impl Namespace {
    /// Creates a namespace from one or more parts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgumentError` if `parts` is empty.
    pub fn of<I, P>(parts: I) -> Result<Self, InvalidArgumentError>
    where
        I: IntoIterator<Item = P>,
        P: Into<NamespacePart>,
    {
        let parts: HashSet<NamespacePart> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(InvalidArgumentError::new(
                "parts",
                "There must be at least one reference object to create a namespace",
            ));
        }

        Ok(Self {
            parts: Arc::new(parts),
        })
    }

    /// Creates a namespace anchored to a single part.
    pub fn single(part: impl Into<NamespacePart>) -> Self {
        Self {
            parts: Arc::new(HashSet::from([part.into()])),
        }
    }

    /// Creates a namespace anchored to the type `T`.
    ///
    /// Extensions conventionally use their own type, which keeps their data
    /// private unless another extension deliberately names the same type.
    #[must_use]
    pub fn of_type<T: Any + ?Sized>() -> Self {
        Self::single(NamespacePart::of_type::<T>())
    }

    /// Returns the process-wide default namespace.
    ///
    /// Built once from a private marker, so it never equals a namespace built
    /// through [`Namespace::of`].
    pub fn default_namespace() -> &'static Self {
        DEFAULT_NAMESPACE.get_or_init(|| Self::single(NamespacePart::new(DefaultNamespaceMarker)))
    }

    /// Returns true if this is the default namespace.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self == Self::default_namespace()
    }

    /// Returns the parts of this namespace, in no particular order.
    pub fn parts(&self) -> impl Iterator<Item = &NamespacePart> {
        self.parts.iter()
    }

    /// Returns the number of distinct parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false: a namespace has at least one part.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::default_namespace().clone()
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.parts, &other.parts) || self.parts == other.parts
    }
}

impl Eq for Namespace {}

impl Hash for Namespace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: sum of the per-part hashes.
        let combined = self.parts.iter().fold(0_u64, |acc, part| {
            let mut hasher = DefaultHasher::new();
            part.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        state.write_usize(self.parts.len());
        state.write_u64(combined);
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            return f.write_str("Namespace(DEFAULT)");
        }
        f.debug_tuple("Namespace")
            .field(&self.parts.iter().collect::<Vec<_>>())
            .finish()
    }
}
