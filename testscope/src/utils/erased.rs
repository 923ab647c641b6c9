//! Type-erased, hashable values used for namespace parts and store keys.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Object-safe view of a value that can take part in hashed lookups.
///
/// Implemented for every `Any + Debug + Eq + Hash + Send + Sync` type; values of
/// different concrete types never compare equal.
pub trait KeyValue: Any + fmt::Debug + Send + Sync {
    /// Returns the value as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Compares against another erased value.
    fn dyn_eq(&self, other: &dyn KeyValue) -> bool;

    /// Feeds the value (and its type) into `state`.
    fn dyn_hash(&self, state: &mut dyn Hasher);

    /// Returns the concrete type name.
    fn type_name(&self) -> &'static str;
}

impl<T> KeyValue for T
where
    T: Any + fmt::Debug + Eq + Hash + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn KeyValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A cheaply clonable, type-erased key.
#[derive(Clone)]
pub struct ErasedKey(Arc<dyn KeyValue>);

impl ErasedKey {
    /// Erases a concrete value.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + fmt::Debug + Eq + Hash + Send + Sync,
    {
        Self(Arc::new(value))
    }

    /// Returns the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).as_any().downcast_ref::<T>()
    }

    /// Returns the concrete type name of the wrapped value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        (*self.0).type_name()
    }
}

impl PartialEq for ErasedKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || (*self.0).dyn_eq(&*other.0)
    }
}

impl Eq for ErasedKey {}

impl Hash for ErasedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.0).dyn_hash(state);
    }
}

impl fmt::Debug for ErasedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(key: &ErasedKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_same_value_same_type_is_equal() {
        let a = ErasedKey::new("key".to_string());
        let b = ErasedKey::new("key".to_string());

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_different_types_never_equal() {
        let a = ErasedKey::new(1_u32);
        let b = ErasedKey::new(1_u64);

        assert_ne!(a, b);
    }

    #[test]
    fn test_downcast_and_debug() {
        let key = ErasedKey::new(42_i32);

        assert_eq!(key.downcast_ref::<i32>(), Some(&42));
        assert!(key.downcast_ref::<u8>().is_none());
        assert_eq!(format!("{key:?}"), "42");
        assert_eq!(key.type_name(), "i32");
    }
}
