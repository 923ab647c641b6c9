//! Values held by a store.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A value held by a store.
///
/// Values are type-erased; callers recover the concrete type with
/// [`StoredValue::downcast`] and are responsible for using one type per key.
/// A *null* value is a legitimate entry, distinct from an absent one.
#[derive(Clone)]
pub struct StoredValue(Option<Arc<dyn Any + Send + Sync>>);

impl StoredValue {
    /// Wraps a concrete value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    /// Wraps an already shared value without re-allocating.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self(Some(value))
    }

    /// The null value.
    #[must_use]
    pub const fn null() -> Self {
        Self(None)
    }

    /// Returns true for the null value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Returns true if the value is a `T`. Null is no type.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.0.as_ref().is_some_and(|v| (**v).type_id() == TypeId::of::<T>())
    }

    /// Returns a shared handle to the value if it is a `T`.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.clone()?.downcast::<T>().ok()
    }

    /// Borrows the value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref()?.downcast_ref::<T>()
    }

    /// Returns true if both handles point at the same allocation (or both are null).
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("StoredValue(null)")
        } else {
            f.write_str("StoredValue(..)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast() {
        let value = StoredValue::new(String::from("hello"));

        assert!(value.is::<String>());
        assert!(!value.is::<&str>());
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("hello"));
        assert!(value.downcast::<u32>().is_none());
    }

    #[test]
    fn test_null_value() {
        let value = StoredValue::null();

        assert!(value.is_null());
        assert!(!value.is::<()>());
        assert!(value.downcast::<()>().is_none());
        assert_eq!(format!("{value:?}"), "StoredValue(null)");
    }

    #[test]
    fn test_clones_share_allocation() {
        let value = StoredValue::new(vec![1, 2, 3]);
        let copy = value.clone();

        assert!(value.ptr_eq(&copy));
        assert!(!value.ptr_eq(&StoredValue::new(vec![1, 2, 3])));
    }
}
