//! Keys for store entries.

use crate::utils::ErasedKey;
use std::any::Any;
use std::fmt;
use std::hash::Hash;

/// A key under which a value is stored.
///
/// Any `Debug + Eq + Hash + Send + Sync + 'static` value can serve as a key;
/// keys of different concrete types never collide.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StoreKey(ErasedKey);

impl StoreKey {
    /// Wraps an arbitrary value as a key.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + fmt::Debug + Eq + Hash + Send + Sync,
    {
        Self(ErasedKey::new(value))
    }

    /// Returns the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Debug rendering used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{:?}", self.0)
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl From<&StoreKey> for StoreKey {
    fn from(key: &StoreKey) -> Self {
        key.clone()
    }
}

macro_rules! impl_from_for_store_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreKey {
                fn from(value: $ty) -> Self {
                    Self::new(value)
                }
            }
        )*
    };
}

impl_from_for_store_key!(&'static str, String, bool, char, i32, i64, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_str_keys_differ() {
        // Different concrete types, so they are different keys.
        assert_ne!(StoreKey::from("k"), StoreKey::from("k".to_string()));
        assert_eq!(StoreKey::from("k"), StoreKey::from("k"));
    }

    #[test]
    fn test_custom_key_type() {
        #[derive(Debug, PartialEq, Eq, Hash)]
        struct SessionKey(u8);

        let key = StoreKey::new(SessionKey(3));
        assert_eq!(key, StoreKey::new(SessionKey(3)));
        assert_eq!(key.downcast_ref::<SessionKey>(), Some(&SessionKey(3)));
        assert_eq!(key.describe(), "SessionKey(3)");
    }
}
