//! Namespace-scoped stores with ancestor-delegating reads.
//!
//! A [`Store`] is a view over the entries of one (context, namespace) pair.
//! Reads that miss locally fall back to the parent context's store in the same
//! namespace, all the way up to the root. Writes and removals only ever touch
//! the local entries.

mod key;
mod table;
mod value;

pub use key::StoreKey;
pub(crate) use table::StoreTable;
pub use value::StoredValue;

use crate::context::ExtensionContext;
use crate::errors::{TestscopeError, TypeMismatchError};
use crate::namespace::Namespace;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The store of one context for one namespace.
///
/// Cloning a store is cheap and yields a view over the same entries.
#[derive(Clone)]
pub struct Store {
    owner: Arc<ExtensionContext>,
    namespace: Namespace,
    local: Arc<StoreTable>,
}

impl Store {
    pub(crate) fn new(owner: Arc<ExtensionContext>, namespace: Namespace, local: Arc<StoreTable>) -> Self {
        Self {
            owner,
            namespace,
            local,
        }
    }

    /// Returns the namespace this store is scoped to.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the context that owns this store.
    #[must_use]
    pub fn context(&self) -> &Arc<ExtensionContext> {
        &self.owner
    }

    /// Gets the value stored under `key`.
    ///
    /// If this context has no entry, the ancestors are asked for a value with
    /// the same key in the same namespace. Returns `None` if nobody has one.
    pub fn get(&self, key: impl Into<StoreKey>) -> Option<StoredValue> {
        let key = key.into();
        if let Some(value) = self.local.get(&key) {
            return Some(value);
        }

        self.owner
            .ancestors()
            .filter_map(|ancestor| ancestor.existing_table(&self.namespace))
            .find_map(|table| table.get(&key))
    }

    /// Stores `value` under `key` in this context only.
    ///
    /// The value is visible to descendant contexts unless they store their own
    /// value under the same key. Ancestors never see it.
    pub fn put(&self, key: impl Into<StoreKey>, value: StoredValue) {
        self.local.put(key.into(), value);
    }

    /// Gets the value stored under `key` (locally or in an ancestor), or
    /// computes it with `creator` and stores it in this context.
    ///
    /// Concurrent callers racing on the same absent key see exactly one
    /// invocation of `creator` and all receive its value. `creator` must not
    /// access the key it is computing.
    ///
    /// # Errors
    ///
    /// Returns the creator's error unchanged; nothing is stored in that case and
    /// a later call computes again.
    pub fn get_or_compute_if_absent<F, E>(&self, key: impl Into<StoreKey>, creator: F) -> Result<StoredValue, E>
    where
        F: FnOnce(&StoreKey) -> Result<StoredValue, E>,
    {
        let key = key.into();
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        self.local.compute_if_absent(key, creator)
    }

    /// Removes the value stored under `key` in this context.
    ///
    /// Ancestors are never touched, so a value inherited from an ancestor stays
    /// visible through [`Store::get`] after a local remove.
    pub fn remove(&self, key: impl Into<StoreKey>) -> Option<StoredValue> {
        self.local.remove(&key.into())
    }

    /// Gets the value under `key` as a `T`.
    ///
    /// Returns `Ok(None)` if the key is absent or holds the null value.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatchError` if the value is not a `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, key: impl Into<StoreKey>) -> Result<Option<Arc<T>>, TypeMismatchError> {
        let key = key.into();
        let value = self.get(&key);
        typed(&key, value)
    }

    /// Removes the local value under `key` and returns it as a `T`.
    ///
    /// The entry is removed even if the type does not match.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatchError` if the removed value is not a `T`.
    pub fn remove_as<T: Any + Send + Sync>(&self, key: impl Into<StoreKey>) -> Result<Option<Arc<T>>, TypeMismatchError> {
        let key = key.into();
        let value = self.remove(&key);
        typed(&key, value)
    }

    /// Typed form of [`Store::get_or_compute_if_absent`].
    ///
    /// Returns `Ok(None)` if the key already holds the null value, like
    /// [`Store::get_as`].
    ///
    /// # Errors
    ///
    /// Returns `TestscopeError::ComputationFailure` if `creator` fails and
    /// `TestscopeError::TypeMismatch` if an existing value is not a `T`.
    pub fn get_or_compute_as<T, F, E>(
        &self,
        key: impl Into<StoreKey>,
        creator: F,
    ) -> Result<Option<Arc<T>>, TestscopeError>
    where
        T: Any + Send + Sync,
        F: FnOnce(&StoreKey) -> Result<T, E>,
        E: Into<anyhow::Error>,
    {
        let key = key.into();
        let value = self
            .get_or_compute_if_absent(&key, |k| creator(k).map(StoredValue::new))
            .map_err(|err| TestscopeError::computation_failure(key.describe(), err))?;

        typed(&key, Some(value)).map_err(Into::into)
    }

    /// Returns true if this context itself holds an entry for `key`.
    pub fn contains_local(&self, key: impl Into<StoreKey>) -> bool {
        self.local.contains(&key.into())
    }

    /// Number of entries held by this context itself.
    #[must_use]
    pub fn local_len(&self) -> usize {
        self.local.len()
    }
}

fn typed<T: Any + Send + Sync>(key: &StoreKey, value: Option<StoredValue>) -> Result<Option<Arc<T>>, TypeMismatchError> {
    match value {
        None => Ok(None),
        Some(value) if value.is_null() => Ok(None),
        Some(value) => value
            .downcast::<T>()
            .map(Some)
            .ok_or_else(|| TypeMismatchError::new(key.describe(), std::any::type_name::<T>())),
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("context", &self.owner.unique_id())
            .field("namespace", &self.namespace)
            .field("local_len", &self.local.len())
            .finish()
    }
}
