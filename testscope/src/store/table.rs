//! The local entries of one (context, namespace) pair.

use super::{StoreKey, StoredValue};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// One entry. The slot lock is held while a value is being computed so that
/// racing callers on the same key wait for the winner.
///
/// `filled` mirrors `value.is_some()` and is only written under the slot lock,
/// so it can be read without blocking on an in-flight computation.
#[derive(Debug, Default)]
struct Slot {
    value: Mutex<Option<StoredValue>>,
    filled: AtomicBool,
}

impl Slot {
    fn filled(value: StoredValue) -> Self {
        Self {
            value: Mutex::new(Some(value)),
            filled: AtomicBool::new(true),
        }
    }

    fn is_filled(&self) -> bool {
        self.filled.load(Ordering::Acquire)
    }
}

/// Thread-safe table of local entries.
///
/// The table lock is only held to look up, insert or remove slots, never while
/// a creator runs, so computations on unrelated keys proceed in parallel. A
/// slot lock may be held while taking the table lock, never the reverse.
#[derive(Debug, Default)]
pub(crate) struct StoreTable {
    entries: RwLock<HashMap<StoreKey, Arc<Slot>>>,
}

impl StoreTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the local value, waiting for an in-flight computation of the
    /// same key.
    pub(crate) fn get(&self, key: &StoreKey) -> Option<StoredValue> {
        let slot = self.entries.read().get(key).cloned()?;
        let value = slot.value.lock().clone();
        value
    }

    pub(crate) fn contains(&self, key: &StoreKey) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces the local entry.
    pub(crate) fn put(&self, key: StoreKey, value: StoredValue) {
        self.entries.write().insert(key, Arc::new(Slot::filled(value)));
    }

    /// Removes the local entry, returning its value.
    pub(crate) fn remove(&self, key: &StoreKey) -> Option<StoredValue> {
        let slot = self.entries.write().remove(key)?;
        let mut value = slot.value.lock();
        slot.filled.store(false, Ordering::Release);
        value.take()
    }

    /// Returns the local value, computing and storing it if there is none.
    ///
    /// `creator` runs at most once per key at a time; callers racing on the
    /// same key block until the winner has stored its value. A failing creator
    /// leaves the key absent so the next call computes again.
    pub(crate) fn compute_if_absent<F, E>(&self, key: StoreKey, creator: F) -> Result<StoredValue, E>
    where
        F: FnOnce(&StoreKey) -> Result<StoredValue, E>,
    {
        loop {
            let slot = self.slot(&key);
            let mut value = slot.value.lock();
            // Replaced or removed while we waited for the lock.
            if !self.is_current(&key, &slot) {
                continue;
            }
            if let Some(existing) = value.as_ref() {
                return Ok(existing.clone());
            }

            trace!(key = ?key, "Computing absent store value");
            return match creator(&key) {
                Ok(computed) => {
                    *value = Some(computed.clone());
                    slot.filled.store(true, Ordering::Release);
                    Ok(computed)
                }
                Err(err) => {
                    let mut entries = self.entries.write();
                    if entries.get(&key).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
                        entries.remove(&key);
                    }
                    Err(err)
                }
            };
        }
    }

    /// Number of keys that currently hold a value. Never waits on a
    /// computation in progress.
    pub(crate) fn len(&self) -> usize {
        self.entries.read().values().filter(|slot| slot.is_filled()).count()
    }

    /// Number of slots, including empty ones awaiting a computation.
    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.entries.read().len()
    }

    fn is_current(&self, key: &StoreKey, slot: &Arc<Slot>) -> bool {
        self.entries
            .read()
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    fn slot(&self, key: &StoreKey) -> Arc<Slot> {
        if let Some(slot) = self.entries.read().get(key) {
            return slot.clone();
        }
        self.entries
            .write()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Slot::default()))
            .clone()
    }
}
