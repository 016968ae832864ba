//! Single-entry memoization shared by the time-function and model caches.
//!
//! Every cached value in the engine is a pure function of its key, so a
//! racing writer can only store an identical result. The slot therefore uses
//! read-through with last-writer-wins and recovers from a poisoned lock.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Remembers the most recent `key -> value` pair.
pub struct Memo<K, V> {
    slot: Mutex<Option<(K, V)>>,
}

impl<K, V> Memo<K, V>
where
    K: PartialEq + Copy,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// The computation runs without the lock held so nested memos never
    /// contend with each other.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.lookup(key) {
            return value;
        }
        let value = compute();
        *self.lock() = Some((key, value.clone()));
        value
    }

    /// Fallible variant of [`Memo::get_or_insert_with`]; errors are not cached.
    pub fn try_get_or_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }
        let value = compute()?;
        *self.lock() = Some((key, value.clone()));
        Ok(value)
    }

    /// Cached value for `key`, if it is the most recent entry.
    pub fn lookup(&self, key: K) -> Option<V> {
        match self.lock().as_ref() {
            Some((cached, value)) if *cached == key => Some(value.clone()),
            _ => None,
        }
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<(K, V)>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: PartialEq + Copy, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning starts an empty cache: memoized values are never part of identity.
impl<K: PartialEq + Copy, V: Clone> Clone for Memo<K, V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Memo<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Memo")
    }
}
