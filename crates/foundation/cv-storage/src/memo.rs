//! Cached single-argument functions

use crate::error::StorageError;
use crate::lazy::LazyValue;
use crate::manager::StorageManager;
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

/// A function whose result is computed once per argument
///
/// Each key owns its own [`LazyValue`]; the key table lock is only held while
/// the cell is looked up, so computing the value for one key may call back
/// into the same function for another key. Misses (`None` results) are cached
/// exactly like hits.
pub struct MemoizedFunction<K, V> {
    label: &'static str,
    storage: StorageManager,
    cells: Mutex<FxHashMap<K, Arc<LazyValue<V>>>>,
}

impl<K, V> MemoizedFunction<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(label: &'static str, storage: StorageManager) -> Self {
        Self {
            label,
            storage,
            cells: Mutex::new(FxHashMap::default()),
        }
    }

    /// Number of keys that have been requested so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.lock().map_or(0, |cells| cells.len())
    }

    /// Whether no key has been requested yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: &K) -> Result<Arc<LazyValue<V>>, StorageError> {
        let mut cells = self
            .cells
            .lock()
            .map_err(|_| StorageError::Poisoned { label: self.label })?;
        if let Some(cell) = cells.get(key) {
            return Ok(Arc::clone(cell));
        }
        let cell = Arc::new(self.storage.lazy_value(self.label));
        cells.insert(key.clone(), Arc::clone(&cell));
        Ok(cell)
    }
}

impl<K, V> MemoizedFunction<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Returns the cached result for `key`, computing it on first request
    ///
    /// # Errors
    ///
    /// Propagates [`StorageError`] from the key's cell, in particular when the
    /// calling thread re-enters the computation for the same key.
    pub fn get_or_compute<F>(&self, key: &K, compute: F) -> Result<V, StorageError>
    where
        F: FnOnce(&K) -> V,
    {
        let cell = self.cell(key)?;
        cell.get_or_compute(|| compute(key))
    }

    /// Returns the result for `key` if it has already been computed
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<V> {
        let cells = self.cells.lock().ok()?;
        cells.get(key).and_then(|cell| cell.peek())
    }
}

impl<K, V> fmt::Debug for MemoizedFunction<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MemoizedFunction")
            .field("label", &self.label)
            .field("keys", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_misses_are_cached() {
        let storage = StorageManager::new();
        let lookup = storage.memoized_function::<u32, Option<u32>>("lookup");
        let calls = AtomicUsize::new(0);
        let find = |key: &u32| {
            calls.fetch_add(1, Ordering::SeqCst);
            (*key % 2 == 0).then_some(*key * 10)
        };

        assert_eq!(lookup.get_or_compute(&3, find).unwrap(), None);
        assert_eq!(lookup.get_or_compute(&3, find).unwrap(), None);
        assert_eq!(lookup.get_or_compute(&4, find).unwrap(), Some(40));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(lookup.peek(&4), Some(Some(40)));
        assert_eq!(lookup.len(), 2);
    }

    #[test]
    fn test_reentrant_call_for_other_key() {
        let storage = StorageManager::new();
        let fib = storage.memoized_function::<u64, u64>("fib");

        fn compute(fib: &MemoizedFunction<u64, u64>, key: u64) -> u64 {
            if key < 2 {
                return key;
            }
            let first = fib.get_or_compute(&(key - 1), |next| compute(fib, *next));
            let second = fib.get_or_compute(&(key - 2), |next| compute(fib, *next));
            first.unwrap() + second.unwrap()
        }

        assert_eq!(fib.get_or_compute(&20, |key| compute(&fib, *key)).unwrap(), 6765);
        assert_eq!(storage.computations("fib"), 21);
    }
}
