//! Factory for memoized cells plus computation statistics

use crate::lazy::LazyValue;
use crate::memo::MemoizedFunction;
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Hands out memoized cells that report to a shared statistics table
///
/// Every cell is created with a label. Each time a cell runs its computation
/// the label's counter goes up by one, which lets callers check that a field
/// was computed at most once no matter how often it was read.
#[derive(Clone, Default)]
pub struct StorageManager {
    stats: Arc<StorageStats>,
}

#[derive(Default)]
struct StorageStats {
    computations: Mutex<FxHashMap<&'static str, usize>>,
}

impl StorageManager {
    /// Creates a storage manager with empty statistics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unresolved compute-once cell
    #[must_use]
    pub fn lazy_value<T>(&self, label: &'static str) -> LazyValue<T> {
        LazyValue::new(label, self.clone())
    }

    /// Creates a cached single-argument function
    #[must_use]
    pub fn memoized_function<K, V>(&self, label: &'static str) -> MemoizedFunction<K, V>
    where
        K: Eq + Hash + Clone,
    {
        MemoizedFunction::new(label, self.clone())
    }

    /// Number of real computations performed by cells carrying `label`
    #[must_use]
    pub fn computations(&self, label: &str) -> usize {
        self.lock_stats().get(label).copied().unwrap_or(0)
    }

    /// Number of real computations across all labels
    #[must_use]
    pub fn total_computations(&self) -> usize {
        self.lock_stats().values().sum()
    }

    pub(crate) fn record_computation(&self, label: &'static str) {
        *self.lock_stats().entry(label).or_insert(0) += 1;
    }

    fn lock_stats(&self) -> MutexGuard<'_, FxHashMap<&'static str, usize>> {
        // Counters stay meaningful even if a panicking computation poisoned the lock
        self.stats
            .computations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StorageManager {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StorageManager")
            .field("total_computations", &self.total_computations())
            .finish()
    }
}
