//! Compute-once cells

use crate::error::StorageError;
use crate::manager::StorageManager;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// A value computed at most once and then shared
///
/// The computation is supplied at read time. The first reader runs it while
/// concurrent readers on other threads wait for the published result. A read
/// from the thread that is currently running the computation fails with
/// [`StorageError::RecursionDetected`].
///
/// Fallible computations should return their `Result` as the value: the error
/// is then cached like any other outcome and every later read observes it.
pub struct LazyValue<T> {
    label: &'static str,
    storage: StorageManager,
    state: Mutex<LazyState<T>>,
    ready: Condvar,
}

enum LazyState<T> {
    Unresolved,
    Computing(ThreadId),
    Resolved(T),
}

impl<T> LazyValue<T> {
    pub(crate) fn new(label: &'static str, storage: StorageManager) -> Self {
        Self {
            label,
            storage,
            state: Mutex::new(LazyState::Unresolved),
            ready: Condvar::new(),
        }
    }

    /// Label used for statistics and diagnostics
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether the value has been published
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.lock()
            .is_ok_and(|state| matches!(*state, LazyState::Resolved(_)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, LazyState<T>>, StorageError> {
        self.state.lock().map_err(|_| StorageError::Poisoned { label: self.label })
    }
}

impl<T: Clone> LazyValue<T> {
    /// Returns the cached value, running `compute` if nobody has yet
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::RecursionDetected`] if the calling thread is
    /// already computing this value, or [`StorageError::Poisoned`] if the
    /// cell's lock was poisoned.
    pub fn get_or_compute<F>(&self, compute: F) -> Result<T, StorageError>
    where
        F: FnOnce() -> T,
    {
        let current = thread::current().id();
        let mut state = self.lock()?;
        loop {
            match &*state {
                LazyState::Resolved(value) => return Ok(value.clone()),
                LazyState::Computing(owner) if *owner == current => {
                    tracing::warn!(label = self.label, "re-entrant lazy value access");
                    return Err(StorageError::RecursionDetected { label: self.label });
                }
                LazyState::Computing(_) => {}
                LazyState::Unresolved => break,
            }
            state = self
                .ready
                .wait(state)
                .map_err(|_| StorageError::Poisoned { label: self.label })?;
        }
        *state = LazyState::Computing(current);
        drop(state);

        let mut guard = ComputingGuard {
            cell: self,
            published: false,
        };
        tracing::trace!(label = self.label, "computing lazy value");
        let value = compute();
        self.storage.record_computation(self.label);

        let mut state = self.lock()?;
        *state = LazyState::Resolved(value.clone());
        guard.published = true;
        drop(state);
        self.ready.notify_all();
        Ok(value)
    }

    /// Returns the value if it has already been published, without computing it
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        match &*self.lock().ok()? {
            LazyState::Resolved(value) => Some(value.clone()),
            LazyState::Unresolved | LazyState::Computing(_) => None,
        }
    }
}

/// Rolls a cell back to unresolved if its computation unwinds
struct ComputingGuard<'cell, T> {
    cell: &'cell LazyValue<T>,
    published: bool,
}

impl<T> Drop for ComputingGuard<'_, T> {
    fn drop(&mut self) {
        if self.published {
            return;
        }
        let mut state = self
            .cell
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *state = LazyState::Unresolved;
        drop(state);
        self.cell.ready.notify_all();
    }
}

impl<T> fmt::Debug for LazyValue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LazyValue")
            .field("label", &self.label)
            .field("computed", &self.is_computed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_computes_once() {
        let storage = StorageManager::new();
        let cell = storage.lazy_value::<u32>("answer");
        assert_eq!(cell.peek(), None);
        assert_eq!(cell.get_or_compute(|| 42).unwrap(), 42);
        assert_eq!(cell.get_or_compute(|| 7).unwrap(), 42);
        assert_eq!(cell.peek(), Some(42));
        assert_eq!(storage.computations("answer"), 1);
    }

    #[test]
    fn test_same_thread_reentrancy_is_detected() {
        let storage = StorageManager::new();
        let cell = storage.lazy_value::<Result<u32, StorageError>>("cyclic");
        let outer = cell
            .get_or_compute(|| cell.get_or_compute(|| Ok(1)).and_then(|inner| inner))
            .unwrap();
        assert_eq!(
            outer,
            Err(StorageError::RecursionDetected { label: "cyclic" })
        );
        // The failed outcome is what got cached
        assert_eq!(cell.peek(), Some(outer));
    }

    #[test]
    fn test_concurrent_first_access_computes_once() {
        let storage = StorageManager::new();
        let cell = Arc::new(storage.lazy_value::<usize>("shared"));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cell.get_or_compute(|| {
                        thread::sleep(Duration::from_millis(10));
                        calls.fetch_add(1, Ordering::SeqCst) + 100
                    })
                    .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 100);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(storage.computations("shared"), 1);
    }

    #[test]
    fn test_panic_resets_cell() {
        let storage = StorageManager::new();
        let cell = storage.lazy_value::<u32>("flaky");
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            cell.get_or_compute(|| panic!("boom")).unwrap()
        }));
        assert!(result.is_err());
        assert!(!cell.is_computed());
        assert_eq!(cell.get_or_compute(|| 5).unwrap(), 5);
    }
}
