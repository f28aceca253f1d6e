//! Errors raised by the memoization substrate

/// Errors that occur while reading a memoized value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The current thread asked for a value it is already computing
    #[error("recursive access to lazy value `{label}` during its own computation")]
    RecursionDetected {
        /// Label of the cell that was re-entered
        label: &'static str,
    },

    /// A lock guarding the cell was poisoned by a panic
    #[error("lazy value `{label}` is poisoned")]
    Poisoned {
        /// Label of the poisoned cell
        label: &'static str,
    },
}
