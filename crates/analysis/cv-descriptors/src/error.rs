//! Errors raised while turning serialized entries into descriptors

use cv_proto::{ProtoCallableKind, ProtoClassKind, ProtoError};
use cv_storage::StorageError;

/// Failure to build a descriptor or one of its lazily computed parts
///
/// Errors are cached by the cell that produced them, so every value is
/// `Clone` and a repeated read returns the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeserializationError {
    /// The serialized entry itself is malformed
    #[error(transparent)]
    Proto(#[from] ProtoError),

    /// The memoization layer refused the read
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// An object or enum entry declares a class object without its payload
    #[error("class object data is missing for `{class}`")]
    MissingClassObjectData {
        /// Rendered class id of the declaring class
        class: String,
    },

    /// An inline class payload has a kind that cannot appear in its position
    #[error("`{class}` cannot be of kind {kind:?} here")]
    UnsupportedClassKind {
        /// Rendered class id of the payload
        class: String,
        /// Kind found in the payload
        kind: ProtoClassKind,
    },

    /// A callable entry has a kind that cannot appear in its position
    #[error("expected {expected}, found callable of kind {found:?}")]
    UnexpectedCallableKind {
        /// What the position requires
        expected: &'static str,
        /// Kind found in the entry
        found: ProtoCallableKind,
    },
}
