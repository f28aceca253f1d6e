//! Errors raised while decoding serialized entries

/// A serialized entry that does not match the format this reader expects
///
/// Every variant points at a producer/consumer mismatch rather than a
/// recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtoError {
    /// The byte stream could not be decoded
    #[error("malformed serialized entry: {message}")]
    Decode {
        /// Decoder diagnostic
        message: String,
    },

    /// An entry could not be encoded
    #[error("cannot encode entry: {message}")]
    Encode {
        /// Encoder diagnostic
        message: String,
    },

    /// A string index points past the end of the string table
    #[error("unknown string index {index}")]
    UnknownString {
        /// The offending index
        index: u32,
    },

    /// A qualified-name index points past the end of the table
    #[error("unknown qualified name index {index}")]
    UnknownQualifiedName {
        /// The offending index
        index: u32,
    },

    /// A qualified name used as a class id does not end in a class segment,
    /// or mixes class and package segments in the wrong order
    #[error("qualified name {index} is not a class name")]
    NotAClassName {
        /// The offending index
        index: u32,
    },

    /// The parent chain of a qualified name loops
    #[error("qualified name {index} has a cyclic parent chain")]
    CyclicQualifiedName {
        /// The offending index
        index: u32,
    },

    /// A flag field holds a value outside of its enumeration
    #[error("flag field `{field}` has unknown value {value}")]
    UnknownFlagValue {
        /// Name of the bitfield
        field: &'static str,
        /// Raw value found in the entry
        value: u32,
    },
}

impl From<bincode::error::DecodeError> for ProtoError {
    fn from(err: bincode::error::DecodeError) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

impl From<bincode::error::EncodeError> for ProtoError {
    fn from(err: bincode::error::EncodeError) -> Self {
        Self::Encode {
            message: err.to_string(),
        }
    }
}
