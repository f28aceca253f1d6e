//! Top-level serialized units and their binary encoding

use crate::error::ProtoError;
use crate::names::NameTable;
use crate::proto::{ProtoClass, ProtoPackage};
use bincode::config;

/// Upper bound on the memory one decoded unit may claim
///
/// Length prefixes are checked against it before anything is allocated.
const MAX_DECODED_BYTES: usize = 64 * 1024 * 1024;

/// One class entry together with the names it refers to
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ClassData {
    /// Names used by `class` and everything nested in it
    pub names: NameTable,
    /// The class itself
    pub class: ProtoClass,
}

/// One package entry together with the names it refers to
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct PackageData {
    /// Names used by `package`
    pub names: NameTable,
    /// The package's top-level callables
    pub package: ProtoPackage,
}

macro_rules! binary_unit {
    ($unit:ident) => {
        impl $unit {
            /// Decodes a unit produced by [`Self::encode`]
            ///
            /// # Errors
            ///
            /// Returns [`ProtoError::Decode`] if `bytes` is not a valid encoding
            /// or declares more content than one unit may hold.
            pub fn decode(bytes: &[u8]) -> Result<Self, ProtoError> {
                let limited = config::standard().with_limit::<MAX_DECODED_BYTES>();
                let (unit, _) = bincode::decode_from_slice(bytes, limited)?;
                Ok(unit)
            }

            /// Encodes the unit
            ///
            /// # Errors
            ///
            /// Returns [`ProtoError::Encode`] if the encoder fails.
            pub fn encode(&self) -> Result<Vec<u8>, ProtoError> {
                Ok(bincode::encode_to_vec(self, config::standard())?)
            }
        }
    };
}

binary_unit!(ClassData);
binary_unit!(PackageData);
