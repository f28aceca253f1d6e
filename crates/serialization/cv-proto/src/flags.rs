//! Bitfields packed into the `flags` word of serialized entries
//!
//! Layout of the word:
//!
//! | bits | classes | callables | value parameters |
//! |------|---------|-----------|------------------|
//! | 0 | has annotations | has annotations | has annotations |
//! | 1..4 | visibility | visibility | declares default value (bit 1) |
//! | 4..6 | modality | modality | |
//! | 6..9 | class kind | callable kind | |
//! | 9 | inner | member kind (9..11) | |

use crate::error::ProtoError;

/// A fixed-width field inside a flags word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagField {
    name: &'static str,
    offset: u32,
    width: u32,
}

impl FlagField {
    /// Whether the entry carries annotations
    pub const HAS_ANNOTATIONS: Self = Self::new("has_annotations", 0, 1);
    /// [`ProtoVisibility`] of a class or callable
    pub const VISIBILITY: Self = Self::new("visibility", 1, 3);
    /// [`ProtoModality`] of a class or callable
    pub const MODALITY: Self = Self::new("modality", 4, 2);
    /// [`ProtoClassKind`] of a class
    pub const CLASS_KIND: Self = Self::new("class_kind", 6, 3);
    /// Whether a nested class is `inner`
    pub const INNER: Self = Self::new("inner", 9, 1);
    /// [`ProtoCallableKind`] of a callable
    pub const CALLABLE_KIND: Self = Self::new("callable_kind", 6, 3);
    /// [`ProtoMemberKind`] of a callable
    pub const MEMBER_KIND: Self = Self::new("member_kind", 9, 2);
    /// Whether a value parameter declares a default value
    pub const DECLARES_DEFAULT_VALUE: Self = Self::new("declares_default_value", 1, 1);

    const fn new(name: &'static str, offset: u32, width: u32) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    const fn mask(self) -> u32 {
        (1 << self.width) - 1
    }

    /// Field name used in diagnostics
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Raw value of this field in `flags`
    #[must_use]
    pub const fn get(self, flags: u32) -> u32 {
        (flags >> self.offset) & self.mask()
    }

    /// Whether a one-bit field is set in `flags`
    #[must_use]
    pub const fn is_set(self, flags: u32) -> bool {
        self.get(flags) != 0
    }

    /// `flags` with this field replaced by `value`
    #[must_use]
    pub const fn set(self, flags: u32, value: u32) -> u32 {
        (flags & !(self.mask() << self.offset)) | ((value & self.mask()) << self.offset)
    }
}

macro_rules! flag_enum {
    (
        $(#[$meta:meta])*
        $name:ident in $field:ident {
            $($(#[$variant_meta:meta])* $variant:ident = $raw:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bincode::Encode, bincode::Decode)]
        pub enum $name {
            $($(#[$variant_meta])* $variant,)+
        }

        impl $name {
            /// Decodes the raw field value
            ///
            /// # Errors
            ///
            /// Returns [`ProtoError::UnknownFlagValue`] for values outside of the enumeration.
            pub fn from_raw(value: u32) -> Result<Self, ProtoError> {
                match value {
                    $($raw => Ok(Self::$variant),)+
                    _ => Err(ProtoError::UnknownFlagValue {
                        field: FlagField::$field.name(),
                        value,
                    }),
                }
            }

            /// Raw field value
            #[must_use]
            pub const fn raw(self) -> u32 {
                match self {
                    $(Self::$variant => $raw,)+
                }
            }

            /// Reads this field out of a flags word
            ///
            /// # Errors
            ///
            /// Returns [`ProtoError::UnknownFlagValue`] for values outside of the enumeration.
            pub fn read(flags: u32) -> Result<Self, ProtoError> {
                Self::from_raw(FlagField::$field.get(flags))
            }
        }
    };
}

flag_enum! {
    /// Serialized visibility
    ProtoVisibility in VISIBILITY {
        /// Visible inside the module
        #[default]
        Internal = 0,
        /// Visible inside the declaring scope
        Private = 1,
        /// Visible to subclasses
        Protected = 2,
        /// Visible everywhere
        Public = 3,
        /// Platform-specific visibility without a source equivalent
        Extra = 4,
    }
}

flag_enum! {
    /// Serialized modality
    ProtoModality in MODALITY {
        /// Cannot be overridden
        #[default]
        Final = 0,
        /// May be overridden
        Open = 1,
        /// Must be overridden
        Abstract = 2,
    }
}

flag_enum! {
    /// Serialized class kind
    ProtoClassKind in CLASS_KIND {
        /// Ordinary class
        #[default]
        Class = 0,
        /// Interface
        Trait = 1,
        /// Enum class
        EnumClass = 2,
        /// Entry of an enum class
        EnumEntry = 3,
        /// Annotation class
        AnnotationClass = 4,
        /// Singleton object declaration
        Object = 5,
        /// Class object (companion) of a class
        ClassObject = 6,
    }
}

flag_enum! {
    /// Serialized callable kind
    ProtoCallableKind in CALLABLE_KIND {
        /// Function
        #[default]
        Fun = 0,
        /// Read-only property
        Val = 1,
        /// Mutable property
        Var = 2,
        /// Constructor
        Constructor = 3,
    }
}

flag_enum! {
    /// How a callable came to exist in its container
    ProtoMemberKind in MEMBER_KIND {
        /// Written in source
        #[default]
        Declaration = 0,
        /// Inherited without being redeclared
        FakeOverride = 1,
        /// Generated by delegation
        Delegation = 2,
        /// Generated by the compiler
        Synthesized = 3,
    }
}

/// Decoded flags of a class entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassFlags {
    /// Whether annotations were serialized
    pub has_annotations: bool,
    /// Visibility
    pub visibility: ProtoVisibility,
    /// Modality
    pub modality: ProtoModality,
    /// Kind of class
    pub kind: ProtoClassKind,
    /// Inner (captures the outer instance)
    pub inner: bool,
}

impl ClassFlags {
    /// Decodes a class flags word
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::UnknownFlagValue`] if any field is out of range.
    pub fn decode(flags: u32) -> Result<Self, ProtoError> {
        Ok(Self {
            has_annotations: FlagField::HAS_ANNOTATIONS.is_set(flags),
            visibility: ProtoVisibility::read(flags)?,
            modality: ProtoModality::read(flags)?,
            kind: ProtoClassKind::read(flags)?,
            inner: FlagField::INNER.is_set(flags),
        })
    }

    /// Packs the flags into a word
    #[must_use]
    pub fn encode(self) -> u32 {
        let flags = FlagField::HAS_ANNOTATIONS.set(0, u32::from(self.has_annotations));
        let flags = FlagField::VISIBILITY.set(flags, self.visibility.raw());
        let flags = FlagField::MODALITY.set(flags, self.modality.raw());
        let flags = FlagField::CLASS_KIND.set(flags, self.kind.raw());
        FlagField::INNER.set(flags, u32::from(self.inner))
    }
}

/// Decoded flags of a callable entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallableFlags {
    /// Whether annotations were serialized
    pub has_annotations: bool,
    /// Visibility
    pub visibility: ProtoVisibility,
    /// Modality
    pub modality: ProtoModality,
    /// Function, property or constructor
    pub callable_kind: ProtoCallableKind,
    /// Declaration, fake override, ...
    pub member_kind: ProtoMemberKind,
}

impl CallableFlags {
    /// Decodes a callable flags word
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::UnknownFlagValue`] if any field is out of range.
    pub fn decode(flags: u32) -> Result<Self, ProtoError> {
        Ok(Self {
            has_annotations: FlagField::HAS_ANNOTATIONS.is_set(flags),
            visibility: ProtoVisibility::read(flags)?,
            modality: ProtoModality::read(flags)?,
            callable_kind: ProtoCallableKind::read(flags)?,
            member_kind: ProtoMemberKind::read(flags)?,
        })
    }

    /// Packs the flags into a word
    #[must_use]
    pub fn encode(self) -> u32 {
        let flags = FlagField::HAS_ANNOTATIONS.set(0, u32::from(self.has_annotations));
        let flags = FlagField::VISIBILITY.set(flags, self.visibility.raw());
        let flags = FlagField::MODALITY.set(flags, self.modality.raw());
        let flags = FlagField::CALLABLE_KIND.set(flags, self.callable_kind.raw());
        FlagField::MEMBER_KIND.set(flags, self.member_kind.raw())
    }
}

/// Decoded flags of a value parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterFlags {
    /// Whether annotations were serialized
    pub has_annotations: bool,
    /// Whether the parameter has a default value
    pub declares_default_value: bool,
}

impl ParameterFlags {
    /// Decodes a parameter flags word
    #[must_use]
    pub fn decode(flags: u32) -> Self {
        Self {
            has_annotations: FlagField::HAS_ANNOTATIONS.is_set(flags),
            declares_default_value: FlagField::DECLARES_DEFAULT_VALUE.is_set(flags),
        }
    }

    /// Packs the flags into a word
    #[must_use]
    pub fn encode(self) -> u32 {
        let flags = FlagField::HAS_ANNOTATIONS.set(0, u32::from(self.has_annotations));
        FlagField::DECLARES_DEFAULT_VALUE.set(flags, u32::from(self.declares_default_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_flags_layout() {
        let flags = ClassFlags {
            has_annotations: true,
            visibility: ProtoVisibility::Public,
            modality: ProtoModality::Abstract,
            kind: ProtoClassKind::EnumClass,
            inner: false,
        };
        let word = flags.encode();
        assert_eq!(word, 0b0_010_10_011_1);
        assert_eq!(ClassFlags::decode(word), Ok(flags));
    }

    #[test]
    fn test_unknown_visibility_is_rejected() {
        let word = FlagField::VISIBILITY.set(0, 7);
        assert_eq!(
            ClassFlags::decode(word),
            Err(ProtoError::UnknownFlagValue {
                field: "visibility",
                value: 7
            })
        );
    }

    #[test]
    fn test_set_only_touches_its_field() {
        let word = FlagField::MEMBER_KIND.set(u32::MAX, 0);
        assert_eq!(FlagField::MEMBER_KIND.get(word), 0);
        assert!(FlagField::HAS_ANNOTATIONS.is_set(word));
        assert_eq!(FlagField::CALLABLE_KIND.get(word), 0b111);
    }
}
