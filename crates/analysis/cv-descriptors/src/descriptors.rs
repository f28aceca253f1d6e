//! Descriptor vocabulary shared by classes, packages and members

use crate::class::ClassDescriptorId;
use crate::package::PackageDescriptorId;
use crate::types::{Ty, TypeParameterDescriptor, TypeSubstitution};
use cv_ids::{ClassId, Name};
use cv_intern::Interner;
use cv_proto::{ProtoClassKind, ProtoMemberKind, ProtoModality, ProtoVisibility};
use std::cmp::Ordering;
use std::iter;
use std::sync::Arc;

/// Shared list of member descriptors
pub type Callables = Arc<[Arc<CallableDescriptor>]>;

/// Declared visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible inside the declaring scope
    Private,
    /// Visible to subclasses
    Protected,
    /// Visible inside the module
    Internal,
    /// Visible everywhere
    Public,
    /// Platform-specific visibility
    Extra,
    /// Not yet known; fake overrides whose overridden members disagree keep this
    Inherited,
}

impl Visibility {
    /// Partial order of visibilities
    ///
    /// `Private` is below everything comparable, `Public` above; `Protected`
    /// and `Internal` are incomparable with each other, `Extra` and
    /// `Inherited` only compare equal to themselves.
    #[must_use]
    pub fn compare(self, other: Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        let (Some(left), Some(right)) = (self.rank(), other.rank()) else {
            return None;
        };
        if left == right {
            // Protected vs Internal
            return None;
        }
        Some(left.cmp(&right))
    }

    fn rank(self) -> Option<u8> {
        match self {
            Self::Private => Some(0),
            Self::Protected | Self::Internal => Some(1),
            Self::Public => Some(2),
            Self::Extra | Self::Inherited => None,
        }
    }

    /// Source keyword
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::Public => "public",
            Self::Extra => "extra",
            Self::Inherited => "inherited",
        }
    }
}

impl From<ProtoVisibility> for Visibility {
    fn from(visibility: ProtoVisibility) -> Self {
        match visibility {
            ProtoVisibility::Internal => Self::Internal,
            ProtoVisibility::Private => Self::Private,
            ProtoVisibility::Protected => Self::Protected,
            ProtoVisibility::Public => Self::Public,
            ProtoVisibility::Extra => Self::Extra,
        }
    }
}

/// Whether a declaration can be overridden; ordered from most to least restrictive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modality {
    /// Cannot be overridden
    Final,
    /// May be overridden
    Open,
    /// Must be overridden
    Abstract,
}

impl Modality {
    /// Source keyword
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Final => "final",
            Self::Open => "open",
            Self::Abstract => "abstract",
        }
    }
}

impl From<ProtoModality> for Modality {
    fn from(modality: ProtoModality) -> Self {
        match modality {
            ProtoModality::Final => Self::Final,
            ProtoModality::Open => Self::Open,
            ProtoModality::Abstract => Self::Abstract,
        }
    }
}

/// Kind of a class descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Ordinary class
    Class,
    /// Interface
    Trait,
    /// Enum class
    EnumClass,
    /// Entry of an enum class
    EnumEntry,
    /// Annotation class
    AnnotationClass,
    /// Singleton object
    Object,
    /// Class object of another class
    ClassObject,
}

impl ClassKind {
    /// Whether instances are singletons
    #[must_use]
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Object | Self::EnumEntry | Self::ClassObject)
    }

    /// Source keyword
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Trait => "trait",
            Self::EnumClass => "enum class",
            Self::EnumEntry => "enum entry",
            Self::AnnotationClass => "annotation class",
            Self::Object => "object",
            Self::ClassObject => "class object",
        }
    }
}

impl From<ProtoClassKind> for ClassKind {
    fn from(kind: ProtoClassKind) -> Self {
        match kind {
            ProtoClassKind::Class => Self::Class,
            ProtoClassKind::Trait => Self::Trait,
            ProtoClassKind::EnumClass => Self::EnumClass,
            ProtoClassKind::EnumEntry => Self::EnumEntry,
            ProtoClassKind::AnnotationClass => Self::AnnotationClass,
            ProtoClassKind::Object => Self::Object,
            ProtoClassKind::ClassObject => Self::ClassObject,
        }
    }
}

/// Function, property or constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableKind {
    /// A function
    Function,
    /// A property
    Property {
        /// `var` rather than `val`
        mutable: bool,
    },
    /// A constructor
    Constructor {
        /// Whether this is the primary constructor
        primary: bool,
    },
}

/// How a member came to exist in its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Written in source
    Declaration,
    /// Inherited from supertypes without being redeclared
    FakeOverride,
    /// Generated by delegation
    Delegation,
    /// Generated by the compiler
    Synthesized,
}

impl From<ProtoMemberKind> for MemberKind {
    fn from(kind: ProtoMemberKind) -> Self {
        match kind {
            ProtoMemberKind::Declaration => Self::Declaration,
            ProtoMemberKind::FakeOverride => Self::FakeOverride,
            ProtoMemberKind::Delegation => Self::Delegation,
            ProtoMemberKind::Synthesized => Self::Synthesized,
        }
    }
}

/// Compile-time constant passed to an annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantValue {
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// String literal
    String(String),
    /// Class literal
    Class(ClassId),
}

/// An annotation applied to a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Type of the annotation class
    pub ty: Ty,
    /// Named arguments in source order
    pub arguments: Vec<(Name, ConstantValue)>,
}

/// Container of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationRef {
    /// A class in the session arena
    Class(ClassDescriptorId),
    /// A package in the session arena
    Package(PackageDescriptorId),
    /// Placeholder for a container that could not be found
    Error,
}

/// Anything a member scope can enumerate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationDescriptor {
    /// A class or object
    Class(ClassDescriptorId),
    /// A package
    Package(PackageDescriptorId),
    /// A function or property
    Callable(Arc<CallableDescriptor>),
}

/// Implicit or extension receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverParameter {
    /// Declaration the receiver belongs to
    pub owner: DeclarationRef,
    /// Type of `this`
    pub ty: Ty,
}

/// A value parameter of a function or constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueParameter {
    /// Declared name
    pub name: Name,
    /// Position in the parameter list
    pub index: usize,
    /// Declared type (the array type for varargs)
    pub ty: Ty,
    /// Element type when the parameter is `vararg`
    pub vararg_element_type: Option<Ty>,
    /// Whether the parameter has a default value
    pub declares_default_value: bool,
    /// Annotations on the parameter
    pub annotations: Vec<Annotation>,
}

/// A function, property or constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableDescriptor {
    /// Declared name; `<init>` for constructors
    pub name: Name,
    /// Function, property or constructor
    pub kind: CallableKind,
    /// Declaration, fake override, ...
    pub member_kind: MemberKind,
    /// Modality
    pub modality: Modality,
    /// Visibility
    pub visibility: Visibility,
    /// Class or package declaring the member
    pub container: DeclarationRef,
    /// Own type parameters
    pub type_parameters: Vec<TypeParameterDescriptor>,
    /// Extension receiver type
    pub receiver_type: Option<Ty>,
    /// Value parameters
    pub value_parameters: Vec<ValueParameter>,
    /// Return type; the property type for properties
    pub return_type: Ty,
    /// Annotations on the member
    pub annotations: Vec<Annotation>,
    /// Members this one directly overrides
    pub overridden: Vec<Arc<CallableDescriptor>>,
    /// Unsubstituted member when this is a view through a generic supertype
    pub original: Option<Arc<CallableDescriptor>>,
}

impl CallableDescriptor {
    /// Whether this is a function
    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self.kind, CallableKind::Function)
    }

    /// Whether this is a property
    #[must_use]
    pub fn is_property(&self) -> bool {
        matches!(self.kind, CallableKind::Property { .. })
    }

    /// Whether this is a constructor
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, CallableKind::Constructor { .. })
    }

    /// The member with `substitution` applied to its signature
    ///
    /// The result records the unsubstituted member as its `original`. An
    /// empty substitution returns `this` itself. Otherwise the member's own
    /// type parameters get fresh ids above every id in the member and the
    /// substitution.
    #[must_use]
    pub fn substitute(this: &Arc<Self>, substitution: &TypeSubstitution) -> Arc<Self> {
        if substitution.is_empty() {
            return Arc::clone(this);
        }
        let original = this.original.as_ref().map_or_else(|| Arc::clone(this), Arc::clone);
        let first_fresh = this
            .max_parameter_id()
            .max(substitution.max_parameter_id())
            .map_or(0, |id| id.saturating_add(1));
        let mut renaming = substitution.clone();
        let renamed: Vec<_> = this
            .type_parameters
            .iter()
            .zip(first_fresh..)
            .map(|(parameter, id)| {
                renaming.bind(parameter.id, Ty::type_parameter(id, parameter.name));
                TypeParameterDescriptor {
                    id,
                    ..parameter.clone()
                }
            })
            .collect();
        Arc::new(Self {
            type_parameters: renamed
                .iter()
                .map(|parameter| parameter.substitute(&renaming))
                .collect(),
            receiver_type: this.receiver_type.as_ref().map(|ty| ty.substitute(&renaming)),
            value_parameters: this
                .value_parameters
                .iter()
                .map(|parameter| ValueParameter {
                    ty: parameter.ty.substitute(&renaming),
                    vararg_element_type: parameter
                        .vararg_element_type
                        .as_ref()
                        .map(|ty| ty.substitute(&renaming)),
                    ..parameter.clone()
                })
                .collect(),
            return_type: this.return_type.substitute(&renaming),
            original: Some(original),
            ..(**this).clone()
        })
    }

    fn max_parameter_id(&self) -> Option<u32> {
        let types = self
            .receiver_type
            .iter()
            .chain(
                self.value_parameters
                    .iter()
                    .flat_map(|parameter| iter::once(&parameter.ty).chain(&parameter.vararg_element_type)),
            )
            .chain(iter::once(&self.return_type))
            .chain(self.type_parameters.iter().flat_map(|parameter| &parameter.upper_bounds));
        types
            .filter_map(Ty::max_parameter_id)
            .chain(self.type_parameters.iter().map(|parameter| parameter.id))
            .max()
    }

    /// One-line rendering, e.g. `public open fun greet(name: jet/String): jet/Unit`
    #[must_use]
    pub fn render(&self, interner: &Interner) -> String {
        let keyword = match self.kind {
            CallableKind::Function => "fun",
            CallableKind::Property { mutable: false } => "val",
            CallableKind::Property { mutable: true } => "var",
            CallableKind::Constructor { .. } => "constructor",
        };
        let mut text = format!(
            "{} {} {keyword} ",
            self.visibility.keyword(),
            self.modality.keyword()
        );
        if !self.type_parameters.is_empty() {
            let parameters: Vec<_> = self
                .type_parameters
                .iter()
                .map(|parameter| interner.resolve(&parameter.name))
                .collect();
            text.push_str(&format!("<{}> ", parameters.join(", ")));
        }
        if let Some(receiver) = &self.receiver_type {
            text.push_str(&receiver.render(interner));
            text.push('.');
        }
        text.push_str(&interner.resolve(&self.name));
        if !self.is_property() {
            let parameters: Vec<_> = self
                .value_parameters
                .iter()
                .map(|parameter| {
                    let vararg = if parameter.vararg_element_type.is_some() { "vararg " } else { "" };
                    let default = if parameter.declares_default_value { " = ..." } else { "" };
                    format!(
                        "{vararg}{}: {}{default}",
                        interner.resolve(&parameter.name),
                        parameter.ty.render(interner)
                    )
                })
                .collect();
            text.push_str(&format!("({})", parameters.join(", ")));
        }
        text.push_str(": ");
        text.push_str(&self.return_type.render(interner));
        match self.member_kind {
            MemberKind::Declaration => {}
            MemberKind::FakeOverride => text.push_str(" /* fake override */"),
            MemberKind::Delegation => text.push_str(" /* delegation */"),
            MemberKind::Synthesized => text.push_str(" /* synthesized */"),
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_partial_order() {
        assert_eq!(
            Visibility::Private.compare(Visibility::Public),
            Some(Ordering::Less)
        );
        assert_eq!(
            Visibility::Public.compare(Visibility::Internal),
            Some(Ordering::Greater)
        );
        assert_eq!(Visibility::Protected.compare(Visibility::Internal), None);
        assert_eq!(Visibility::Extra.compare(Visibility::Public), None);
        assert_eq!(
            Visibility::Inherited.compare(Visibility::Inherited),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_modality_order() {
        let group = [Modality::Abstract, Modality::Final, Modality::Open];
        assert_eq!(group.iter().min(), Some(&Modality::Final));
    }
}
