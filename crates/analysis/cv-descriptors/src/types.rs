//! Types as seen by descriptors
//!
//! A [`Ty`] never points at a class descriptor. Class constructors are
//! recorded as [`ClassId`] keys and resolved through the finder only when a
//! caller needs the class, so building a type cannot trigger resolution.

use cv_ids::{ClassId, Name};
use cv_intern::Interner;
use rustc_hash::FxHashMap;
use std::iter;

/// Variance of a type parameter or of a use-site projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    /// `in`
    In,
    /// `out`
    Out,
    /// No annotation
    Invariant,
}

impl Variance {
    fn prefix(self) -> &'static str {
        match self {
            Self::In => "in ",
            Self::Out => "out ",
            Self::Invariant => "",
        }
    }
}

/// What a type applies its arguments to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TyConstructor {
    /// A class, resolved through the finder on demand
    Class(ClassId),
    /// A type parameter in scope where the type was written
    TypeParameter {
        /// Id of the parameter inside its serialized entry
        id: u32,
        /// Declared name
        name: Name,
    },
    /// Placeholder for a type that could not be resolved
    Error(String),
}

/// A type argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeProjection {
    /// `*`
    Star,
    /// A projected type
    Type {
        /// Use-site variance
        variance: Variance,
        /// Argument type
        ty: Ty,
    },
}

impl TypeProjection {
    /// An invariant projection of `ty`
    #[must_use]
    pub fn invariant(ty: Ty) -> Self {
        Self::Type {
            variance: Variance::Invariant,
            ty,
        }
    }

    fn substitute(&self, substitution: &TypeSubstitution) -> Self {
        match self {
            Self::Star => Self::Star,
            Self::Type { variance, ty } => Self::Type {
                variance: *variance,
                ty: ty.substitute(substitution),
            },
        }
    }

    fn render(&self, interner: &Interner) -> String {
        match self {
            Self::Star => "*".to_owned(),
            Self::Type { variance, ty } => format!("{}{}", variance.prefix(), ty.render(interner)),
        }
    }
}

/// A type reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ty {
    /// Class or type parameter being applied
    pub constructor: TyConstructor,
    /// Arguments in declaration order
    pub arguments: Vec<TypeProjection>,
    /// Whether the type admits `null`
    pub nullable: bool,
}

impl Ty {
    /// A non-null class type
    #[must_use]
    pub fn class(class_id: ClassId, arguments: Vec<TypeProjection>) -> Self {
        Self {
            constructor: TyConstructor::Class(class_id),
            arguments,
            nullable: false,
        }
    }

    /// A non-null reference to a type parameter
    #[must_use]
    pub fn type_parameter(id: u32, name: Name) -> Self {
        Self {
            constructor: TyConstructor::TypeParameter { id, name },
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// The error type carrying `message`
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            constructor: TyConstructor::Error(message.into()),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// Whether this is the error type
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.constructor, TyConstructor::Error(_))
    }

    /// Class applied by this type, if it is a class type
    #[must_use]
    pub fn class_id(&self) -> Option<&ClassId> {
        match &self.constructor {
            TyConstructor::Class(class_id) => Some(class_id),
            TyConstructor::TypeParameter { .. } | TyConstructor::Error(_) => None,
        }
    }

    /// Replaces type parameters bound in `substitution`
    #[must_use]
    pub fn substitute(&self, substitution: &TypeSubstitution) -> Self {
        if let TyConstructor::TypeParameter { id, .. } = &self.constructor
            && let Some(replacement) = substitution.get(*id)
        {
            let mut ty = replacement.clone();
            ty.nullable |= self.nullable;
            return ty;
        }
        Self {
            constructor: self.constructor.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|argument| argument.substitute(substitution))
                .collect(),
            nullable: self.nullable,
        }
    }

    /// Largest type parameter id referenced anywhere in the type
    pub(crate) fn max_parameter_id(&self) -> Option<u32> {
        let own = match &self.constructor {
            TyConstructor::TypeParameter { id, .. } => Some(*id),
            TyConstructor::Class(_) | TyConstructor::Error(_) => None,
        };
        self.arguments
            .iter()
            .filter_map(|argument| match argument {
                TypeProjection::Star => None,
                TypeProjection::Type { ty, .. } => ty.max_parameter_id(),
            })
            .chain(own)
            .max()
    }

    /// Renders as `pkg/Outer.Inner<Arg>?`
    #[must_use]
    pub fn render(&self, interner: &Interner) -> String {
        let mut text = match &self.constructor {
            TyConstructor::Class(class_id) => class_id.render(interner),
            TyConstructor::TypeParameter { name, .. } => interner.resolve(name),
            TyConstructor::Error(message) => format!("[ERROR: {message}]"),
        };
        if !self.arguments.is_empty() {
            let arguments: Vec<_> = self
                .arguments
                .iter()
                .map(|argument| argument.render(interner))
                .collect();
            text.push('<');
            text.push_str(&arguments.join(", "));
            text.push('>');
        }
        if self.nullable {
            text.push('?');
        }
        text
    }
}

/// Binding of type parameter ids to concrete types
///
/// Star-projected arguments leave their parameter unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    bindings: FxHashMap<u32, Ty>,
}

impl TypeSubstitution {
    /// Binds `parameters` to `arguments` position by position
    ///
    /// Extra parameters or arguments on either side are ignored. Parameters
    /// bound to themselves are skipped, so the result is empty when nothing
    /// would change.
    #[must_use]
    pub fn new(parameters: &[TypeParameterDescriptor], arguments: &[TypeProjection]) -> Self {
        let mut bindings = FxHashMap::default();
        for (parameter, argument) in parameters.iter().zip(arguments) {
            let TypeProjection::Type { ty, .. } = argument else {
                continue;
            };
            if *ty == parameter.default_type() {
                continue;
            }
            bindings.insert(parameter.id, ty.clone());
        }
        Self { bindings }
    }

    /// Whether no parameter is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Type bound to the parameter `id`
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Ty> {
        self.bindings.get(&id)
    }

    /// Binds the parameter `id` to `ty`, replacing any earlier binding
    pub(crate) fn bind(&mut self, id: u32, ty: Ty) {
        self.bindings.insert(id, ty);
    }

    /// Largest type parameter id bound or referenced by a bound type
    pub(crate) fn max_parameter_id(&self) -> Option<u32> {
        self.bindings
            .iter()
            .flat_map(|(id, ty)| iter::once(*id).chain(ty.max_parameter_id()))
            .max()
    }
}

/// A declared type parameter of a class or callable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameterDescriptor {
    /// Id used by type references inside the same entry
    pub id: u32,
    /// Declared name
    pub name: Name,
    /// Position in the declaring list
    pub index: usize,
    /// Whether the parameter is reified
    pub reified: bool,
    /// Declaration-site variance
    pub variance: Variance,
    /// Upper bounds; empty means the default bound
    pub upper_bounds: Vec<Ty>,
}

impl TypeParameterDescriptor {
    /// Type referencing this parameter
    #[must_use]
    pub fn default_type(&self) -> Ty {
        Ty::type_parameter(self.id, self.name)
    }

    /// The parameter with its bounds substituted
    #[must_use]
    pub fn substitute(&self, substitution: &TypeSubstitution) -> Self {
        Self {
            upper_bounds: self
                .upper_bounds
                .iter()
                .map(|bound| bound.substitute(substitution))
                .collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter(interner: &Interner, id: u32, name: &str) -> TypeParameterDescriptor {
        TypeParameterDescriptor {
            id,
            name: interner.intern(name),
            index: id as usize,
            reified: false,
            variance: Variance::Invariant,
            upper_bounds: Vec::new(),
        }
    }

    #[test]
    fn test_substitution_keeps_outer_nullability() {
        let interner = Interner::new();
        let element = parameter(&interner, 0, "E");
        let string = Ty::class(ClassId::parse("jet/String", &interner).unwrap(), Vec::new());
        let substitution =
            TypeSubstitution::new(&[element.clone()], &[TypeProjection::invariant(string)]);

        let list = Ty::class(
            ClassId::parse("jet/List", &interner).unwrap(),
            vec![TypeProjection::Type {
                variance: Variance::Out,
                ty: Ty {
                    nullable: true,
                    ..element.default_type()
                },
            }],
        );
        assert_eq!(
            list.substitute(&substitution).render(&interner),
            "jet/List<out jet/String?>"
        );
    }

    #[test]
    fn test_identity_and_star_arguments_bind_nothing() {
        let interner = Interner::new();
        let first = parameter(&interner, 0, "K");
        let second = parameter(&interner, 1, "V");
        let substitution = TypeSubstitution::new(
            &[first.clone(), second],
            &[TypeProjection::invariant(first.default_type()), TypeProjection::Star],
        );
        assert!(substitution.is_empty());
        assert_eq!(Ty::error("boom").render(&interner), "[ERROR: boom]");
    }
}
