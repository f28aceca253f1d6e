//! Serialized types to [`Ty`]

use crate::error::DeserializationError;
use crate::types::{Ty, TyConstructor, TypeParameterDescriptor, TypeProjection, Variance};
use cv_ids::Name;
use cv_proto::{
    NameResolver, ProtoConstructorKind, ProtoProjection, ProtoType, ProtoTypeParameter,
    ProtoVariance,
};
use rustc_hash::FxHashMap;

/// Maps [`ProtoType`]s to [`Ty`]s inside a chain of type-parameter scopes
///
/// A class owns the outermost context; each callable gets a child context
/// for its own type parameters, which shadow the class's.
pub struct TypeDeserializer<'ctx> {
    resolver: &'ctx dyn NameResolver,
    parent: Option<&'ctx TypeDeserializer<'ctx>>,
    type_parameters: FxHashMap<u32, Name>,
}

impl<'ctx> TypeDeserializer<'ctx> {
    /// A context with `type_parameters` in scope and no parent
    #[must_use]
    pub fn new(resolver: &'ctx dyn NameResolver, type_parameters: &[TypeParameterDescriptor]) -> Self {
        Self {
            resolver,
            parent: None,
            type_parameters: type_parameters
                .iter()
                .map(|parameter| (parameter.id, parameter.name))
                .collect(),
        }
    }

    /// Deserializes `protos` and returns them with a child context that has them in scope
    ///
    /// Bounds may refer to any parameter of the same list.
    ///
    /// # Errors
    ///
    /// Fails on unknown name indices.
    pub fn child(
        &'ctx self,
        protos: &[ProtoTypeParameter],
    ) -> Result<(Self, Vec<TypeParameterDescriptor>), DeserializationError> {
        let mut context = Self {
            resolver: self.resolver,
            parent: Some(self),
            type_parameters: FxHashMap::default(),
        };
        let parameters = context.declare(protos)?;
        Ok((context, parameters))
    }

    /// Deserializes the type parameters of a class, which have no enclosing context
    ///
    /// # Errors
    ///
    /// Fails on unknown name indices.
    pub fn class_type_parameters(
        resolver: &dyn NameResolver,
        protos: &[ProtoTypeParameter],
    ) -> Result<Vec<TypeParameterDescriptor>, DeserializationError> {
        let mut context = TypeDeserializer {
            resolver,
            parent: None,
            type_parameters: FxHashMap::default(),
        };
        context.declare(protos)
    }

    fn declare(
        &mut self,
        protos: &[ProtoTypeParameter],
    ) -> Result<Vec<TypeParameterDescriptor>, DeserializationError> {
        let mut names = Vec::with_capacity(protos.len());
        for proto in protos {
            let name = self.resolver.name(proto.name)?;
            self.type_parameters.insert(proto.id, name);
            names.push(name);
        }
        let context = &*self;
        protos
            .iter()
            .zip(names)
            .enumerate()
            .map(|(index, (proto, name))| -> Result<_, DeserializationError> {
                Ok(TypeParameterDescriptor {
                    id: proto.id,
                    name,
                    index,
                    reified: proto.reified,
                    variance: match proto.variance {
                        ProtoVariance::In => Variance::In,
                        ProtoVariance::Out => Variance::Out,
                        ProtoVariance::Inv => Variance::Invariant,
                    },
                    upper_bounds: protos_to_types(context, &proto.upper_bounds)?,
                })
            })
            .collect()
    }

    /// Name resolver of the entry being read
    #[must_use]
    pub fn resolver(&self) -> &'ctx dyn NameResolver {
        self.resolver
    }

    /// Name of the type parameter `id`, searching enclosing contexts
    #[must_use]
    pub fn type_parameter(&self, id: u32) -> Option<Name> {
        self.type_parameters
            .get(&id)
            .copied()
            .or_else(|| self.parent.and_then(|parent| parent.type_parameter(id)))
    }

    /// Converts one serialized type
    ///
    /// Unknown type parameters become error types.
    ///
    /// # Errors
    ///
    /// Fails on unknown or non-class name indices.
    pub fn ty(&self, proto: &ProtoType) -> Result<Ty, DeserializationError> {
        let constructor = match proto.constructor.kind {
            ProtoConstructorKind::Class => {
                TyConstructor::Class(self.resolver.class_id(proto.constructor.id)?)
            }
            ProtoConstructorKind::TypeParameter => match self.type_parameter(proto.constructor.id) {
                Some(name) => TyConstructor::TypeParameter {
                    id: proto.constructor.id,
                    name,
                },
                None => TyConstructor::Error(format!(
                    "Unknown type parameter {}",
                    proto.constructor.id
                )),
            },
        };
        let arguments = proto
            .arguments
            .iter()
            .map(|argument| -> Result<_, DeserializationError> {
                let variance = match argument.projection {
                    ProtoProjection::Star => return Ok(TypeProjection::Star),
                    ProtoProjection::In => Variance::In,
                    ProtoProjection::Out => Variance::Out,
                    ProtoProjection::Inv => Variance::Invariant,
                };
                let ty = match &argument.ty {
                    Some(ty) => self.ty(ty)?,
                    None => Ty::error("Missing type argument"),
                };
                Ok(TypeProjection::Type { variance, ty })
            })
            .collect::<Result<_, _>>()?;
        Ok(Ty {
            constructor,
            arguments,
            nullable: proto.nullable,
        })
    }
}

fn protos_to_types(
    context: &TypeDeserializer<'_>,
    protos: &[ProtoType],
) -> Result<Vec<Ty>, DeserializationError> {
    protos.iter().map(|proto| context.ty(proto)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_intern::Interner;
    use cv_proto::{NameTableBuilder, ProtoTypeArgument, ProtoTypeConstructor, TableNameResolver};
    use std::sync::Arc;

    fn parameter_ref(id: u32) -> ProtoType {
        ProtoType {
            constructor: ProtoTypeConstructor {
                kind: ProtoConstructorKind::TypeParameter,
                id,
            },
            ..ProtoType::default()
        }
    }

    #[test]
    fn test_bounds_see_their_own_list_and_callables_shadow() {
        let mut names = NameTableBuilder::new();
        let comparable = names.class("jet/Comparable");
        let self_bound = ProtoTypeParameter {
            id: 0,
            name: names.name("T"),
            upper_bounds: vec![ProtoType {
                constructor: ProtoTypeConstructor {
                    kind: ProtoConstructorKind::Class,
                    id: comparable,
                },
                arguments: vec![ProtoTypeArgument {
                    projection: ProtoProjection::Inv,
                    ty: Some(parameter_ref(0)),
                }],
                nullable: false,
            }],
            ..ProtoTypeParameter::default()
        };
        let own = ProtoTypeParameter {
            id: 1,
            name: names.name("R"),
            ..ProtoTypeParameter::default()
        };
        let interner = Interner::new();
        let resolver = TableNameResolver::new(Arc::new(names.build()), interner.clone());

        let class_parameters =
            TypeDeserializer::class_type_parameters(&resolver, &[self_bound]).unwrap();
        assert_eq!(
            class_parameters[0].upper_bounds[0].render(&interner),
            "jet/Comparable<T>"
        );

        let class_context = TypeDeserializer::new(&resolver, &class_parameters);
        let (callable_context, own_parameters) = class_context.child(&[own]).unwrap();
        assert_eq!(own_parameters[0].index, 0);
        assert_eq!(callable_context.ty(&parameter_ref(0)).unwrap().render(&interner), "T");
        assert_eq!(callable_context.ty(&parameter_ref(1)).unwrap().render(&interner), "R");
        assert_eq!(
            class_context.ty(&parameter_ref(1)).unwrap(),
            Ty::error("Unknown type parameter 1")
        );
    }

    #[test]
    fn test_unknown_class_index_is_a_format_error() {
        let resolver = TableNameResolver::new(Arc::default(), Interner::new());
        let context = TypeDeserializer::new(&resolver, &[]);
        assert!(matches!(
            context.ty(&ProtoType::default()),
            Err(DeserializationError::Proto(_))
        ));
    }
}
