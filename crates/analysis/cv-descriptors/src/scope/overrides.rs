//! Binding declared members to inherited ones and creating fake overrides

use crate::class::ClassDescriptor;
use crate::descriptors::{CallableDescriptor, DeclarationRef, MemberKind, Visibility};
use crate::session::ModuleSession;
use crate::types::{Ty, TyConstructor, TypeProjection, Variance};
use cv_ids::ClassId;
use cv_intern::Interner;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::sync::Arc;

/// Receives override problems that do not stop resolution
pub(crate) struct OverrideSink<'sink> {
    interner: &'sink Interner,
    class: String,
    report_conflicts: bool,
}

impl<'sink> OverrideSink<'sink> {
    pub(crate) fn new(session: &'sink ModuleSession, owner: &ClassDescriptor) -> Self {
        Self {
            interner: session.interner(),
            class: owner.class_id().render(session.interner()),
            report_conflicts: session.config().report_override_conflicts,
        }
    }

    fn conflict(&self, declared: &CallableDescriptor, inherited: &CallableDescriptor) {
        if self.report_conflicts {
            tracing::debug!(
                class = %self.class,
                declared = %declared.render(self.interner),
                inherited = %inherited.render(self.interner),
                "conflicting override dropped"
            );
        }
    }

    fn cannot_infer_visibility(&self, member: &CallableDescriptor) {
        tracing::debug!(
            class = %self.class,
            member = %member.render(self.interner),
            "cannot infer visibility of fake override"
        );
    }
}

/// A type normalized for signature comparison
///
/// Own type parameters are compared by position, so `fun <T> f(t: T)` in a
/// subclass matches `fun <R> f(t: R)` in its supertype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SignatureType {
    Class {
        class_id: ClassId,
        arguments: Vec<SignatureArgument>,
        nullable: bool,
    },
    OwnParameter {
        index: usize,
        nullable: bool,
    },
    OuterParameter {
        id: u32,
        nullable: bool,
    },
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SignatureArgument {
    Star,
    Type(Variance, SignatureType),
}

impl SignatureType {
    fn of(ty: &Ty, own: &FxHashMap<u32, usize>) -> Self {
        match &ty.constructor {
            TyConstructor::Class(class_id) => Self::Class {
                class_id: class_id.clone(),
                arguments: ty
                    .arguments
                    .iter()
                    .map(|argument| match argument {
                        TypeProjection::Star => SignatureArgument::Star,
                        TypeProjection::Type { variance, ty: argument_ty } => {
                            SignatureArgument::Type(*variance, Self::of(argument_ty, own))
                        }
                    })
                    .collect(),
                nullable: ty.nullable,
            },
            TyConstructor::TypeParameter { id, .. } => match own.get(id) {
                Some(&index) => Self::OwnParameter {
                    index,
                    nullable: ty.nullable,
                },
                None => Self::OuterParameter {
                    id: *id,
                    nullable: ty.nullable,
                },
            },
            TyConstructor::Error(message) => Self::Error(message.clone()),
        }
    }
}

/// The parts of a member that decide whether it overrides another
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Signature {
    receiver: Option<SignatureType>,
    parameters: Vec<SignatureType>,
    type_parameter_count: usize,
}

enum Overridability {
    Overridable,
    Conflict,
    Incompatible,
}

impl Signature {
    fn of(member: &CallableDescriptor) -> Self {
        let own: FxHashMap<u32, usize> = member
            .type_parameters
            .iter()
            .map(|parameter| (parameter.id, parameter.index))
            .collect();
        Self {
            receiver: member
                .receiver_type
                .as_ref()
                .map(|ty| SignatureType::of(ty, &own)),
            parameters: member
                .value_parameters
                .iter()
                .map(|parameter| SignatureType::of(&parameter.ty, &own))
                .collect(),
            type_parameter_count: member.type_parameters.len(),
        }
    }

    fn compare(&self, other: &Self) -> Overridability {
        if self.receiver != other.receiver || self.parameters != other.parameters {
            Overridability::Incompatible
        } else if self.type_parameter_count == other.type_parameter_count {
            Overridability::Overridable
        } else {
            Overridability::Conflict
        }
    }
}

/// Merges declared members with the same-named members inherited from supertypes
///
/// Declared members that override inherited ones record them in
/// `overridden`. Private inherited members are invisible. Inherited members
/// no declaration overrides are grouped by signature, and each group becomes
/// one fake override placed after the declared members.
pub(crate) fn resolve_overrides(
    mut declared: Vec<CallableDescriptor>,
    inherited: Vec<Arc<CallableDescriptor>>,
    container: DeclarationRef,
    sink: &OverrideSink<'_>,
) -> Vec<Arc<CallableDescriptor>> {
    let signatures: Vec<_> = declared.iter().map(Signature::of).collect();
    let mut unbound: IndexMap<Signature, Vec<Arc<CallableDescriptor>>> = IndexMap::new();
    for member in inherited {
        if member.visibility == Visibility::Private {
            continue;
        }
        let signature = Signature::of(&member);
        let mut bound = false;
        for (position, candidate) in signatures.iter().enumerate() {
            let Some(declaration) = declared.get_mut(position) else {
                continue;
            };
            match candidate.compare(&signature) {
                Overridability::Overridable => {
                    declaration.overridden.push(Arc::clone(&member));
                    bound = true;
                }
                Overridability::Conflict => {
                    sink.conflict(declaration, &member);
                    bound = true;
                }
                Overridability::Incompatible => {}
            }
        }
        if !bound {
            unbound.entry(signature).or_default().push(member);
        }
    }
    let mut members: Vec<_> = declared.into_iter().map(Arc::new).collect();
    members.extend(
        unbound
            .into_values()
            .filter_map(|group| fake_override(group, container, sink))
            .map(Arc::new),
    );
    members
}

fn fake_override(
    group: Vec<Arc<CallableDescriptor>>,
    container: DeclarationRef,
    sink: &OverrideSink<'_>,
) -> Option<CallableDescriptor> {
    let template = group.first()?;
    let modality = group.iter().map(|member| member.modality).min()?;
    let mut fake = CallableDescriptor {
        member_kind: MemberKind::FakeOverride,
        modality,
        visibility: Visibility::Inherited,
        container,
        original: None,
        ..CallableDescriptor::clone(template)
    };
    match max_visibility(&group) {
        Some(visibility) => fake.visibility = visibility,
        None => sink.cannot_infer_visibility(&fake),
    }
    fake.overridden = group;
    Some(fake)
}

/// Greatest visibility of the group, or `None` if two of them are incomparable
fn max_visibility(group: &[Arc<CallableDescriptor>]) -> Option<Visibility> {
    let mut visibilities = group.iter().map(|member| member.visibility);
    let mut max = visibilities.next()?;
    for visibility in visibilities {
        if max.compare(visibility)? == Ordering::Less {
            max = visibility;
        }
    }
    Some(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::{CallableKind, Modality, ValueParameter};
    use crate::types::{TypeParameterDescriptor, TypeSubstitution};

    fn function(interner: &Interner, name: &str, visibility: Visibility, modality: Modality) -> CallableDescriptor {
        CallableDescriptor {
            name: interner.intern(name),
            kind: CallableKind::Function,
            member_kind: MemberKind::Declaration,
            modality,
            visibility,
            container: DeclarationRef::Error,
            type_parameters: Vec::new(),
            receiver_type: None,
            value_parameters: Vec::new(),
            return_type: Ty::class(ClassId::parse("jet/Unit", interner).unwrap(), Vec::new()),
            annotations: Vec::new(),
            overridden: Vec::new(),
            original: None,
        }
    }

    fn generic(interner: &Interner, id: u32) -> CallableDescriptor {
        let parameter = TypeParameterDescriptor {
            id,
            name: interner.intern("T"),
            index: 0,
            reified: false,
            variance: Variance::Invariant,
            upper_bounds: Vec::new(),
        };
        CallableDescriptor {
            value_parameters: vec![ValueParameter {
                name: interner.intern("value"),
                index: 0,
                ty: parameter.default_type(),
                vararg_element_type: None,
                declares_default_value: false,
                annotations: Vec::new(),
            }],
            type_parameters: vec![parameter],
            ..function(interner, "accept", Visibility::Public, Modality::Open)
        }
    }

    fn sink(interner: &Interner) -> OverrideSink<'_> {
        OverrideSink {
            interner,
            class: "test/Sub".to_owned(),
            report_conflicts: true,
        }
    }

    #[test]
    fn test_own_type_parameters_match_by_position() {
        let interner = Interner::new();
        let inherited = Arc::new(generic(&interner, 7));
        let members = resolve_overrides(
            vec![generic(&interner, 0)],
            vec![Arc::clone(&inherited)],
            DeclarationRef::Error,
            &sink(&interner),
        );
        assert_eq!(members.len(), 1);
        assert!(Arc::ptr_eq(&members[0].overridden[0], &inherited));
    }

    #[test]
    fn test_conflict_drops_inherited_member() {
        let interner = Interner::new();
        let mut declared = function(&interner, "accept", Visibility::Public, Modality::Open);
        declared.value_parameters = generic(&interner, 0).value_parameters;
        declared.value_parameters[0].ty = Ty::type_parameter(3, interner.intern("Outer"));
        let mut inherited = generic(&interner, 3);
        inherited.type_parameters.clear();
        inherited.type_parameters.push(generic(&interner, 9).type_parameters[0].clone());

        let members = resolve_overrides(
            vec![declared],
            vec![Arc::new(inherited)],
            DeclarationRef::Error,
            &sink(&interner),
        );
        assert_eq!(members.len(), 1);
        assert!(members[0].overridden.is_empty());
    }

    #[test]
    fn test_substituted_own_parameters_stay_distinct() {
        let interner = Interner::new();
        let outer = Ty::type_parameter(0, interner.intern("T"));
        let replacement = Ty::type_parameter(1, interner.intern("U"));

        // accept<T#1>(value: T#1, extra: T#0) with the class T#0 bound to U#1
        let mut base = generic(&interner, 1);
        let extra = ValueParameter {
            name: interner.intern("extra"),
            index: 1,
            ty: outer,
            ..base.value_parameters[0].clone()
        };
        base.value_parameters.push(extra);
        let class_parameter = TypeParameterDescriptor {
            id: 0,
            ..base.type_parameters[0].clone()
        };
        let substitution =
            TypeSubstitution::new(&[class_parameter], &[TypeProjection::invariant(replacement.clone())]);
        let inherited = CallableDescriptor::substitute(&Arc::new(base), &substitution);
        let own = &inherited.type_parameters[0];
        assert_eq!(own.id, 2);
        assert_eq!(inherited.value_parameters[0].ty, own.default_type());
        assert_eq!(inherited.value_parameters[1].ty, replacement);

        let mut declared = generic(&interner, 5);
        let extra = ValueParameter {
            ty: replacement,
            ..inherited.value_parameters[1].clone()
        };
        declared.value_parameters.push(extra);
        let members = resolve_overrides(
            vec![declared],
            vec![Arc::clone(&inherited)],
            DeclarationRef::Error,
            &sink(&interner),
        );
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].member_kind, MemberKind::Declaration);
        assert!(Arc::ptr_eq(&members[0].overridden[0], &inherited));
    }

    #[test]
    fn test_fake_override_merges_group() {
        let interner = Interner::new();
        let protected = Arc::new(function(&interner, "run", Visibility::Protected, Modality::Abstract));
        let public = Arc::new(function(&interner, "run", Visibility::Public, Modality::Open));
        let private = Arc::new(function(&interner, "run", Visibility::Private, Modality::Final));
        let internal = Arc::new(function(&interner, "run", Visibility::Internal, Modality::Open));
        let sink = sink(&interner);

        let members = resolve_overrides(
            Vec::new(),
            vec![Arc::clone(&protected), Arc::clone(&public), private],
            DeclarationRef::Error,
            &sink,
        );
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].member_kind, MemberKind::FakeOverride);
        assert_eq!(members[0].visibility, Visibility::Public);
        assert_eq!(members[0].modality, Modality::Open);
        assert_eq!(members[0].overridden.len(), 2);

        let members = resolve_overrides(Vec::new(), vec![protected, internal], DeclarationRef::Error, &sink);
        assert_eq!(members[0].visibility, Visibility::Inherited);
        assert_eq!(members[0].modality, Modality::Open);
    }
}
