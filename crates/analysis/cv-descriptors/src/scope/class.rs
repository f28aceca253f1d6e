//! Member scope of a deserialized class

use crate::class::{ClassDescriptor, DeserializedClass};
use crate::descriptors::{CallableDescriptor, Callables, DeclarationDescriptor, DeclarationRef};
use crate::error::DeserializationError;
use crate::labels;
use crate::scope::declared::MemberCategory;
use crate::scope::overrides::{OverrideSink, resolve_overrides};
use crate::session::ModuleSession;
use crate::types::TypeSubstitution;
use cv_ids::Name;
use cv_storage::{LazyValue, MemoizedFunction, StorageManager};
use rustc_hash::FxHashSet;
use std::sync::Arc;

type Members = Result<Callables, DeserializationError>;

/// Per-class caches of the member scope
pub(crate) struct ClassScopeCache {
    functions: MemoizedFunction<Name, Members>,
    properties: MemoizedFunction<Name, Members>,
    all_descriptors: LazyValue<Result<Arc<[DeclarationDescriptor]>, DeserializationError>>,
}

impl ClassScopeCache {
    pub(crate) fn new(storage: &StorageManager) -> Self {
        Self {
            functions: storage.memoized_function(labels::FUNCTIONS),
            properties: storage.memoized_function(labels::PROPERTIES),
            all_descriptors: storage.lazy_value(labels::ALL_DESCRIPTORS),
        }
    }

    pub(crate) fn functions(
        &self,
        session: &ModuleSession,
        owner: &ClassDescriptor,
        class: &DeserializedClass,
        name: Name,
    ) -> Members {
        self.functions.get_or_compute(&name, |key| {
            members(session, owner, class, *key, MemberCategory::Function)
        })?
    }

    pub(crate) fn properties(
        &self,
        session: &ModuleSession,
        owner: &ClassDescriptor,
        class: &DeserializedClass,
        name: Name,
    ) -> Members {
        self.properties.get_or_compute(&name, |key| {
            members(session, owner, class, *key, MemberCategory::Property)
        })?
    }

    /// Declared members, nested classes, then members only inherited
    pub(crate) fn all_descriptors(
        &self,
        session: &ModuleSession,
        owner: &ClassDescriptor,
        class: &DeserializedClass,
    ) -> Result<Arc<[DeclarationDescriptor]>, DeserializationError> {
        self.all_descriptors
            .get_or_compute(|| -> Result<_, DeserializationError> {
                let mut descriptors = Vec::new();
                let mut seen = FxHashSet::default();
                for &name in class.declared().names()?.keys() {
                    seen.insert(name);
                    self.push_callables(session, owner, class, name, &mut descriptors)?;
                }
                descriptors.extend(
                    owner
                        .nested_classes(session)?
                        .into_iter()
                        .map(DeclarationDescriptor::Class),
                );
                for supertype in owner.supertypes(session)?.iter() {
                    let Some(super_id) = supertype.class_id() else {
                        continue;
                    };
                    let Some(super_handle) = session.find_class(super_id)? else {
                        continue;
                    };
                    let inherited = session.class(super_handle).member_scope().all_descriptors(session)?;
                    for descriptor in inherited.iter() {
                        if let DeclarationDescriptor::Callable(member) = descriptor
                            && seen.insert(member.name)
                        {
                            self.push_callables(session, owner, class, member.name, &mut descriptors)?;
                        }
                    }
                }
                Ok(Arc::from(descriptors))
            })?
    }

    fn push_callables(
        &self,
        session: &ModuleSession,
        owner: &ClassDescriptor,
        class: &DeserializedClass,
        name: Name,
        descriptors: &mut Vec<DeclarationDescriptor>,
    ) -> Result<(), DeserializationError> {
        let functions = self.functions(session, owner, class, name)?;
        let properties = self.properties(session, owner, class, name)?;
        descriptors.extend(
            functions
                .iter()
                .chain(properties.iter())
                .map(|member| DeclarationDescriptor::Callable(Arc::clone(member))),
        );
        Ok(())
    }
}

/// Declared members named `name` merged with what the supertypes provide under that name
fn members(
    session: &ModuleSession,
    owner: &ClassDescriptor,
    class: &DeserializedClass,
    name: Name,
    category: MemberCategory,
) -> Members {
    let container = DeclarationRef::Class(owner.id());
    let declared = class
        .declared()
        .deserialize(session, owner.type_parameters(), container, name, category)?;
    let mut inherited: Vec<Arc<CallableDescriptor>> = Vec::new();
    for supertype in owner.supertypes(session)?.iter() {
        let Some(super_id) = supertype.class_id() else {
            continue;
        };
        let Some(super_handle) = session.find_class(super_id)? else {
            tracing::trace!(
                class = %owner.class_id().render(session.interner()),
                supertype = %super_id.render(session.interner()),
                "supertype not found"
            );
            continue;
        };
        let super_class = session.class(super_handle);
        let scope = super_class.member_scope();
        let super_members = match category {
            MemberCategory::Function => scope.functions(session, name)?,
            MemberCategory::Property => scope.properties(session, name)?,
        };
        let substitution = TypeSubstitution::new(super_class.type_parameters(), &supertype.arguments);
        inherited.extend(
            super_members
                .iter()
                .map(|member| CallableDescriptor::substitute(member, &substitution)),
        );
    }
    let sink = OverrideSink::new(session, owner);
    Ok(resolve_overrides(declared, inherited, container, &sink).into())
}
