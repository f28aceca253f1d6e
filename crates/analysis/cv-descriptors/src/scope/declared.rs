//! Members declared directly in a serialized class or package

use crate::descriptors::{CallableDescriptor, DeclarationRef};
use crate::error::DeserializationError;
use crate::labels;
use crate::member_deserializer::MemberDeserializer;
use crate::session::ModuleSession;
use crate::type_deserializer::TypeDeserializer;
use crate::types::TypeParameterDescriptor;
use cv_ids::Name;
use cv_proto::{CallableFlags, NameResolver, ProtoCallable, ProtoCallableKind};
use cv_storage::{LazyValue, StorageManager};
use indexmap::IndexMap;
use std::sync::Arc;

/// Which half of a member scope is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemberCategory {
    Function,
    Property,
}

/// Member entries of one container, indexed by name on first use
pub(crate) struct DeclaredMembers {
    members: Vec<ProtoCallable>,
    resolver: Arc<dyn NameResolver>,
    names: LazyValue<Result<Arc<IndexMap<Name, Vec<usize>>>, DeserializationError>>,
}

impl DeclaredMembers {
    pub(crate) fn new(
        members: Vec<ProtoCallable>,
        resolver: Arc<dyn NameResolver>,
        storage: &StorageManager,
    ) -> Self {
        Self {
            members,
            resolver,
            names: storage.lazy_value(labels::DECLARED_NAMES),
        }
    }

    /// Member positions by name, names in declaration order
    pub(crate) fn names(&self) -> Result<Arc<IndexMap<Name, Vec<usize>>>, DeserializationError> {
        self.names.get_or_compute(|| -> Result<_, DeserializationError> {
            let mut names: IndexMap<Name, Vec<usize>> = IndexMap::new();
            for (position, member) in self.members.iter().enumerate() {
                names
                    .entry(self.resolver.name(member.name)?)
                    .or_default()
                    .push(position);
            }
            Ok(Arc::new(names))
        })?
    }

    /// Deserializes the declared members named `name` of one category
    ///
    /// A constructor among the members is a format error.
    pub(crate) fn deserialize(
        &self,
        session: &ModuleSession,
        type_parameters: &[TypeParameterDescriptor],
        container: DeclarationRef,
        name: Name,
        category: MemberCategory,
    ) -> Result<Vec<CallableDescriptor>, DeserializationError> {
        let names = self.names()?;
        let Some(positions) = names.get(&name) else {
            return Ok(Vec::new());
        };
        let context = TypeDeserializer::new(&*self.resolver, type_parameters);
        let deserializer = MemberDeserializer::new(session, &context, container);
        let mut members = Vec::new();
        for &position in positions {
            let Some(proto) = self.members.get(position) else {
                continue;
            };
            let kind = CallableFlags::decode(proto.flags)?.callable_kind;
            let wanted = match kind {
                ProtoCallableKind::Fun => category == MemberCategory::Function,
                ProtoCallableKind::Val | ProtoCallableKind::Var => category == MemberCategory::Property,
                ProtoCallableKind::Constructor => {
                    return Err(DeserializationError::UnexpectedCallableKind {
                        expected: "a function or property",
                        found: kind,
                    });
                }
            };
            if wanted {
                members.push(deserializer.callable(proto)?);
            }
        }
        Ok(members)
    }
}
