//! Member scope of a package

use crate::descriptors::{Callables, DeclarationDescriptor, DeclarationRef};
use crate::error::DeserializationError;
use crate::labels;
use crate::package::PackageDescriptor;
use crate::scope::declared::{DeclaredMembers, MemberCategory};
use crate::session::ModuleSession;
use cv_ids::{ClassId, Name};
use cv_proto::{NameResolver, ProtoCallable};
use cv_storage::{LazyValue, MemoizedFunction, StorageManager};
use std::sync::Arc;

type Members = Result<Callables, DeserializationError>;

/// Per-package caches of the member scope
pub(crate) struct PackageScopeCache {
    declared: Option<DeclaredMembers>,
    functions: MemoizedFunction<Name, Members>,
    properties: MemoizedFunction<Name, Members>,
    all_descriptors: LazyValue<Result<Arc<[DeclarationDescriptor]>, DeserializationError>>,
}

impl PackageScopeCache {
    pub(crate) fn new(
        members: Option<(Vec<ProtoCallable>, Arc<dyn NameResolver>)>,
        storage: &StorageManager,
    ) -> Self {
        Self {
            declared: members.map(|(callables, resolver)| DeclaredMembers::new(callables, resolver, storage)),
            functions: storage.memoized_function(labels::FUNCTIONS),
            properties: storage.memoized_function(labels::PROPERTIES),
            all_descriptors: storage.lazy_value(labels::ALL_DESCRIPTORS),
        }
    }

    pub(crate) fn functions(&self, session: &ModuleSession, package: &PackageDescriptor, name: Name) -> Members {
        self.functions.get_or_compute(&name, |key| {
            self.members(session, package, *key, MemberCategory::Function)
        })?
    }

    pub(crate) fn properties(&self, session: &ModuleSession, package: &PackageDescriptor, name: Name) -> Members {
        self.properties.get_or_compute(&name, |key| {
            self.members(session, package, *key, MemberCategory::Property)
        })?
    }

    pub(crate) fn classifier(
        session: &ModuleSession,
        package: &PackageDescriptor,
        name: Name,
    ) -> Result<Option<DeclarationDescriptor>, DeserializationError> {
        let class_id = ClassId::top_level(package.fq_name().clone(), name);
        Ok(session.find_class(&class_id)?.map(DeclarationDescriptor::Class))
    }

    pub(crate) fn package(
        session: &ModuleSession,
        package: &PackageDescriptor,
        name: Name,
    ) -> Result<Option<DeclarationDescriptor>, DeserializationError> {
        Ok(session
            .find_package(&package.fq_name().child(name))?
            .map(DeclarationDescriptor::Package))
    }

    /// Declared members by name, then the classes the finder lists that resolve
    pub(crate) fn all_descriptors(
        &self,
        session: &ModuleSession,
        package: &PackageDescriptor,
    ) -> Result<Arc<[DeclarationDescriptor]>, DeserializationError> {
        self.all_descriptors
            .get_or_compute(|| -> Result<_, DeserializationError> {
                let mut descriptors = Vec::new();
                if let Some(declared) = &self.declared {
                    for &name in declared.names()?.keys() {
                        let functions = self.functions(session, package, name)?;
                        let properties = self.properties(session, package, name)?;
                        descriptors.extend(
                            functions
                                .iter()
                                .chain(properties.iter())
                                .map(|member| DeclarationDescriptor::Callable(Arc::clone(member))),
                        );
                    }
                }
                for name in session.finder().class_names(session, package.fq_name()) {
                    match Self::classifier(session, package, name)? {
                        Some(class) => descriptors.push(class),
                        None => tracing::trace!(
                            package = %package.fq_name().render(session.interner()),
                            class = %session.interner().resolve(&name),
                            "listed class not found"
                        ),
                    }
                }
                Ok(Arc::from(descriptors))
            })?
    }

    fn members(
        &self,
        session: &ModuleSession,
        package: &PackageDescriptor,
        name: Name,
        category: MemberCategory,
    ) -> Members {
        let Some(declared) = &self.declared else {
            return Ok(Arc::from(Vec::new()));
        };
        let members = declared.deserialize(
            session,
            &[],
            DeclarationRef::Package(package.id()),
            name,
            category,
        )?;
        Ok(members.into_iter().map(Arc::new).collect())
    }
}
