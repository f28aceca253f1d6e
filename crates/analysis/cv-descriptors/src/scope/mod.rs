//! Member scopes
//!
//! A [`MemberScope`] is a handle; the caches behind it live in the class or
//! package descriptor it names, so copies of a scope share results.

pub(crate) mod class;
pub(crate) mod declared;
pub(crate) mod overrides;
pub(crate) mod package;

use crate::class::{ClassDescriptorId, ClassOrigin};
use crate::descriptors::{Callables, DeclarationDescriptor, ReceiverParameter};
use crate::error::DeserializationError;
use crate::package::PackageDescriptorId;
use crate::scope::package::PackageScopeCache;
use crate::session::ModuleSession;
use cv_ids::Name;
use std::sync::Arc;

/// Members visible inside a class or package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberScope {
    /// Members of a deserialized class, including inherited ones
    Class(ClassDescriptorId),
    /// Members of a package
    Package(PackageDescriptorId),
    /// Members of a class the compiler synthesized
    Synthesized(ClassDescriptorId),
}

impl MemberScope {
    /// Functions named `name`
    ///
    /// # Errors
    ///
    /// Fails if a member or supertype entry is malformed, or on a cyclic hierarchy.
    pub fn functions(&self, session: &ModuleSession, name: Name) -> Result<Callables, DeserializationError> {
        match *self {
            Self::Class(id) | Self::Synthesized(id) => {
                let owner = session.class(id);
                match owner.origin() {
                    ClassOrigin::Deserialized(class) => {
                        class.scope().functions(session, &owner, class, name)
                    }
                    ClassOrigin::EnumClassObject(object) => Ok(object.functions_named(name)),
                }
            }
            Self::Package(id) => {
                let package = session.package(id);
                package.scope().functions(session, &package, name)
            }
        }
    }

    /// Properties named `name`
    ///
    /// # Errors
    ///
    /// Fails if a member or supertype entry is malformed, or on a cyclic hierarchy.
    pub fn properties(&self, session: &ModuleSession, name: Name) -> Result<Callables, DeserializationError> {
        match *self {
            Self::Class(id) | Self::Synthesized(id) => {
                let owner = session.class(id);
                match owner.origin() {
                    ClassOrigin::Deserialized(class) => {
                        class.scope().properties(session, &owner, class, name)
                    }
                    ClassOrigin::EnumClassObject(_) => Ok(Arc::from(Vec::new())),
                }
            }
            Self::Package(id) => {
                let package = session.package(id);
                package.scope().properties(session, &package, name)
            }
        }
    }

    /// Class named `name` in this scope
    ///
    /// Classes see their nested classes and enum entries, packages their
    /// top-level classes.
    ///
    /// # Errors
    ///
    /// Fails if the class entry is malformed.
    pub fn classifier(
        &self,
        session: &ModuleSession,
        name: Name,
    ) -> Result<Option<DeclarationDescriptor>, DeserializationError> {
        match *self {
            Self::Class(id) | Self::Synthesized(id) => Ok(session
                .class(id)
                .nested_class(session, name)?
                .map(DeclarationDescriptor::Class)),
            Self::Package(id) => PackageScopeCache::classifier(session, &session.package(id), name),
        }
    }

    /// Subpackage named `name`; classes have none
    ///
    /// # Errors
    ///
    /// Fails if the package entry is malformed.
    pub fn package(
        &self,
        session: &ModuleSession,
        name: Name,
    ) -> Result<Option<DeclarationDescriptor>, DeserializationError> {
        match *self {
            Self::Class(_) | Self::Synthesized(_) => Ok(None),
            Self::Package(id) => PackageScopeCache::package(session, &session.package(id), name),
        }
    }

    /// Every member of the scope
    ///
    /// For classes: declared members by name, nested classes, then members
    /// only inherited. For packages: declared members by name, then the
    /// classes listed for the package that can be found.
    ///
    /// # Errors
    ///
    /// Fails if any enumerated entry is malformed, or on a cyclic hierarchy.
    pub fn all_descriptors(
        &self,
        session: &ModuleSession,
    ) -> Result<Arc<[DeclarationDescriptor]>, DeserializationError> {
        match *self {
            Self::Class(id) | Self::Synthesized(id) => {
                let owner = session.class(id);
                match owner.origin() {
                    ClassOrigin::Deserialized(class) => {
                        class.scope().all_descriptors(session, &owner, class)
                    }
                    ClassOrigin::EnumClassObject(object) => Ok(object
                        .functions()
                        .into_iter()
                        .map(|function| DeclarationDescriptor::Callable(Arc::clone(function)))
                        .collect()),
                }
            }
            Self::Package(id) => {
                let package = session.package(id);
                package.scope().all_descriptors(session, &package)
            }
        }
    }

    /// Receiver available without qualification inside the scope
    #[must_use]
    pub fn implicit_receiver(&self, session: &ModuleSession) -> Option<ReceiverParameter> {
        match *self {
            Self::Class(id) | Self::Synthesized(id) => Some(session.class(id).this_receiver()),
            Self::Package(_) => None,
        }
    }
}
