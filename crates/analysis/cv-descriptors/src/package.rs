//! Package descriptors

use crate::scope::MemberScope;
use crate::scope::package::PackageScopeCache;
use crate::session::ModuleSession;
use cv_ids::FqName;
use cv_proto::{NameResolver, ProtoCallable};
use la_arena::Idx;
use std::fmt;
use std::sync::Arc;

/// Handle of a package descriptor in its session's arena
pub type PackageDescriptorId = Idx<Arc<PackageDescriptor>>;

/// A package and the top-level members recorded for it
pub struct PackageDescriptor {
    id: PackageDescriptorId,
    fq_name: FqName,
    scope: PackageScopeCache,
}

impl PackageDescriptor {
    /// A package whose top-level functions and properties are `members`
    ///
    /// Packages known only because they contain classes have no members.
    pub(crate) fn new(
        session: &ModuleSession,
        id: PackageDescriptorId,
        fq_name: FqName,
        members: Option<(Vec<ProtoCallable>, Arc<dyn NameResolver>)>,
    ) -> Self {
        Self {
            id,
            fq_name,
            scope: PackageScopeCache::new(members, session.storage()),
        }
    }

    /// Handle of this descriptor
    #[must_use]
    pub fn id(&self) -> PackageDescriptorId {
        self.id
    }

    /// Fully qualified name
    #[must_use]
    pub fn fq_name(&self) -> &FqName {
        &self.fq_name
    }

    /// Member scope of the package
    #[must_use]
    pub fn member_scope(&self) -> MemberScope {
        MemberScope::Package(self.id)
    }

    pub(crate) fn scope(&self) -> &PackageScopeCache {
        &self.scope
    }
}

impl fmt::Debug for PackageDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PackageDescriptor")
            .field("id", &self.id)
            .field("fq_name", &self.fq_name)
            .finish_non_exhaustive()
    }
}
