//! Locating classes and packages by identity

use crate::class::{ClassDescriptor, ClassDescriptorId};
use crate::error::DeserializationError;
use crate::labels;
use crate::package::{PackageDescriptor, PackageDescriptorId};
use crate::session::ModuleSession;
use cv_ids::{ClassId, FqName, Name, is_class_object_name};
use cv_intern::Interner;
use cv_proto::{ClassData, NameResolver, PackageData, ProtoError, TableNameResolver};
use cv_storage::{MemoizedFunction, StorageManager};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use std::iter;
use std::sync::Arc;

/// Finds class and package descriptors by identity
///
/// Implementations must return the same handle for the same identity on
/// every call, and may be re-entered while a lookup is in progress.
pub trait DescriptorFinder: Send + Sync {
    /// Looks up a class without the class-object convention
    ///
    /// # Errors
    ///
    /// Fails if the class entry is malformed.
    fn find_class_impl(
        &self,
        session: &ModuleSession,
        class_id: &ClassId,
    ) -> Result<Option<ClassDescriptorId>, DeserializationError>;

    /// Looks up a package
    ///
    /// # Errors
    ///
    /// Fails if the package entry is malformed.
    fn find_package(
        &self,
        session: &ModuleSession,
        fq_name: &FqName,
    ) -> Result<Option<PackageDescriptorId>, DeserializationError>;

    /// Short names of the top-level classes of `package`, in declaration order
    fn class_names(&self, session: &ModuleSession, package: &FqName) -> Vec<Name>;

    /// Looks up a class
    ///
    /// A miss whose short name is a class-object name falls back to the
    /// class object of the outer class.
    ///
    /// # Errors
    ///
    /// Fails if the class entry or its outer class is malformed.
    fn find_class(
        &self,
        session: &ModuleSession,
        class_id: &ClassId,
    ) -> Result<Option<ClassDescriptorId>, DeserializationError> {
        if let Some(found) = self.find_class_impl(session, class_id)? {
            return Ok(Some(found));
        }
        if !is_class_object_name(class_id.short_name(), session.interner()) {
            return Ok(None);
        }
        let Some(outer_id) = class_id.outer_class_id() else {
            return Ok(None);
        };
        match self.find_class_impl(session, &outer_id)? {
            Some(outer) => session.class(outer).class_object(session),
            None => Ok(None),
        }
    }
}

/// In-memory store of encoded class and package entries
#[derive(Debug, Clone, Default)]
pub struct ClassDataIndex {
    classes: FxHashMap<ClassId, Arc<[u8]>>,
    packages: FxHashMap<FqName, Option<Arc<[u8]>>>,
    class_names: FxHashMap<FqName, IndexSet<Name>>,
}

impl ClassDataIndex {
    /// Creates an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the encoded [`ClassData`] of `class_id`
    ///
    /// The class's package and all of its parent packages become known, and
    /// top-level classes are listed among their package's class names.
    pub fn add_class(&mut self, class_id: ClassId, bytes: Vec<u8>) {
        self.register_package(class_id.package_fq_name());
        if class_id.is_top_level() {
            self.add_class_name(class_id.package_fq_name().clone(), class_id.short_name());
        }
        self.classes.insert(class_id, Arc::from(bytes));
    }

    /// Encodes `data` and registers it under the class id its name table names
    ///
    /// # Errors
    ///
    /// Fails if the class name cannot be resolved or the entry cannot be encoded.
    pub fn add_class_data(&mut self, data: &ClassData, interner: &Interner) -> Result<ClassId, ProtoError> {
        let resolver = TableNameResolver::new(Arc::new(data.names.clone()), interner.clone());
        let class_id = resolver.class_id(data.class.fq_name)?;
        self.add_class(class_id.clone(), data.encode()?);
        Ok(class_id)
    }

    /// Registers the encoded [`PackageData`] of `fq_name`
    pub fn add_package(&mut self, fq_name: FqName, bytes: Vec<u8>) {
        self.register_package(&fq_name);
        self.packages.insert(fq_name, Some(Arc::from(bytes)));
    }

    /// Encodes `data` and registers it as the members of `fq_name`
    ///
    /// # Errors
    ///
    /// Fails if the entry cannot be encoded.
    pub fn add_package_data(&mut self, fq_name: FqName, data: &PackageData) -> Result<(), ProtoError> {
        self.add_package(fq_name, data.encode()?);
        Ok(())
    }

    /// Lists `name` among the classes of `package` without registering any data for it
    pub fn add_class_name(&mut self, package: FqName, name: Name) {
        self.register_package(&package);
        self.class_names.entry(package).or_default().insert(name);
    }

    fn register_package(&mut self, fq_name: &FqName) {
        for package in iter::once(fq_name.clone()).chain(fq_name.ancestors()) {
            self.packages.entry(package).or_insert(None);
        }
    }

    /// Encoded class entry of `class_id`
    #[must_use]
    pub fn class_bytes(&self, class_id: &ClassId) -> Option<&[u8]> {
        self.classes.get(class_id).map(AsRef::as_ref)
    }

    /// Whether `fq_name` is a known package; `Some(None)` if it has no members entry
    #[must_use]
    pub fn package_bytes(&self, fq_name: &FqName) -> Option<Option<&[u8]>> {
        self.packages
            .get(fq_name)
            .map(|bytes| bytes.as_ref().map(AsRef::as_ref))
    }

    /// Class names listed for `package`, in registration order
    #[must_use]
    pub fn class_names(&self, package: &FqName) -> Vec<Name> {
        self.class_names
            .get(package)
            .map(|names| names.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// [`DescriptorFinder`] over a [`ClassDataIndex`]
///
/// Entries are decoded on first lookup; hits and misses are both cached, so
/// a given identity maps to one handle for the lifetime of the session. One
/// finder serves exactly one [`ModuleSession`].
pub struct ClassDataFinder {
    index: ClassDataIndex,
    classes: MemoizedFunction<ClassId, Result<Option<ClassDescriptorId>, DeserializationError>>,
    packages: MemoizedFunction<FqName, Result<Option<PackageDescriptorId>, DeserializationError>>,
}

impl ClassDataFinder {
    /// Creates a finder whose caches report to `storage`
    #[must_use]
    pub fn new(index: ClassDataIndex, storage: &StorageManager) -> Self {
        Self {
            index,
            classes: storage.memoized_function(labels::FIND_CLASS),
            packages: storage.memoized_function(labels::FIND_PACKAGE),
        }
    }

    /// The underlying index
    #[must_use]
    pub fn index(&self) -> &ClassDataIndex {
        &self.index
    }

    fn load_class(
        &self,
        session: &ModuleSession,
        class_id: &ClassId,
    ) -> Result<Option<ClassDescriptorId>, DeserializationError> {
        let Some(bytes) = self.index.class_bytes(class_id) else {
            tracing::trace!(class = %class_id.render(session.interner()), "no class data");
            return Ok(None);
        };
        let data = ClassData::decode(bytes)?;
        let resolver: Arc<dyn NameResolver> = Arc::new(TableNameResolver::new(
            Arc::new(data.names),
            session.interner().clone(),
        ));
        session
            .alloc_class(|id| {
                ClassDescriptor::deserialized(session, id, class_id.clone(), data.class, resolver, None)
            })
            .map(Some)
    }

    fn load_package(
        &self,
        session: &ModuleSession,
        fq_name: &FqName,
    ) -> Result<Option<PackageDescriptorId>, DeserializationError> {
        let Some(bytes) = self.index.package_bytes(fq_name) else {
            tracing::trace!(package = %fq_name.render(session.interner()), "unknown package");
            return Ok(None);
        };
        let members = match bytes {
            Some(bytes) => {
                let data = PackageData::decode(bytes)?;
                let resolver: Arc<dyn NameResolver> = Arc::new(TableNameResolver::new(
                    Arc::new(data.names),
                    session.interner().clone(),
                ));
                Some((data.package.members, resolver))
            }
            None => None,
        };
        session
            .alloc_package(|id| Ok(PackageDescriptor::new(session, id, fq_name.clone(), members)))
            .map(Some)
    }
}

impl DescriptorFinder for ClassDataFinder {
    fn find_class_impl(
        &self,
        session: &ModuleSession,
        class_id: &ClassId,
    ) -> Result<Option<ClassDescriptorId>, DeserializationError> {
        self.classes
            .get_or_compute(class_id, |key| self.load_class(session, key))?
    }

    fn find_package(
        &self,
        session: &ModuleSession,
        fq_name: &FqName,
    ) -> Result<Option<PackageDescriptorId>, DeserializationError> {
        self.packages
            .get_or_compute(fq_name, |key| self.load_package(session, key))?
    }

    fn class_names(&self, _session: &ModuleSession, package: &FqName) -> Vec<Name> {
        self.index.class_names(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use cv_proto::{NameTableBuilder, ProtoClass};

    fn class_data(class_id: &str) -> ClassData {
        let mut names = NameTableBuilder::new();
        let fq_name = names.class(class_id);
        ClassData {
            names: names.build(),
            class: ProtoClass {
                fq_name,
                ..ProtoClass::default()
            },
        }
    }

    #[test]
    fn test_index_registers_parent_packages() {
        let interner = Interner::new();
        let mut index = ClassDataIndex::new();
        let class_id = index.add_class_data(&class_data("a.b/Foo"), &interner).unwrap();
        assert_eq!(Some(class_id), ClassId::parse("a.b/Foo", &interner));

        for package in ["a.b", "a", ""] {
            assert_eq!(
                index.package_bytes(&FqName::parse(package, &interner)),
                Some(None)
            );
        }
        assert_eq!(
            index.class_names(&FqName::parse("a.b", &interner)),
            [interner.intern("Foo")]
        );
        assert!(index.class_names(&FqName::parse("a", &interner)).is_empty());
    }

    #[test]
    fn test_lookups_are_cached() {
        let interner = Interner::new();
        let mut index = ClassDataIndex::new();
        let foo = index.add_class_data(&class_data("a/Foo"), &interner).unwrap();
        let session = ModuleSession::from_index(interner.clone(), SessionConfig::default(), index);

        let first = session.find_class(&foo).unwrap();
        assert!(first.is_some());
        assert_eq!(session.find_class(&foo).unwrap(), first);
        assert_eq!(session.class_count(), 1);

        let missing = ClassId::parse("a/Missing", &interner).unwrap();
        assert_eq!(session.find_class(&missing).unwrap(), None);
        assert_eq!(session.find_class(&missing).unwrap(), None);
        assert_eq!(session.storage().computations(labels::FIND_CLASS), 2);

        let package = session.find_package(foo.package_fq_name()).unwrap();
        assert_eq!(session.find_package(foo.package_fq_name()).unwrap(), package);
        assert!(package.is_some());
    }
}
