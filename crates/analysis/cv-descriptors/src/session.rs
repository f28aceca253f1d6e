//! The module session: owner of every descriptor

use crate::annotation::{AnnotationDeserializer, ProtoAnnotationDeserializer};
use crate::class::{ClassDescriptor, ClassDescriptorId};
use crate::config::SessionConfig;
use crate::error::DeserializationError;
use crate::finder::{ClassDataFinder, ClassDataIndex, DescriptorFinder};
use crate::package::{PackageDescriptor, PackageDescriptorId};
use cv_ids::{ClassId, FqName};
use cv_intern::Interner;
use cv_storage::StorageManager;
use la_arena::{Arena, Idx, RawIdx};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared context of one module's descriptor graph
///
/// Descriptors live in the session's arenas and refer to each other by
/// handle or by [`ClassId`]; every accessor that may resolve a reference
/// takes the session. Handles are only meaningful for the session that
/// issued them.
pub struct ModuleSession {
    interner: Interner,
    storage: StorageManager,
    config: SessionConfig,
    finder: Arc<dyn DescriptorFinder>,
    annotations: Arc<dyn AnnotationDeserializer>,
    classes: RwLock<Arena<Arc<ClassDescriptor>>>,
    packages: RwLock<Arena<Arc<PackageDescriptor>>>,
}

impl ModuleSession {
    /// Creates a session resolving through `finder`
    ///
    /// `storage` should be the manager the finder's caches were created
    /// with, so that statistics cover both.
    #[must_use]
    pub fn new(
        interner: Interner,
        storage: StorageManager,
        config: SessionConfig,
        finder: Arc<dyn DescriptorFinder>,
    ) -> Self {
        Self {
            annotations: Arc::new(ProtoAnnotationDeserializer::new(interner.clone())),
            interner,
            storage,
            config,
            finder,
            classes: RwLock::new(Arena::default()),
            packages: RwLock::new(Arena::default()),
        }
    }

    /// Creates a session over an in-memory index with a fresh [`ClassDataFinder`]
    #[must_use]
    pub fn from_index(interner: Interner, config: SessionConfig, index: ClassDataIndex) -> Self {
        let storage = StorageManager::new();
        let finder = ClassDataFinder::new(index, &storage);
        Self::new(interner, storage, config, Arc::new(finder))
    }

    /// Replaces the annotation deserializer
    #[must_use]
    pub fn with_annotation_deserializer(mut self, annotations: Arc<dyn AnnotationDeserializer>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Interner for every name in this session
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Storage manager backing every memoized field
    #[must_use]
    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Finder used to resolve class and package references
    #[must_use]
    pub fn finder(&self) -> &dyn DescriptorFinder {
        &*self.finder
    }

    /// Annotation deserializer
    #[must_use]
    pub fn annotation_deserializer(&self) -> &dyn AnnotationDeserializer {
        &*self.annotations
    }

    /// Looks up a class through the finder, including the class-object convention
    ///
    /// # Errors
    ///
    /// Fails if the class entry is malformed.
    pub fn find_class(&self, class_id: &ClassId) -> Result<Option<ClassDescriptorId>, DeserializationError> {
        self.finder.find_class(self, class_id)
    }

    /// Looks up a package through the finder
    ///
    /// # Errors
    ///
    /// Fails if the package entry is malformed.
    pub fn find_package(&self, fq_name: &FqName) -> Result<Option<PackageDescriptorId>, DeserializationError> {
        self.finder.find_package(self, fq_name)
    }

    /// The class behind `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by another session.
    #[must_use]
    pub fn class(&self, id: ClassDescriptorId) -> Arc<ClassDescriptor> {
        let classes = self.classes.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&classes[id])
    }

    /// The package behind `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by another session.
    #[must_use]
    pub fn package(&self, id: PackageDescriptorId) -> Arc<PackageDescriptor> {
        let packages = self.packages.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&packages[id])
    }

    /// Number of class descriptors materialized so far
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Adds a class built by `build`, which receives the handle it will get
    ///
    /// `build` runs under the arena lock and must not call back into the session.
    pub(crate) fn alloc_class(
        &self,
        build: impl FnOnce(ClassDescriptorId) -> Result<ClassDescriptor, DeserializationError>,
    ) -> Result<ClassDescriptorId, DeserializationError> {
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        let class = build(next_idx(&classes))?;
        tracing::debug!(class = %class.class_id().render(&self.interner), kind = ?class.kind(), "materialized class descriptor");
        Ok(classes.alloc(Arc::new(class)))
    }

    /// Adds a package built by `build`, which receives the handle it will get
    ///
    /// `build` runs under the arena lock and must not call back into the session.
    pub(crate) fn alloc_package(
        &self,
        build: impl FnOnce(PackageDescriptorId) -> Result<PackageDescriptor, DeserializationError>,
    ) -> Result<PackageDescriptorId, DeserializationError> {
        let mut packages = self.packages.write().unwrap_or_else(PoisonError::into_inner);
        let package = build(next_idx(&packages))?;
        tracing::debug!(package = %package.fq_name().render(&self.interner), "materialized package descriptor");
        Ok(packages.alloc(Arc::new(package)))
    }
}

fn next_idx<T>(arena: &Arena<T>) -> Idx<T> {
    Idx::from_raw(RawIdx::from(arena.len() as u32))
}

impl fmt::Debug for ModuleSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ModuleSession")
            .field("config", &self.config)
            .field("storage", &self.storage)
            .field("classes", &self.class_count())
            .finish_non_exhaustive()
    }
}
