//! Integration test utilities for the descriptor deserializer
//!
//! A [`Fixture`] collects encoded entries described with the builders of
//! [`builder`] and turns them into a [`ModuleSession`].

pub mod builder;

use anyhow::Result;
use builder::{ClassSpec, PackageSpec};
use cv_descriptors::{
    ClassDataFinder, ClassDataIndex, ClassDescriptorId, DescriptorFinder, DeserializationError, ModuleSession,
    PackageDescriptorId, SessionConfig,
};
use cv_ids::{ClassId, FqName, Name};
use cv_intern::Interner;
use cv_storage::StorageManager;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Test fixture helper
pub struct Fixture {
    /// Interner shared by the entries and the session
    pub interner: Interner,
    /// Entries registered so far
    pub index: ClassDataIndex,
}

impl Fixture {
    /// Creates an empty fixture
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        Self {
            interner: Interner::new(),
            index: ClassDataIndex::new(),
        }
    }

    /// Encodes and registers a class entry
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be encoded
    pub fn add_class(&mut self, class: &ClassSpec) -> Result<ClassId> {
        Ok(self.index.add_class_data(&class.build(), &self.interner)?)
    }

    /// Encodes and registers the members of `package`
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be encoded
    pub fn add_package(&mut self, package: &str, members: &PackageSpec) -> Result<FqName> {
        let fq_name = self.fq_name(package);
        self.index.add_package_data(fq_name.clone(), &members.build())?;
        Ok(fq_name)
    }

    /// Lists a class name for `package` without registering its entry
    pub fn add_class_name(&mut self, package: &str, name: &str) {
        let fq_name = self.fq_name(package);
        let name = self.name(name);
        self.index.add_class_name(fq_name, name);
    }

    /// Interns `text`
    #[must_use]
    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Parses `pkg/Outer.Inner`
    ///
    /// # Errors
    ///
    /// Fails if `text` has an empty class part.
    pub fn class_id(&self, text: &str) -> Result<ClassId> {
        ClassId::parse(text, &self.interner).ok_or_else(|| anyhow::anyhow!("`{text}` is not a class id"))
    }

    /// Parses `a.b.c`
    #[must_use]
    pub fn fq_name(&self, text: &str) -> FqName {
        FqName::parse(text, &self.interner)
    }

    /// A session over the registered entries with the default configuration
    #[must_use]
    pub fn session(self) -> ModuleSession {
        self.session_with(SessionConfig::default())
    }

    /// A session over the registered entries
    #[must_use]
    pub fn session_with(self, config: SessionConfig) -> ModuleSession {
        ModuleSession::from_index(self.interner, config, self.index)
    }

    /// A session whose finder counts primitive class lookups
    #[must_use]
    pub fn counting_session(self) -> (ModuleSession, Arc<CountingFinder>) {
        let storage = StorageManager::new();
        let finder = Arc::new(CountingFinder::new(ClassDataFinder::new(self.index, &storage)));
        let session = ModuleSession::new(
            self.interner,
            storage,
            SessionConfig::default(),
            Arc::clone(&finder) as Arc<dyn DescriptorFinder>,
        );
        (session, finder)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Finder wrapper counting how often each lookup reaches the wrapped finder
pub struct CountingFinder {
    inner: ClassDataFinder,
    class_lookups: AtomicUsize,
    package_lookups: AtomicUsize,
}

impl CountingFinder {
    /// Wraps `inner`
    #[must_use]
    pub fn new(inner: ClassDataFinder) -> Self {
        Self {
            inner,
            class_lookups: AtomicUsize::new(0),
            package_lookups: AtomicUsize::new(0),
        }
    }

    /// Calls of `find_class_impl` so far
    #[must_use]
    pub fn class_lookups(&self) -> usize {
        self.class_lookups.load(Ordering::SeqCst)
    }

    /// Calls of `find_package` so far
    #[must_use]
    pub fn package_lookups(&self) -> usize {
        self.package_lookups.load(Ordering::SeqCst)
    }
}

impl DescriptorFinder for CountingFinder {
    fn find_class_impl(
        &self,
        session: &ModuleSession,
        class_id: &ClassId,
    ) -> Result<Option<ClassDescriptorId>, DeserializationError> {
        self.class_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_class_impl(session, class_id)
    }

    fn find_package(
        &self,
        session: &ModuleSession,
        fq_name: &FqName,
    ) -> Result<Option<PackageDescriptorId>, DeserializationError> {
        self.package_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_package(session, fq_name)
    }

    fn class_names(&self, session: &ModuleSession, package: &FqName) -> Vec<Name> {
        self.inner.class_names(session, package)
    }
}

/// Installs a `tracing` subscriber writing to the test harness, once per process
///
/// Filtered by `RUST_LOG`; silent when it is unset.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();
}

/// Finds a class that must exist
///
/// # Errors
///
/// Returns an error if the lookup fails or the class is missing
pub fn class(session: &ModuleSession, class_id: &ClassId) -> Result<ClassDescriptorId> {
    session
        .find_class(class_id)?
        .ok_or_else(|| anyhow::anyhow!("class {} not found", class_id.render(session.interner())))
}
