//! Class descriptors
//!
//! A class's identity (name, kind, modality, visibility, type parameters) is
//! fixed when it is materialized. Everything that may touch other entries is
//! computed on first read and cached in the descriptor:
//!
//! - containing declaration
//! - annotations
//! - supertypes
//! - primary constructor
//! - class object
//! - nested classes and enum entries
//! - member scope contents

use crate::descriptors::{
    Annotation, CallableDescriptor, ClassKind, DeclarationRef, Modality, ReceiverParameter, Visibility,
};
use crate::enum_class_object::EnumClassObject;
use crate::error::DeserializationError;
use crate::labels;
use crate::member_deserializer::{MemberDeserializer, object_constructor};
use crate::nested::NestedClassIndex;
use crate::scope::MemberScope;
use crate::scope::class::ClassScopeCache;
use crate::scope::declared::DeclaredMembers;
use crate::session::ModuleSession;
use crate::type_deserializer::TypeDeserializer;
use crate::types::{Ty, TypeParameterDescriptor, TypeProjection};
use cv_ids::{ClassId, Name, class_object_name};
use cv_proto::{ClassFlags, NameResolver, ProtoClass, ProtoClassKind};
use cv_storage::LazyValue;
use la_arena::Idx;
use std::fmt;
use std::mem;
use std::sync::Arc;

/// Handle of a class descriptor in its session's arena
pub type ClassDescriptorId = Idx<Arc<ClassDescriptor>>;

/// A class, interface, object, enum, enum entry or class object
pub struct ClassDescriptor {
    id: ClassDescriptorId,
    class_id: ClassId,
    name: Name,
    display_name: String,
    kind: ClassKind,
    modality: Modality,
    visibility: Visibility,
    inner: bool,
    type_parameters: Vec<TypeParameterDescriptor>,
    origin: ClassOrigin,
}

/// Where a class descriptor came from
pub enum ClassOrigin {
    /// Read from a serialized class entry
    Deserialized(Box<DeserializedClass>),
    /// Synthesized as the class object of an enum class
    EnumClassObject(EnumClassObject),
}

/// Lazily computed state of a class read from a serialized entry
pub struct DeserializedClass {
    proto: ProtoClass,
    has_annotations: bool,
    resolver: Arc<dyn NameResolver>,
    parent: Option<ClassDescriptorId>,
    declared: DeclaredMembers,
    nested: NestedClassIndex,
    scope: ClassScopeCache,
    containing_declaration: LazyValue<Result<DeclarationRef, DeserializationError>>,
    annotations: LazyValue<Result<Arc<[Annotation]>, DeserializationError>>,
    supertypes: LazyValue<Result<Arc<[Ty]>, DeserializationError>>,
    primary_constructor: LazyValue<Result<Option<Arc<CallableDescriptor>>, DeserializationError>>,
    class_object: LazyValue<Result<Option<ClassDescriptorId>, DeserializationError>>,
}

impl ClassDescriptor {
    /// Builds the descriptor of a serialized class
    ///
    /// `parent` is set for classes deserialized inline by another class
    /// (enum entries, class objects of objects), which are their container.
    pub(crate) fn deserialized(
        session: &ModuleSession,
        id: ClassDescriptorId,
        class_id: ClassId,
        mut proto: ProtoClass,
        resolver: Arc<dyn NameResolver>,
        parent: Option<ClassDescriptorId>,
    ) -> Result<Self, DeserializationError> {
        let flags = ClassFlags::decode(proto.flags)?;
        let type_parameters =
            TypeDeserializer::class_type_parameters(&*resolver, &proto.type_parameters)?;
        let storage = session.storage();
        let members = mem::take(&mut proto.members);
        let name = class_id.short_name();
        Ok(Self {
            id,
            display_name: session.interner().resolve(&name),
            name,
            class_id,
            kind: flags.kind.into(),
            modality: flags.modality.into(),
            visibility: flags.visibility.into(),
            inner: flags.inner,
            type_parameters,
            origin: ClassOrigin::Deserialized(Box::new(DeserializedClass {
                declared: DeclaredMembers::new(members, Arc::clone(&resolver), storage),
                nested: NestedClassIndex::new(proto.enum_entries.len(), storage),
                scope: ClassScopeCache::new(storage),
                has_annotations: flags.has_annotations,
                containing_declaration: storage.lazy_value(labels::CONTAINING_DECLARATION),
                annotations: storage.lazy_value(labels::CLASS_ANNOTATIONS),
                supertypes: storage.lazy_value(labels::SUPERTYPES),
                primary_constructor: storage.lazy_value(labels::PRIMARY_CONSTRUCTOR),
                class_object: storage.lazy_value(labels::CLASS_OBJECT),
                proto,
                resolver,
                parent,
            })),
        })
    }

    /// Builds the synthesized class object of `enum_class`
    pub(crate) fn enum_class_object(
        session: &ModuleSession,
        id: ClassDescriptorId,
        enum_class: &Self,
        class_id: ClassId,
    ) -> Self {
        let name = class_id.short_name();
        let object = EnumClassObject::new(session, id, &class_id, enum_class);
        Self {
            id,
            display_name: session.interner().resolve(&name),
            name,
            class_id,
            kind: ClassKind::ClassObject,
            modality: Modality::Final,
            visibility: enum_class.visibility,
            inner: false,
            type_parameters: Vec::new(),
            origin: ClassOrigin::EnumClassObject(object),
        }
    }

    /// Handle of this descriptor
    #[must_use]
    pub fn id(&self) -> ClassDescriptorId {
        self.id
    }

    /// Identity of the class
    #[must_use]
    pub fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    /// Short name
    #[must_use]
    pub fn name(&self) -> Name {
        self.name
    }

    /// Kind of class
    #[must_use]
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Modality
    #[must_use]
    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// Visibility
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether the class captures an instance of its outer class
    #[must_use]
    pub fn is_inner(&self) -> bool {
        self.inner
    }

    /// Whether the class cannot be subclassed
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.modality == Modality::Final
    }

    /// Declared type parameters
    #[must_use]
    pub fn type_parameters(&self) -> &[TypeParameterDescriptor] {
        &self.type_parameters
    }

    /// How the descriptor was created
    #[must_use]
    pub fn origin(&self) -> &ClassOrigin {
        &self.origin
    }

    /// The class applied to its own type parameters
    #[must_use]
    pub fn default_type(&self) -> Ty {
        Ty::class(
            self.class_id.clone(),
            self.type_parameters
                .iter()
                .map(|parameter| TypeProjection::invariant(parameter.default_type()))
                .collect(),
        )
    }

    /// Implicit `this` receiver inside the class
    #[must_use]
    pub fn this_receiver(&self) -> ReceiverParameter {
        ReceiverParameter {
            owner: DeclarationRef::Class(self.id),
            ty: self.default_type(),
        }
    }

    /// Member scope of the class
    #[must_use]
    pub fn member_scope(&self) -> MemberScope {
        match self.origin {
            ClassOrigin::Deserialized(_) => MemberScope::Class(self.id),
            ClassOrigin::EnumClassObject(_) => MemberScope::Synthesized(self.id),
        }
    }

    /// Package or class declaring this class
    ///
    /// Falls back to [`DeclarationRef::Error`] if the container cannot be found.
    ///
    /// # Errors
    ///
    /// Fails if the container's entry is malformed.
    pub fn containing_declaration(
        &self,
        session: &ModuleSession,
    ) -> Result<DeclarationRef, DeserializationError> {
        match &self.origin {
            ClassOrigin::Deserialized(class) => class
                .containing_declaration
                .get_or_compute(|| class.compute_containing_declaration(self, session))?,
            ClassOrigin::EnumClassObject(object) => Ok(DeclarationRef::Class(object.enum_class())),
        }
    }

    /// Annotations on the class
    ///
    /// # Errors
    ///
    /// Fails if the annotations cannot be read.
    pub fn annotations(&self, session: &ModuleSession) -> Result<Arc<[Annotation]>, DeserializationError> {
        match &self.origin {
            ClassOrigin::Deserialized(class) => class
                .annotations
                .get_or_compute(|| class.compute_annotations(session))?,
            ClassOrigin::EnumClassObject(_) => Ok(Arc::from(Vec::new())),
        }
    }

    /// Direct supertypes
    ///
    /// Only class ids are recorded, so cyclic hierarchies resolve.
    ///
    /// # Errors
    ///
    /// Fails if a supertype entry is malformed.
    pub fn supertypes(&self, _session: &ModuleSession) -> Result<Arc<[Ty]>, DeserializationError> {
        match &self.origin {
            ClassOrigin::Deserialized(class) => class
                .supertypes
                .get_or_compute(|| class.compute_supertypes(self))?,
            ClassOrigin::EnumClassObject(_) => Ok(Arc::from(Vec::new())),
        }
    }

    /// Primary constructor, if the class declares one
    ///
    /// # Errors
    ///
    /// Fails if the constructor entry is malformed.
    pub fn primary_constructor(
        &self,
        session: &ModuleSession,
    ) -> Result<Option<Arc<CallableDescriptor>>, DeserializationError> {
        match &self.origin {
            ClassOrigin::Deserialized(class) => class
                .primary_constructor
                .get_or_compute(|| class.compute_primary_constructor(self, session))?,
            ClassOrigin::EnumClassObject(object) => Ok(Some(Arc::clone(object.constructor()))),
        }
    }

    /// All constructors; only primary constructors are serialized
    ///
    /// # Errors
    ///
    /// Fails if the constructor entry is malformed.
    pub fn constructors(
        &self,
        session: &ModuleSession,
    ) -> Result<Vec<Arc<CallableDescriptor>>, DeserializationError> {
        Ok(self.primary_constructor(session)?.into_iter().collect())
    }

    /// Class object (companion) of the class
    ///
    /// # Errors
    ///
    /// Returns [`DeserializationError::MissingClassObjectData`] for objects and
    /// enum entries whose class object payload is missing, and fails if the
    /// class object's entry is malformed.
    pub fn class_object(
        &self,
        session: &ModuleSession,
    ) -> Result<Option<ClassDescriptorId>, DeserializationError> {
        match &self.origin {
            ClassOrigin::Deserialized(class) => class
                .class_object
                .get_or_compute(|| class.compute_class_object(self, session))?,
            ClassOrigin::EnumClassObject(_) => Ok(None),
        }
    }

    /// Default type of the class object
    ///
    /// # Errors
    ///
    /// Fails like [`Self::class_object`].
    pub fn class_object_type(&self, session: &ModuleSession) -> Result<Option<Ty>, DeserializationError> {
        Ok(self
            .class_object(session)?
            .map(|class_object| session.class(class_object).default_type()))
    }

    /// Nested class or enum entry named `name`
    ///
    /// # Errors
    ///
    /// Fails if the nested class's entry is malformed.
    pub fn nested_class(
        &self,
        session: &ModuleSession,
        name: Name,
    ) -> Result<Option<ClassDescriptorId>, DeserializationError> {
        match &self.origin {
            ClassOrigin::Deserialized(class) => class.nested.nested_class(session, self, class, name),
            ClassOrigin::EnumClassObject(_) => Ok(None),
        }
    }

    /// Nested classes then enum entries, in declaration order, skipping missing ones
    ///
    /// # Errors
    ///
    /// Fails if a nested class's entry is malformed.
    pub fn nested_classes(
        &self,
        session: &ModuleSession,
    ) -> Result<Vec<ClassDescriptorId>, DeserializationError> {
        match &self.origin {
            ClassOrigin::Deserialized(class) => class.nested.nested_classes(session, self, class),
            ClassOrigin::EnumClassObject(_) => Ok(Vec::new()),
        }
    }

    /// Enum entries in declaration order
    ///
    /// # Errors
    ///
    /// Fails if an entry is malformed.
    pub fn enum_entries(
        &self,
        session: &ModuleSession,
    ) -> Result<Vec<ClassDescriptorId>, DeserializationError> {
        match &self.origin {
            ClassOrigin::Deserialized(class) => class.nested.enum_entries(session, self, class),
            ClassOrigin::EnumClassObject(_) => Ok(Vec::new()),
        }
    }
}

impl DeserializedClass {
    /// The serialized entry, without its members
    pub(crate) fn proto(&self) -> &ProtoClass {
        &self.proto
    }

    /// Name resolver of the entry
    pub(crate) fn resolver(&self) -> &dyn NameResolver {
        &*self.resolver
    }

    /// Declared functions and properties
    pub(crate) fn declared(&self) -> &DeclaredMembers {
        &self.declared
    }

    /// Member scope caches
    pub(crate) fn scope(&self) -> &ClassScopeCache {
        &self.scope
    }

    /// Materializes a class payload stored inline in this entry
    pub(crate) fn inline_child(
        &self,
        session: &ModuleSession,
        owner: &ClassDescriptor,
        class_id: ClassId,
        proto: ProtoClass,
        allowed: &[ProtoClassKind],
    ) -> Result<ClassDescriptorId, DeserializationError> {
        let kind = ClassFlags::decode(proto.flags)?.kind;
        if !allowed.contains(&kind) {
            return Err(DeserializationError::UnsupportedClassKind {
                class: class_id.render(session.interner()),
                kind,
            });
        }
        session.alloc_class(|id| {
            ClassDescriptor::deserialized(
                session,
                id,
                class_id,
                proto,
                Arc::clone(&self.resolver),
                Some(owner.id),
            )
        })
    }

    fn compute_containing_declaration(
        &self,
        owner: &ClassDescriptor,
        session: &ModuleSession,
    ) -> Result<DeclarationRef, DeserializationError> {
        if let Some(parent) = self.parent {
            return Ok(DeclarationRef::Class(parent));
        }
        let found = match owner.class_id.outer_class_id() {
            Some(outer) => session.find_class(&outer)?.map(DeclarationRef::Class),
            None => session
                .find_package(owner.class_id.package_fq_name())?
                .map(DeclarationRef::Package),
        };
        Ok(found.unwrap_or_else(|| {
            tracing::warn!(
                class = %owner.class_id.render(session.interner()),
                "containing declaration not found"
            );
            DeclarationRef::Error
        }))
    }

    fn compute_annotations(&self, session: &ModuleSession) -> Result<Arc<[Annotation]>, DeserializationError> {
        if !self.has_annotations {
            return Ok(Arc::from(Vec::new()));
        }
        let annotations = session
            .annotation_deserializer()
            .load_class_annotations(&self.proto, &*self.resolver)?;
        Ok(Arc::from(annotations))
    }

    fn compute_supertypes(&self, owner: &ClassDescriptor) -> Result<Arc<[Ty]>, DeserializationError> {
        let context = TypeDeserializer::new(&*self.resolver, &owner.type_parameters);
        let supertypes = self
            .proto
            .supertypes
            .iter()
            .map(|supertype| context.ty(supertype))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::from(supertypes))
    }

    fn compute_primary_constructor(
        &self,
        owner: &ClassDescriptor,
        session: &ModuleSession,
    ) -> Result<Option<Arc<CallableDescriptor>>, DeserializationError> {
        let Some(marker) = &self.proto.primary_constructor else {
            return Ok(None);
        };
        let container = DeclarationRef::Class(owner.id);
        let constructor = match &marker.data {
            None => object_constructor(session, container, owner.default_type()),
            Some(data) => {
                let context = TypeDeserializer::new(&*self.resolver, &owner.type_parameters);
                MemberDeserializer::new(session, &context, container).constructor(data, true)?
            }
        };
        Ok(Some(Arc::new(constructor)))
    }

    fn compute_class_object(
        &self,
        owner: &ClassDescriptor,
        session: &ModuleSession,
    ) -> Result<Option<ClassDescriptorId>, DeserializationError> {
        let Some(marker) = &self.proto.class_object else {
            return Ok(None);
        };
        let class_object_id = owner
            .class_id
            .create_nested_class_id(class_object_name(owner.name, session.interner()));
        match owner.kind {
            ClassKind::EnumClass => session
                .alloc_class(|id| {
                    Ok(ClassDescriptor::enum_class_object(session, id, owner, class_object_id))
                })
                .map(Some),
            ClassKind::Object | ClassKind::EnumEntry => {
                let Some(data) = &marker.data else {
                    return Err(DeserializationError::MissingClassObjectData {
                        class: owner.class_id.render(session.interner()),
                    });
                };
                self.inline_child(
                    session,
                    owner,
                    class_object_id,
                    ProtoClass::clone(data),
                    &[ProtoClassKind::ClassObject, ProtoClassKind::Object],
                )
                .map(Some)
            }
            ClassKind::Class | ClassKind::Trait | ClassKind::AnnotationClass | ClassKind::ClassObject => {
                session.find_class(&class_object_id)
            }
        }
    }
}

impl fmt::Display for ClassDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            ClassOrigin::Deserialized(_) => write!(formatter, "deserialized class {}", self.display_name),
            ClassOrigin::EnumClassObject(_) => write!(formatter, "enum class object {}", self.display_name),
        }
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ClassDescriptor")
            .field("id", &self.id)
            .field("name", &self.display_name)
            .field("kind", &self.kind)
            .field("modality", &self.modality)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}
