//! Lazy descriptors rebuilt from serialized metadata
//!
//! A [`ModuleSession`] owns every class and package descriptor of one
//! module. Descriptors are materialized the first time a [`DescriptorFinder`]
//! is asked for them, and each of their parts (supertypes, constructors,
//! members, nested classes) is decoded on first read and cached.
//!
//! # Architecture
//!
//! - **session**: arenas of descriptors plus the shared interner, storage and configuration
//! - **finder**: lookup by [`cv_ids::ClassId`] / [`cv_ids::FqName`], with the class-object convention
//! - **class** / **package**: the descriptors and their lazily computed parts
//! - **scope**: member scopes, override binding and fake overrides
//! - **type_deserializer** / **member_deserializer**: serialized types and callables to descriptors
//! - **render**: text dumps for tests
//!
//! # Usage
//!
//! ```rust,ignore
//! use cv_descriptors::{ClassDataIndex, ModuleSession, SessionConfig};
//!
//! let mut index = ClassDataIndex::new();
//! let class_id = index.add_class_data(&data, &interner)?;
//! let session = ModuleSession::from_index(interner, SessionConfig::default(), index);
//!
//! let class = session.find_class(&class_id)?.expect("registered above");
//! let members = session.class(class).member_scope().all_descriptors(&session)?;
//! ```
//!
//! References between descriptors are handles into the session or
//! [`cv_ids::ClassId`] keys, so cyclic class hierarchies can be described;
//! walking a member scope around such a cycle reports
//! [`cv_storage::StorageError::RecursionDetected`].

pub mod annotation;
pub mod class;
pub mod config;
pub mod descriptors;
pub mod enum_class_object;
pub mod error;
pub mod finder;
pub mod labels;
pub mod member_deserializer;
mod nested;
pub mod package;
pub mod render;
pub mod scope;
pub mod session;
pub mod type_deserializer;
pub mod types;

pub use annotation::{AnnotationDeserializer, ProtoAnnotationDeserializer};
pub use class::{ClassDescriptor, ClassDescriptorId, ClassOrigin, DeserializedClass};
pub use config::{ConfigError, SessionConfig};
pub use descriptors::{
    Annotation, CallableDescriptor, CallableKind, Callables, ClassKind, ConstantValue, DeclarationDescriptor,
    DeclarationRef, MemberKind, Modality, ReceiverParameter, ValueParameter, Visibility,
};
pub use enum_class_object::EnumClassObject;
pub use error::DeserializationError;
pub use finder::{ClassDataFinder, ClassDataIndex, DescriptorFinder};
pub use member_deserializer::{CONSTRUCTOR_NAME, MemberDeserializer};
pub use package::{PackageDescriptor, PackageDescriptorId};
pub use render::{render_class, render_package};
pub use scope::MemberScope;
pub use session::ModuleSession;
pub use type_deserializer::TypeDeserializer;
pub use types::{Ty, TyConstructor, TypeParameterDescriptor, TypeProjection, TypeSubstitution, Variance};
