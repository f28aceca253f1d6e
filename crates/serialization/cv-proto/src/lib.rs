//! Serialized descriptor metadata
//!
//! The compact form a compiler writes next to its output so that later
//! compilations can rebuild class and package descriptors without the source.
//! This crate only models and decodes that form; turning it into live
//! descriptors is the job of `cv-descriptors`.
//!
//! # Layout
//!
//! - **proto**: the entry messages (`ProtoClass`, `ProtoCallable`, `ProtoType`, ...)
//! - **flags**: bitfields packed into the `flags` word of classes, callables and parameters
//! - **names**: the per-entry name table and the [`NameResolver`] service over it
//! - **data**: the top-level units ([`ClassData`], [`PackageData`]) and their binary encoding
//!
//! Every message refers to names through indices into the entry's
//! [`NameTable`], so the same string is stored once per entry.

pub mod data;
pub mod error;
pub mod flags;
pub mod names;
pub mod proto;

pub use data::{ClassData, PackageData};
pub use error::ProtoError;
pub use flags::{
    CallableFlags, ClassFlags, FlagField, ParameterFlags, ProtoCallableKind, ProtoClassKind,
    ProtoMemberKind, ProtoModality, ProtoVisibility,
};
pub use names::{NameResolver, NameTable, NameTableBuilder, QualifiedName, QualifiedNameKind, TableNameResolver};
pub use proto::*;
