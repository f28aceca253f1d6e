//! Nested classes and enum entries of a deserialized class

use crate::class::{ClassDescriptor, ClassDescriptorId, DeserializedClass};
use crate::error::DeserializationError;
use crate::labels;
use crate::session::ModuleSession;
use cv_ids::Name;
use cv_proto::ProtoClassKind;
use cv_storage::{LazyValue, MemoizedFunction, StorageManager};

type Lookup = Result<Option<ClassDescriptorId>, DeserializationError>;

/// Per-class cache of nested class lookups
///
/// Lookups by name are memoized, including misses. Each enum entry has its
/// own cell so an entry deserialized inline is materialized once.
pub(crate) struct NestedClassIndex {
    lookups: MemoizedFunction<Name, Lookup>,
    entries: Vec<LazyValue<Lookup>>,
}

impl NestedClassIndex {
    pub(crate) fn new(entry_count: usize, storage: &StorageManager) -> Self {
        Self {
            lookups: storage.memoized_function(labels::NESTED_CLASS),
            entries: (0..entry_count)
                .map(|_| storage.lazy_value(labels::ENUM_ENTRY))
                .collect(),
        }
    }

    pub(crate) fn nested_class(
        &self,
        session: &ModuleSession,
        owner: &ClassDescriptor,
        class: &DeserializedClass,
        name: Name,
    ) -> Lookup {
        self.lookups.get_or_compute(&name, |key| -> Lookup {
            let proto = class.proto();
            let resolver = class.resolver();
            for &index in &proto.nested_class_names {
                if resolver.name(index)? == *key {
                    return session.find_class(&owner.class_id().create_nested_class_id(*key));
                }
            }
            for (position, entry) in proto.enum_entries.iter().enumerate() {
                if resolver.name(entry.name)? == *key {
                    return self.enum_entry(session, owner, class, position);
                }
            }
            Ok(None)
        })?
    }

    pub(crate) fn nested_classes(
        &self,
        session: &ModuleSession,
        owner: &ClassDescriptor,
        class: &DeserializedClass,
    ) -> Result<Vec<ClassDescriptorId>, DeserializationError> {
        let mut found = Vec::new();
        for &index in &class.proto().nested_class_names {
            let name = class.resolver().name(index)?;
            if let Some(nested) = self.nested_class(session, owner, class, name)? {
                found.push(nested);
            }
        }
        found.extend(self.enum_entries(session, owner, class)?);
        Ok(found)
    }

    pub(crate) fn enum_entries(
        &self,
        session: &ModuleSession,
        owner: &ClassDescriptor,
        class: &DeserializedClass,
    ) -> Result<Vec<ClassDescriptorId>, DeserializationError> {
        let mut found = Vec::new();
        for position in 0..self.entries.len() {
            if let Some(entry) = self.enum_entry(session, owner, class, position)? {
                found.push(entry);
            }
        }
        Ok(found)
    }

    fn enum_entry(
        &self,
        session: &ModuleSession,
        owner: &ClassDescriptor,
        class: &DeserializedClass,
        position: usize,
    ) -> Lookup {
        let (Some(cell), Some(entry)) = (
            self.entries.get(position),
            class.proto().enum_entries.get(position),
        ) else {
            return Ok(None);
        };
        cell.get_or_compute(|| -> Lookup {
            let name = class.resolver().name(entry.name)?;
            let class_id = owner.class_id().create_nested_class_id(name);
            match &entry.data {
                Some(data) => class
                    .inline_child(session, owner, class_id, data.clone(), &[ProtoClassKind::EnumEntry])
                    .map(Some),
                None => session.find_class(&class_id),
            }
        })?
    }
}
