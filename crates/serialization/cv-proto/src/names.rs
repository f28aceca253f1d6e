//! Name table and the name-resolution service
//!
//! Entries never store strings inline. Short names live in `strings`;
//! packages and classes live in `qualified_names` as a parent-linked chain of
//! segments, each tagged with whether it is a package or a class segment.

use crate::error::ProtoError;
use cv_ids::{ClassId, FqName, Name};
use cv_intern::Interner;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Kind of one qualified-name segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bincode::Encode, bincode::Decode)]
pub enum QualifiedNameKind {
    /// Package segment
    #[default]
    Package,
    /// Class segment
    Class,
}

/// One segment of a qualified name, linked to its parent segment
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct QualifiedName {
    /// Index of the enclosing segment, `None` for the outermost one
    pub parent: Option<u32>,
    /// String index of this segment's short name
    pub short_name: u32,
    /// Package or class segment
    pub kind: QualifiedNameKind,
}

/// Strings and qualified names referenced by one serialized entry
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct NameTable {
    /// Short names
    pub strings: Vec<String>,
    /// Package and class paths
    pub qualified_names: Vec<QualifiedName>,
}

/// Translates name indices of a serialized entry into names and identities
pub trait NameResolver: Send + Sync {
    /// Short name at string index `index`
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::UnknownString`] for an out-of-range index.
    fn name(&self, index: u32) -> Result<Name, ProtoError>;

    /// Full path of the qualified name at `index`, ignoring segment kinds
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-range or cyclic qualified name.
    fn fq_name(&self, index: u32) -> Result<FqName, ProtoError>;

    /// Class identity of the qualified name at `index`
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::NotAClassName`] if the name does not end in class
    /// segments preceded only by package segments.
    fn class_id(&self, index: u32) -> Result<ClassId, ProtoError>;
}

/// [`NameResolver`] over a decoded [`NameTable`]
#[derive(Debug, Clone)]
pub struct TableNameResolver {
    table: Arc<NameTable>,
    interner: Interner,
}

impl TableNameResolver {
    /// Resolves names of `table`, interning them into `interner`
    #[must_use]
    pub fn new(table: Arc<NameTable>, interner: Interner) -> Self {
        Self { table, interner }
    }

    /// Segments from outermost to innermost, with their kinds
    fn chain(&self, index: u32) -> Result<Vec<(Name, QualifiedNameKind)>, ProtoError> {
        let mut chain = Vec::new();
        let mut current = Some(index);
        while let Some(at) = current {
            if chain.len() > self.table.qualified_names.len() {
                return Err(ProtoError::CyclicQualifiedName { index });
            }
            let segment = self
                .table
                .qualified_names
                .get(at as usize)
                .ok_or(ProtoError::UnknownQualifiedName { index: at })?;
            chain.push((self.name(segment.short_name)?, segment.kind));
            current = segment.parent;
        }
        chain.reverse();
        Ok(chain)
    }
}

impl NameResolver for TableNameResolver {
    fn name(&self, index: u32) -> Result<Name, ProtoError> {
        let text = self
            .table
            .strings
            .get(index as usize)
            .ok_or(ProtoError::UnknownString { index })?;
        Ok(self.interner.intern(text))
    }

    fn fq_name(&self, index: u32) -> Result<FqName, ProtoError> {
        let chain = self.chain(index)?;
        Ok(FqName::from_segments(
            chain.into_iter().map(|(name, _)| name).collect(),
        ))
    }

    fn class_id(&self, index: u32) -> Result<ClassId, ProtoError> {
        let chain = self.chain(index)?;
        let split = chain
            .iter()
            .position(|(_, kind)| *kind == QualifiedNameKind::Class)
            .ok_or(ProtoError::NotAClassName { index })?;
        if chain[split..]
            .iter()
            .any(|(_, kind)| *kind != QualifiedNameKind::Class)
        {
            return Err(ProtoError::NotAClassName { index });
        }
        let package = chain[..split].iter().map(|(name, _)| *name).collect();
        let relative = chain[split..].iter().map(|(name, _)| *name).collect();
        ClassId::new(
            FqName::from_segments(package),
            FqName::from_segments(relative),
        )
        .ok_or(ProtoError::NotAClassName { index })
    }
}

/// Incrementally builds a [`NameTable`], deduplicating entries
///
/// Used by producers of serialized entries and by test fixtures.
#[derive(Debug, Clone, Default)]
pub struct NameTableBuilder {
    table: NameTable,
    strings: FxHashMap<String, u32>,
    qualified: FxHashMap<(Option<u32>, u32, QualifiedNameKind), u32>,
}

impl NameTableBuilder {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// String index of `text`
    pub fn name(&mut self, text: &str) -> u32 {
        if let Some(&index) = self.strings.get(text) {
            return index;
        }
        let index = self.table.strings.len() as u32;
        self.table.strings.push(text.to_owned());
        self.strings.insert(text.to_owned(), index);
        index
    }

    /// Qualified-name index of the package `a.b.c`; `None` for the root package
    pub fn package(&mut self, fq_name: &str) -> Option<u32> {
        if fq_name.is_empty() {
            return None;
        }
        let mut parent = None;
        for segment in fq_name.split('.') {
            parent = Some(self.segment(parent, segment, QualifiedNameKind::Package));
        }
        parent
    }

    /// Qualified-name index of the class `pkg.sub/Outer.Inner`
    pub fn class(&mut self, class_id: &str) -> u32 {
        let (package, relative) = class_id.rsplit_once('/').unwrap_or(("", class_id));
        let mut parent = self.package(package);
        let mut last = 0;
        for segment in relative.split('.') {
            last = self.segment(parent, segment, QualifiedNameKind::Class);
            parent = Some(last);
        }
        last
    }

    fn segment(&mut self, parent: Option<u32>, text: &str, kind: QualifiedNameKind) -> u32 {
        let short_name = self.name(text);
        let key = (parent, short_name, kind);
        if let Some(&index) = self.qualified.get(&key) {
            return index;
        }
        let index = self.table.qualified_names.len() as u32;
        self.table.qualified_names.push(QualifiedName {
            parent,
            short_name,
            kind,
        });
        self.qualified.insert(key, index);
        index
    }

    /// Finishes the table
    #[must_use]
    pub fn build(self) -> NameTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_id_splits_package_and_classes() {
        let mut builder = NameTableBuilder::new();
        let entry = builder.class("kotlin.collections/Map.Entry");
        let package = builder.package("kotlin.collections").unwrap();
        let interner = Interner::new();
        let resolver = TableNameResolver::new(Arc::new(builder.build()), interner.clone());

        let class_id = resolver.class_id(entry).unwrap();
        assert_eq!(class_id.render(&interner), "kotlin.collections/Map.Entry");
        assert_eq!(
            resolver.fq_name(entry).unwrap().render(&interner),
            "kotlin.collections.Map.Entry"
        );
        assert_eq!(
            resolver.class_id(package),
            Err(ProtoError::NotAClassName { index: package })
        );
    }

    #[test]
    fn test_builder_deduplicates() {
        let mut builder = NameTableBuilder::new();
        let first = builder.class("a/Foo");
        let second = builder.class("a/Foo");
        assert_eq!(first, second);
        assert_eq!(builder.name("Foo"), builder.name("Foo"));
        assert_eq!(builder.build().strings, ["a", "Foo"]);
    }

    #[test]
    fn test_out_of_range_indices() {
        let resolver = TableNameResolver::new(Arc::new(NameTable::default()), Interner::new());
        assert_eq!(resolver.name(3), Err(ProtoError::UnknownString { index: 3 }));
        assert_eq!(
            resolver.class_id(0),
            Err(ProtoError::UnknownQualifiedName { index: 0 })
        );
    }

    #[test]
    fn test_cyclic_parent_chain() {
        let table = NameTable {
            strings: vec!["Loop".to_owned()],
            qualified_names: vec![QualifiedName {
                parent: Some(0),
                short_name: 0,
                kind: QualifiedNameKind::Class,
            }],
        };
        let resolver = TableNameResolver::new(Arc::new(table), Interner::new());
        assert_eq!(
            resolver.class_id(0),
            Err(ProtoError::CyclicQualifiedName { index: 0 })
        );
    }
}
