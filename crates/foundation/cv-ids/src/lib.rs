//! Identity model for packages and classes
//!
//! This crate is separate so that the serialized format (`cv-proto`) and the
//! descriptor graph (`cv-descriptors`) agree on one definition of a class
//! identity without depending on each other.
//!
//! Names are interned [`Symbol`]s; rendering any identity back to text needs
//! the session's [`Interner`].

use cv_intern::{Interner, Symbol};

/// A short, dot-free identifier
pub type Name = Symbol;

const CLASS_OBJECT_PREFIX: &str = "<class-object-for-";

/// A dot-separated path of names, e.g. a package or a relative class path
///
/// The empty path is the root package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FqName {
    segments: Vec<Name>,
}

impl FqName {
    /// The root package
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from its segments
    #[must_use]
    pub fn from_segments(segments: Vec<Name>) -> Self {
        Self { segments }
    }

    /// A single-segment path
    #[must_use]
    pub fn top_level(name: Name) -> Self {
        Self {
            segments: vec![name],
        }
    }

    /// Parses `a.b.c`, interning every segment; the empty string is the root
    #[must_use]
    pub fn parse(text: &str, interner: &Interner) -> Self {
        if text.is_empty() {
            return Self::root();
        }
        Self {
            segments: text.split('.').map(|segment| interner.intern(segment)).collect(),
        }
    }

    /// Segments from outermost to innermost
    #[must_use]
    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    /// Whether this is the root package
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path extended by one segment
    #[must_use]
    pub fn child(&self, name: Name) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(name);
        Self { segments }
    }

    /// The path without its last segment, `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// The last segment, `None` for the root
    #[must_use]
    pub fn short_name(&self) -> Option<Name> {
        self.segments.last().copied()
    }

    /// Every ancestor of this path including the root, innermost first
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (0..self.segments.len()).rev().map(|len| Self {
            segments: self.segments[..len].to_vec(),
        })
    }

    /// Renders the path with `.` separators
    #[must_use]
    pub fn render(&self, interner: &Interner) -> String {
        self.segments
            .iter()
            .map(|segment| interner.resolve(segment))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Package-qualified identity of a class
///
/// The relative part names the chain of enclosing classes and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassId {
    package: FqName,
    relative: FqName,
}

impl ClassId {
    /// Creates a class id, `None` if `relative` is the empty path
    #[must_use]
    pub fn new(package: FqName, relative: FqName) -> Option<Self> {
        if relative.is_root() {
            return None;
        }
        Some(Self { package, relative })
    }

    /// A top-level class in `package`
    #[must_use]
    pub fn top_level(package: FqName, name: Name) -> Self {
        Self {
            package,
            relative: FqName::top_level(name),
        }
    }

    /// Parses `pkg.sub/Outer.Inner`, `None` if the class part is empty
    #[must_use]
    pub fn parse(text: &str, interner: &Interner) -> Option<Self> {
        let (package, relative) = text.rsplit_once('/').unwrap_or(("", text));
        Self::new(
            FqName::parse(package, interner),
            FqName::parse(relative, interner),
        )
    }

    /// Package containing the outermost class
    #[must_use]
    pub fn package_fq_name(&self) -> &FqName {
        &self.package
    }

    /// Path of the class relative to its package
    #[must_use]
    pub fn relative_class_name(&self) -> &FqName {
        &self.relative
    }

    /// Whether the class is not nested in another class
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.relative.segments().len() == 1
    }

    /// The innermost class name
    #[must_use]
    pub fn short_name(&self) -> Name {
        // Non-empty by construction
        self.relative.segments()[self.relative.segments().len() - 1]
    }

    /// The enclosing class, `None` for top-level classes
    #[must_use]
    pub fn outer_class_id(&self) -> Option<Self> {
        if self.is_top_level() {
            return None;
        }
        self.relative.parent().map(|relative| Self {
            package: self.package.clone(),
            relative,
        })
    }

    /// Identity of the class `name` nested in this one
    #[must_use]
    pub fn create_nested_class_id(&self, name: Name) -> Self {
        Self {
            package: self.package.clone(),
            relative: self.relative.child(name),
        }
    }

    /// Package and relative parts joined into one path
    #[must_use]
    pub fn as_single_fq_name(&self) -> FqName {
        let mut segments = self.package.segments().to_vec();
        segments.extend_from_slice(self.relative.segments());
        FqName::from_segments(segments)
    }

    /// Renders as `pkg.sub/Outer.Inner`
    #[must_use]
    pub fn render(&self, interner: &Interner) -> String {
        format!(
            "{}/{}",
            self.package.render(interner),
            self.relative.render(interner)
        )
    }
}

/// Name of the class object belonging to the class `owner`
#[must_use]
pub fn class_object_name(owner: Name, interner: &Interner) -> Name {
    let text = interner.with_text(&owner, |owner| format!("{CLASS_OBJECT_PREFIX}{owner}>"));
    interner.intern(&text)
}

/// Whether `name` follows the class-object naming convention
#[must_use]
pub fn is_class_object_name(name: Name, interner: &Interner) -> bool {
    interner.with_text(&name, |text| {
        text.starts_with(CLASS_OBJECT_PREFIX) && text.ends_with('>')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_class_ids() {
        let interner = Interner::new();
        let outer = ClassId::parse("kotlin.collections/Map", &interner).unwrap();
        assert!(outer.is_top_level());
        assert_eq!(outer.outer_class_id(), None);

        let entry = outer.create_nested_class_id(interner.intern("Entry"));
        assert!(!entry.is_top_level());
        assert_eq!(entry.outer_class_id(), Some(outer.clone()));
        assert_eq!(entry.render(&interner), "kotlin.collections/Map.Entry");
        assert_eq!(
            Some(entry.clone()),
            ClassId::parse("kotlin.collections/Map.Entry", &interner)
        );
        assert_eq!(
            entry.as_single_fq_name().render(&interner),
            "kotlin.collections.Map.Entry"
        );
    }

    #[test]
    fn test_empty_class_part_is_not_a_class_id() {
        let interner = Interner::new();
        assert_eq!(ClassId::parse("a/", &interner), None);
        assert_eq!(ClassId::parse("", &interner), None);
        assert_eq!(ClassId::new(FqName::parse("a", &interner), FqName::root()), None);

        let top = ClassId::parse("Top", &interner).unwrap();
        assert!(top.package_fq_name().is_root());
        assert_eq!(interner.resolve(&top.short_name()), "Top");
    }

    #[test]
    fn test_fq_name_navigation() {
        let interner = Interner::new();
        let name = FqName::parse("a.b.c", &interner);
        assert_eq!(name.parent(), Some(FqName::parse("a.b", &interner)));
        assert_eq!(FqName::root().parent(), None);
        let ancestors: Vec<_> = name.ancestors().map(|fq| fq.render(&interner)).collect();
        assert_eq!(ancestors, ["a.b", "a", ""]);
        assert_eq!(FqName::parse("", &interner), FqName::root());
    }

    #[test]
    fn test_class_object_names() {
        let interner = Interner::new();
        let color = interner.intern("Color");
        let name = class_object_name(color, &interner);
        assert_eq!(interner.resolve(&name), "<class-object-for-Color>");
        assert!(is_class_object_name(name, &interner));
        assert!(!is_class_object_name(color, &interner));
    }
}
