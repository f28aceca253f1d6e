//! Labels of the memoized cells created by this crate
//!
//! Pass them to [`cv_storage::StorageManager::computations`] to see how often
//! a kind of value was really computed.

/// Class lookups by id in [`crate::ClassDataFinder`]
pub const FIND_CLASS: &str = "finder.find_class";
/// Package lookups in [`crate::ClassDataFinder`]
pub const FIND_PACKAGE: &str = "finder.find_package";
/// Containing declaration of a class
pub const CONTAINING_DECLARATION: &str = "class.containing_declaration";
/// Annotations of a class
pub const CLASS_ANNOTATIONS: &str = "class.annotations";
/// Supertypes of a class
pub const SUPERTYPES: &str = "class.supertypes";
/// Primary constructor of a class
pub const PRIMARY_CONSTRUCTOR: &str = "class.primary_constructor";
/// Class object of a class
pub const CLASS_OBJECT: &str = "class.class_object";
/// Nested class or enum entry lookups by name
pub const NESTED_CLASS: &str = "class.nested_class";
/// One enum entry of an enum class
pub const ENUM_ENTRY: &str = "class.enum_entry";
/// Names declared by the members of a class or package
pub const DECLARED_NAMES: &str = "scope.declared_names";
/// Functions of a member scope by name
pub const FUNCTIONS: &str = "scope.functions";
/// Properties of a member scope by name
pub const PROPERTIES: &str = "scope.properties";
/// Full enumeration of a member scope
pub const ALL_DESCRIPTORS: &str = "scope.all_descriptors";
