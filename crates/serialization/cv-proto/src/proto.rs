//! Serialized entry messages
//!
//! Field meanings follow the producer; indices named `name`/`fq_name`/`id`
//! point into the entry's name table (strings for short names, qualified
//! names for classes and packages).

/// Kind of a type constructor reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bincode::Encode, bincode::Decode)]
pub enum ProtoConstructorKind {
    /// `id` is a qualified-name index of a class
    #[default]
    Class,
    /// `id` is the id of a type parameter in scope
    TypeParameter,
}

/// Reference to the constructor of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoTypeConstructor {
    /// What `id` refers to
    pub kind: ProtoConstructorKind,
    /// Qualified-name index or type parameter id
    pub id: u32,
}

/// Projection of a type argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bincode::Encode, bincode::Decode)]
pub enum ProtoProjection {
    /// `in T`
    In,
    /// `out T`
    Out,
    /// `T`
    #[default]
    Inv,
    /// `*`
    Star,
}

/// Declaration-site variance of a type parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bincode::Encode, bincode::Decode)]
pub enum ProtoVariance {
    /// Contravariant
    In,
    /// Covariant
    Out,
    /// Invariant
    #[default]
    Inv,
}

/// A type reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoType {
    /// Class or type parameter being applied
    pub constructor: ProtoTypeConstructor,
    /// Type arguments in declaration order
    pub arguments: Vec<ProtoTypeArgument>,
    /// Whether the type admits `null`
    pub nullable: bool,
}

/// One type argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoTypeArgument {
    /// Use-site projection
    pub projection: ProtoProjection,
    /// Argument type; absent for star projections
    pub ty: Option<ProtoType>,
}

/// A type parameter declaration
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoTypeParameter {
    /// Id used by [`ProtoTypeConstructor`] references
    pub id: u32,
    /// String index of the name
    pub name: u32,
    /// Whether the parameter is reified
    pub reified: bool,
    /// Declaration-site variance
    pub variance: ProtoVariance,
    /// Upper bounds; empty means the default bound
    pub upper_bounds: Vec<ProtoType>,
}

/// Compile-time constant used as an annotation argument
#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub enum ProtoConstant {
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// String literal (string index)
    String(u32),
    /// Class literal (qualified-name index)
    Class(u32),
}

/// A named annotation argument
#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct ProtoAnnotationArgument {
    /// String index of the parameter name
    pub name: u32,
    /// Argument value
    pub value: ProtoConstant,
}

/// An annotation application
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoAnnotation {
    /// Qualified-name index of the annotation class
    pub id: u32,
    /// Arguments in source order
    pub arguments: Vec<ProtoAnnotationArgument>,
}

/// A value parameter of a function or constructor
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoValueParameter {
    /// [`crate::ParameterFlags`] word
    pub flags: u32,
    /// String index of the name
    pub name: u32,
    /// Declared type (the array type for varargs)
    pub ty: ProtoType,
    /// Element type when the parameter is `vararg`
    pub vararg_element_type: Option<ProtoType>,
    /// Annotations, read only when the has-annotations flag is set
    pub annotations: Vec<ProtoAnnotation>,
}

/// A function, property or constructor
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoCallable {
    /// [`crate::CallableFlags`] word
    pub flags: u32,
    /// String index of the name (ignored for constructors)
    pub name: u32,
    /// Own type parameters
    pub type_parameters: Vec<ProtoTypeParameter>,
    /// Extension receiver type
    pub receiver_type: Option<ProtoType>,
    /// Value parameters; always empty for properties
    pub value_parameters: Vec<ProtoValueParameter>,
    /// Return type (property type for properties)
    pub return_type: ProtoType,
    /// Annotations, read only when the has-annotations flag is set
    pub annotations: Vec<ProtoAnnotation>,
}

/// Marker for a primary constructor
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoPrimaryConstructor {
    /// Full constructor; absent for the implicit constructor of objects
    pub data: Option<ProtoCallable>,
}

/// Marker for a class object
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoClassObject {
    /// Inline class data; present for objects and enum entries
    pub data: Option<Box<ProtoClass>>,
}

/// An entry of an enum class
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoEnumEntry {
    /// String index of the entry name
    pub name: u32,
    /// Inline class data for trivial entries; otherwise the entry is a
    /// nested class found through the descriptor finder
    pub data: Option<ProtoClass>,
}

/// A class, interface, object, enum or annotation class
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoClass {
    /// [`crate::ClassFlags`] word
    pub flags: u32,
    /// Qualified-name index of the class
    pub fq_name: u32,
    /// Type parameters
    pub type_parameters: Vec<ProtoTypeParameter>,
    /// Direct supertypes
    pub supertypes: Vec<ProtoType>,
    /// Declared functions and properties
    pub members: Vec<ProtoCallable>,
    /// String indices of nested class names
    pub nested_class_names: Vec<u32>,
    /// Enum entries in declaration order
    pub enum_entries: Vec<ProtoEnumEntry>,
    /// Primary constructor marker
    pub primary_constructor: Option<ProtoPrimaryConstructor>,
    /// Class object marker
    pub class_object: Option<ProtoClassObject>,
    /// Annotations, read only when the has-annotations flag is set
    pub annotations: Vec<ProtoAnnotation>,
}

/// Top-level callables of one package
#[derive(Debug, Clone, PartialEq, Eq, Default, bincode::Encode, bincode::Decode)]
pub struct ProtoPackage {
    /// Declared functions and properties
    pub members: Vec<ProtoCallable>,
}
