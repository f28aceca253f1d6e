//! Declarative builders for serialized entries
//!
//! Fixtures describe classes with strings (`"a/Outer.Inner"`) and the
//! builders intern them into the entry's name table when encoding.

use cv_proto::{
    CallableFlags, ClassData, ClassFlags, NameTableBuilder, PackageData, ParameterFlags, ProtoAnnotation,
    ProtoCallable, ProtoCallableKind, ProtoClass, ProtoClassKind, ProtoClassObject, ProtoConstructorKind,
    ProtoEnumEntry, ProtoMemberKind, ProtoModality, ProtoPackage, ProtoPrimaryConstructor, ProtoProjection,
    ProtoType, ProtoTypeArgument, ProtoTypeConstructor, ProtoTypeParameter, ProtoValueParameter,
    ProtoVisibility,
};

/// A type reference
#[derive(Debug, Clone)]
pub struct TypeSpec {
    constructor: TypeConstructorSpec,
    arguments: Vec<Option<TypeSpec>>,
    nullable: bool,
}

#[derive(Debug, Clone)]
enum TypeConstructorSpec {
    Class(String),
    Parameter(u32),
}

/// Non-null class type `pkg/Name`
#[must_use]
pub fn class_type(class_id: &str) -> TypeSpec {
    TypeSpec {
        constructor: TypeConstructorSpec::Class(class_id.to_owned()),
        arguments: Vec::new(),
        nullable: false,
    }
}

/// Non-null reference to the type parameter `id`
#[must_use]
pub fn parameter_type(id: u32) -> TypeSpec {
    TypeSpec {
        constructor: TypeConstructorSpec::Parameter(id),
        arguments: Vec::new(),
        nullable: false,
    }
}

impl TypeSpec {
    /// Adds an invariant argument
    #[must_use]
    pub fn argument(mut self, argument: TypeSpec) -> Self {
        self.arguments.push(Some(argument));
        self
    }

    /// Adds a star projection
    #[must_use]
    pub fn star(mut self) -> Self {
        self.arguments.push(None);
        self
    }

    /// Makes the type nullable
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn encode(&self, names: &mut NameTableBuilder) -> ProtoType {
        let constructor = match &self.constructor {
            TypeConstructorSpec::Class(class_id) => ProtoTypeConstructor {
                kind: ProtoConstructorKind::Class,
                id: names.class(class_id),
            },
            TypeConstructorSpec::Parameter(id) => ProtoTypeConstructor {
                kind: ProtoConstructorKind::TypeParameter,
                id: *id,
            },
        };
        ProtoType {
            constructor,
            arguments: self
                .arguments
                .iter()
                .map(|argument| match argument {
                    Some(ty) => ProtoTypeArgument {
                        projection: ProtoProjection::Inv,
                        ty: Some(ty.encode(names)),
                    },
                    None => ProtoTypeArgument {
                        projection: ProtoProjection::Star,
                        ty: None,
                    },
                })
                .collect(),
            nullable: self.nullable,
        }
    }
}

fn encode_type_parameters(parameters: &[(u32, String)], names: &mut NameTableBuilder) -> Vec<ProtoTypeParameter> {
    parameters
        .iter()
        .map(|(id, name)| ProtoTypeParameter {
            id: *id,
            name: names.name(name),
            ..ProtoTypeParameter::default()
        })
        .collect()
}

/// A function, property or constructor
#[derive(Debug, Clone)]
pub struct MemberSpec {
    kind: ProtoCallableKind,
    name: String,
    visibility: ProtoVisibility,
    modality: ProtoModality,
    member_kind: ProtoMemberKind,
    type_parameters: Vec<(u32, String)>,
    receiver: Option<TypeSpec>,
    parameters: Vec<(String, TypeSpec, bool)>,
    return_type: TypeSpec,
    annotations: Vec<String>,
}

impl MemberSpec {
    fn new(kind: ProtoCallableKind, name: &str, return_type: TypeSpec) -> Self {
        Self {
            kind,
            name: name.to_owned(),
            visibility: ProtoVisibility::Public,
            modality: ProtoModality::Final,
            member_kind: ProtoMemberKind::Declaration,
            type_parameters: Vec::new(),
            receiver: None,
            parameters: Vec::new(),
            return_type,
            annotations: Vec::new(),
        }
    }

    /// Public final function
    #[must_use]
    pub fn function(name: &str, return_type: TypeSpec) -> Self {
        Self::new(ProtoCallableKind::Fun, name, return_type)
    }

    /// Public final read-only property
    #[must_use]
    pub fn property(name: &str, ty: TypeSpec) -> Self {
        Self::new(ProtoCallableKind::Val, name, ty)
    }

    /// Public constructor
    #[must_use]
    pub fn constructor(return_type: TypeSpec) -> Self {
        Self::new(ProtoCallableKind::Constructor, "", return_type)
    }

    /// Sets the visibility
    #[must_use]
    pub fn visibility(mut self, visibility: ProtoVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets the modality
    #[must_use]
    pub fn modality(mut self, modality: ProtoModality) -> Self {
        self.modality = modality;
        self
    }

    /// Declares an own type parameter
    #[must_use]
    pub fn type_parameter(mut self, id: u32, name: &str) -> Self {
        self.type_parameters.push((id, name.to_owned()));
        self
    }

    /// Sets the extension receiver
    #[must_use]
    pub fn receiver(mut self, ty: TypeSpec) -> Self {
        self.receiver = Some(ty);
        self
    }

    /// Adds a value parameter
    #[must_use]
    pub fn parameter(mut self, name: &str, ty: TypeSpec) -> Self {
        self.parameters.push((name.to_owned(), ty, false));
        self
    }

    /// Adds a value parameter with a default value
    #[must_use]
    pub fn default_parameter(mut self, name: &str, ty: TypeSpec) -> Self {
        self.parameters.push((name.to_owned(), ty, true));
        self
    }

    /// Annotates the member with the annotation class `class_id`
    #[must_use]
    pub fn annotation(mut self, class_id: &str) -> Self {
        self.annotations.push(class_id.to_owned());
        self
    }

    fn encode(&self, names: &mut NameTableBuilder) -> ProtoCallable {
        ProtoCallable {
            flags: CallableFlags {
                has_annotations: !self.annotations.is_empty(),
                visibility: self.visibility,
                modality: self.modality,
                callable_kind: self.kind,
                member_kind: self.member_kind,
            }
            .encode(),
            name: names.name(&self.name),
            type_parameters: encode_type_parameters(&self.type_parameters, names),
            receiver_type: self.receiver.as_ref().map(|ty| ty.encode(names)),
            value_parameters: self
                .parameters
                .iter()
                .map(|(name, ty, declares_default_value)| ProtoValueParameter {
                    flags: ParameterFlags {
                        has_annotations: false,
                        declares_default_value: *declares_default_value,
                    }
                    .encode(),
                    name: names.name(name),
                    ty: ty.encode(names),
                    ..ProtoValueParameter::default()
                })
                .collect(),
            return_type: self.return_type.encode(names),
            annotations: encode_annotations(&self.annotations, names),
        }
    }
}

fn encode_annotations(annotations: &[String], names: &mut NameTableBuilder) -> Vec<ProtoAnnotation> {
    annotations
        .iter()
        .map(|class_id| ProtoAnnotation {
            id: names.class(class_id),
            arguments: Vec::new(),
        })
        .collect()
}

/// A class entry
#[derive(Debug, Clone)]
pub struct ClassSpec {
    class_id: String,
    kind: ProtoClassKind,
    visibility: ProtoVisibility,
    modality: ProtoModality,
    inner: bool,
    type_parameters: Vec<(u32, String)>,
    supertypes: Vec<TypeSpec>,
    members: Vec<MemberSpec>,
    nested: Vec<String>,
    enum_entries: Vec<(String, Option<ClassSpec>)>,
    primary_constructor: Option<Option<MemberSpec>>,
    class_object: Option<Option<Box<ClassSpec>>>,
    annotations: Vec<String>,
}

impl ClassSpec {
    /// A public final entry of `kind` for `class_id` (`pkg/Outer.Inner`)
    #[must_use]
    pub fn new(class_id: &str, kind: ProtoClassKind) -> Self {
        Self {
            class_id: class_id.to_owned(),
            kind,
            visibility: ProtoVisibility::Public,
            modality: ProtoModality::Final,
            inner: false,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            members: Vec::new(),
            nested: Vec::new(),
            enum_entries: Vec::new(),
            primary_constructor: None,
            class_object: None,
            annotations: Vec::new(),
        }
    }

    /// Class id this entry describes
    #[must_use]
    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    /// Sets the visibility
    #[must_use]
    pub fn visibility(mut self, visibility: ProtoVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets the modality
    #[must_use]
    pub fn modality(mut self, modality: ProtoModality) -> Self {
        self.modality = modality;
        self
    }

    /// Marks the class as inner
    #[must_use]
    pub fn inner(mut self) -> Self {
        self.inner = true;
        self
    }

    /// Declares a type parameter
    #[must_use]
    pub fn type_parameter(mut self, id: u32, name: &str) -> Self {
        self.type_parameters.push((id, name.to_owned()));
        self
    }

    /// Adds a direct supertype
    #[must_use]
    pub fn supertype(mut self, ty: TypeSpec) -> Self {
        self.supertypes.push(ty);
        self
    }

    /// Adds a declared member
    #[must_use]
    pub fn member(mut self, member: MemberSpec) -> Self {
        self.members.push(member);
        self
    }

    /// Lists a nested class name
    #[must_use]
    pub fn nested(mut self, name: &str) -> Self {
        self.nested.push(name.to_owned());
        self
    }

    /// Adds an enum entry stored as its own class entry
    #[must_use]
    pub fn enum_entry(mut self, name: &str) -> Self {
        self.enum_entries.push((name.to_owned(), None));
        self
    }

    /// Adds an enum entry whose class payload is stored inline
    #[must_use]
    pub fn inline_enum_entry(mut self, name: &str, payload: ClassSpec) -> Self {
        self.enum_entries.push((name.to_owned(), Some(payload)));
        self
    }

    /// Declares the implicit primary constructor
    #[must_use]
    pub fn implicit_constructor(mut self) -> Self {
        self.primary_constructor = Some(None);
        self
    }

    /// Declares a primary constructor
    #[must_use]
    pub fn primary_constructor(mut self, constructor: MemberSpec) -> Self {
        self.primary_constructor = Some(Some(constructor));
        self
    }

    /// Declares a class object without inline data
    #[must_use]
    pub fn class_object_marker(mut self) -> Self {
        self.class_object = Some(None);
        self
    }

    /// Declares a class object stored inline
    #[must_use]
    pub fn inline_class_object(mut self, payload: ClassSpec) -> Self {
        self.class_object = Some(Some(Box::new(payload)));
        self
    }

    /// Annotates the class with the annotation class `class_id`
    #[must_use]
    pub fn annotation(mut self, class_id: &str) -> Self {
        self.annotations.push(class_id.to_owned());
        self
    }

    /// Encodes the entry with its own name table
    #[must_use]
    pub fn build(&self) -> ClassData {
        let mut names = NameTableBuilder::new();
        let class = self.encode(&mut names);
        ClassData {
            names: names.build(),
            class,
        }
    }

    fn encode(&self, names: &mut NameTableBuilder) -> ProtoClass {
        ProtoClass {
            flags: ClassFlags {
                has_annotations: !self.annotations.is_empty(),
                visibility: self.visibility,
                modality: self.modality,
                kind: self.kind,
                inner: self.inner,
            }
            .encode(),
            fq_name: names.class(&self.class_id),
            type_parameters: encode_type_parameters(&self.type_parameters, names),
            supertypes: self.supertypes.iter().map(|ty| ty.encode(names)).collect(),
            members: self.members.iter().map(|member| member.encode(names)).collect(),
            nested_class_names: self.nested.iter().map(|name| names.name(name)).collect(),
            enum_entries: self
                .enum_entries
                .iter()
                .map(|(name, payload)| ProtoEnumEntry {
                    name: names.name(name),
                    data: payload.as_ref().map(|class| class.encode(names)),
                })
                .collect(),
            primary_constructor: self.primary_constructor.as_ref().map(|constructor| {
                ProtoPrimaryConstructor {
                    data: constructor.as_ref().map(|member| member.encode(names)),
                }
            }),
            class_object: self.class_object.as_ref().map(|payload| ProtoClassObject {
                data: payload.as_ref().map(|class| Box::new(class.encode(names))),
            }),
            annotations: encode_annotations(&self.annotations, names),
        }
    }
}

/// Top-level callables of a package
#[derive(Debug, Clone, Default)]
pub struct PackageSpec {
    members: Vec<MemberSpec>,
}

impl PackageSpec {
    /// An empty package entry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level member
    #[must_use]
    pub fn member(mut self, member: MemberSpec) -> Self {
        self.members.push(member);
        self
    }

    /// Encodes the entry with its own name table
    #[must_use]
    pub fn build(&self) -> PackageData {
        let mut names = NameTableBuilder::new();
        let members = self.members.iter().map(|member| member.encode(&mut names)).collect();
        PackageData {
            names: names.build(),
            package: ProtoPackage { members },
        }
    }
}
