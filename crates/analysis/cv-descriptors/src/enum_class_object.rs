//! The class object every enum class gets from the compiler
//!
//! It is never serialized. Its scope holds exactly two functions:
//!
//! ```text
//! fun values(): Array<E>
//! fun valueOf(value: String): E
//! ```

use crate::class::{ClassDescriptor, ClassDescriptorId};
use crate::descriptors::{
    CallableDescriptor, CallableKind, Callables, DeclarationRef, MemberKind, Modality, ValueParameter,
    Visibility,
};
use crate::member_deserializer::object_constructor;
use crate::session::ModuleSession;
use crate::types::{Ty, TypeProjection};
use cv_ids::{ClassId, FqName, Name};
use std::sync::Arc;

/// State of a synthesized enum class object
pub struct EnumClassObject {
    enum_class: ClassDescriptorId,
    constructor: Arc<CallableDescriptor>,
    values: Arc<CallableDescriptor>,
    value_of: Arc<CallableDescriptor>,
}

impl EnumClassObject {
    pub(crate) fn new(
        session: &ModuleSession,
        id: ClassDescriptorId,
        class_id: &ClassId,
        enum_class: &ClassDescriptor,
    ) -> Self {
        let interner = session.interner();
        let builtins = FqName::parse(&session.config().builtins_package, interner);
        let builtin = |name: &str| ClassId::top_level(builtins.clone(), interner.intern(name));
        let container = DeclarationRef::Class(id);
        let enum_type = enum_class.default_type();
        let synthesized = |name: Name, value_parameters: Vec<ValueParameter>, return_type: Ty| {
            Arc::new(CallableDescriptor {
                name,
                kind: CallableKind::Function,
                member_kind: MemberKind::Synthesized,
                modality: Modality::Final,
                visibility: Visibility::Public,
                container,
                type_parameters: Vec::new(),
                receiver_type: None,
                value_parameters,
                return_type,
                annotations: Vec::new(),
                overridden: Vec::new(),
                original: None,
            })
        };
        let values = synthesized(
            interner.intern("values"),
            Vec::new(),
            Ty::class(builtin("Array"), vec![TypeProjection::invariant(enum_type.clone())]),
        );
        let value_of = synthesized(
            interner.intern("valueOf"),
            vec![ValueParameter {
                name: interner.intern("value"),
                index: 0,
                ty: Ty::class(builtin("String"), Vec::new()),
                vararg_element_type: None,
                declares_default_value: false,
                annotations: Vec::new(),
            }],
            enum_type,
        );
        Self {
            enum_class: enum_class.id(),
            constructor: Arc::new(object_constructor(
                session,
                container,
                Ty::class(class_id.clone(), Vec::new()),
            )),
            values,
            value_of,
        }
    }

    /// The enum class owning this class object
    #[must_use]
    pub fn enum_class(&self) -> ClassDescriptorId {
        self.enum_class
    }

    /// The private zero-argument constructor
    #[must_use]
    pub fn constructor(&self) -> &Arc<CallableDescriptor> {
        &self.constructor
    }

    /// `values()` and `valueOf(value)`
    #[must_use]
    pub fn functions(&self) -> [&Arc<CallableDescriptor>; 2] {
        [&self.values, &self.value_of]
    }

    pub(crate) fn functions_named(&self, name: Name) -> Callables {
        self.functions()
            .into_iter()
            .filter(|function| function.name == name)
            .map(Arc::clone)
            .collect()
    }
}
