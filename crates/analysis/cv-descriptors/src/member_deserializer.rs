//! Serialized functions, properties and constructors to [`CallableDescriptor`]s

use crate::descriptors::{
    CallableDescriptor, CallableKind, DeclarationRef, MemberKind, Modality, ValueParameter, Visibility,
};
use crate::error::DeserializationError;
use crate::session::ModuleSession;
use crate::type_deserializer::TypeDeserializer;
use crate::types::Ty;
use cv_proto::{CallableFlags, ParameterFlags, ProtoCallable, ProtoCallableKind, ProtoValueParameter};

/// Name given to every constructor
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Builds member descriptors for one container
pub struct MemberDeserializer<'ctx> {
    session: &'ctx ModuleSession,
    types: &'ctx TypeDeserializer<'ctx>,
    container: DeclarationRef,
}

impl<'ctx> MemberDeserializer<'ctx> {
    /// A deserializer for members of `container` with `types` in scope
    #[must_use]
    pub fn new(
        session: &'ctx ModuleSession,
        types: &'ctx TypeDeserializer<'ctx>,
        container: DeclarationRef,
    ) -> Self {
        Self {
            session,
            types,
            container,
        }
    }

    /// Deserializes a function or property
    ///
    /// # Errors
    ///
    /// Returns [`DeserializationError::UnexpectedCallableKind`] for constructors,
    /// and fails on malformed flags or name indices.
    pub fn callable(&self, proto: &ProtoCallable) -> Result<CallableDescriptor, DeserializationError> {
        let flags = CallableFlags::decode(proto.flags)?;
        let kind = match flags.callable_kind {
            ProtoCallableKind::Fun => CallableKind::Function,
            ProtoCallableKind::Val => CallableKind::Property { mutable: false },
            ProtoCallableKind::Var => CallableKind::Property { mutable: true },
            ProtoCallableKind::Constructor => {
                return Err(DeserializationError::UnexpectedCallableKind {
                    expected: "a function or property",
                    found: flags.callable_kind,
                });
            }
        };
        self.build(proto, flags, kind)
    }

    /// Deserializes a constructor
    ///
    /// # Errors
    ///
    /// Returns [`DeserializationError::UnexpectedCallableKind`] if `proto` is
    /// not a constructor, and fails on malformed flags or name indices.
    pub fn constructor(
        &self,
        proto: &ProtoCallable,
        primary: bool,
    ) -> Result<CallableDescriptor, DeserializationError> {
        let flags = CallableFlags::decode(proto.flags)?;
        if flags.callable_kind != ProtoCallableKind::Constructor {
            return Err(DeserializationError::UnexpectedCallableKind {
                expected: "a constructor",
                found: flags.callable_kind,
            });
        }
        self.build(proto, flags, CallableKind::Constructor { primary })
    }

    fn build(
        &self,
        proto: &ProtoCallable,
        flags: CallableFlags,
        kind: CallableKind,
    ) -> Result<CallableDescriptor, DeserializationError> {
        let resolver = self.types.resolver();
        let (context, type_parameters) = self.types.child(&proto.type_parameters)?;
        let name = match kind {
            CallableKind::Constructor { .. } => self.session.interner().intern(CONSTRUCTOR_NAME),
            CallableKind::Function | CallableKind::Property { .. } => resolver.name(proto.name)?,
        };
        let annotations = if flags.has_annotations {
            self.session
                .annotation_deserializer()
                .load_callable_annotations(proto, resolver)?
        } else {
            Vec::new()
        };
        let value_parameters = proto
            .value_parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| self.value_parameter(&context, index, parameter))
            .collect::<Result<_, _>>()?;
        Ok(CallableDescriptor {
            name,
            kind,
            member_kind: flags.member_kind.into(),
            modality: flags.modality.into(),
            visibility: flags.visibility.into(),
            container: self.container,
            type_parameters,
            receiver_type: proto
                .receiver_type
                .as_ref()
                .map(|ty| context.ty(ty))
                .transpose()?,
            value_parameters,
            return_type: context.ty(&proto.return_type)?,
            annotations,
            overridden: Vec::new(),
            original: None,
        })
    }

    fn value_parameter(
        &self,
        context: &TypeDeserializer<'_>,
        index: usize,
        proto: &ProtoValueParameter,
    ) -> Result<ValueParameter, DeserializationError> {
        let flags = ParameterFlags::decode(proto.flags);
        let resolver = context.resolver();
        let annotations = if flags.has_annotations {
            self.session
                .annotation_deserializer()
                .load_parameter_annotations(proto, resolver)?
        } else {
            Vec::new()
        };
        Ok(ValueParameter {
            name: resolver.name(proto.name)?,
            index,
            ty: context.ty(&proto.ty)?,
            vararg_element_type: proto
                .vararg_element_type
                .as_ref()
                .map(|ty| context.ty(ty))
                .transpose()?,
            declares_default_value: flags.declares_default_value,
            annotations,
        })
    }
}

/// Zero-argument constructor the compiler generates for singletons
///
/// Always private: nothing outside the singleton may instantiate it.
pub(crate) fn object_constructor(
    session: &ModuleSession,
    container: DeclarationRef,
    return_type: Ty,
) -> CallableDescriptor {
    CallableDescriptor {
        name: session.interner().intern(CONSTRUCTOR_NAME),
        kind: CallableKind::Constructor { primary: true },
        member_kind: MemberKind::Synthesized,
        modality: Modality::Final,
        visibility: Visibility::Private,
        container,
        type_parameters: Vec::new(),
        receiver_type: None,
        value_parameters: Vec::new(),
        return_type,
        annotations: Vec::new(),
        overridden: Vec::new(),
        original: None,
    }
}
