//! Loading annotations of deserialized declarations

use crate::descriptors::{Annotation, ConstantValue};
use crate::error::DeserializationError;
use crate::types::Ty;
use cv_intern::Interner;
use cv_proto::{NameResolver, ProtoAnnotation, ProtoCallable, ProtoClass, ProtoConstant, ProtoValueParameter};

/// Source of annotations for deserialized declarations
///
/// Only consulted for entries whose has-annotations flag is set; entries
/// without the flag have no annotations.
pub trait AnnotationDeserializer: Send + Sync {
    /// Annotations on a class
    ///
    /// # Errors
    ///
    /// Fails if the annotations cannot be read.
    fn load_class_annotations(
        &self,
        class: &ProtoClass,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError>;

    /// Annotations on a function, property or constructor
    ///
    /// # Errors
    ///
    /// Fails if the annotations cannot be read.
    fn load_callable_annotations(
        &self,
        callable: &ProtoCallable,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError>;

    /// Annotations on a value parameter
    ///
    /// # Errors
    ///
    /// Fails if the annotations cannot be read.
    fn load_parameter_annotations(
        &self,
        parameter: &ProtoValueParameter,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError>;
}

/// Reads the annotations stored inline in the serialized entries
#[derive(Debug, Clone)]
pub struct ProtoAnnotationDeserializer {
    interner: Interner,
}

impl ProtoAnnotationDeserializer {
    /// Creates a deserializer resolving string constants through `interner`
    #[must_use]
    pub fn new(interner: Interner) -> Self {
        Self { interner }
    }

    fn load(
        &self,
        annotations: &[ProtoAnnotation],
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError> {
        annotations
            .iter()
            .map(|annotation| -> Result<_, DeserializationError> {
                let arguments = annotation
                    .arguments
                    .iter()
                    .map(|argument| -> Result<_, DeserializationError> {
                        let value = match argument.value {
                            ProtoConstant::Bool(value) => ConstantValue::Bool(value),
                            ProtoConstant::Int(value) => ConstantValue::Int(value),
                            ProtoConstant::String(index) => {
                                ConstantValue::String(self.interner.resolve(&resolver.name(index)?))
                            }
                            ProtoConstant::Class(index) => ConstantValue::Class(resolver.class_id(index)?),
                        };
                        Ok((resolver.name(argument.name)?, value))
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Annotation {
                    ty: Ty::class(resolver.class_id(annotation.id)?, Vec::new()),
                    arguments,
                })
            })
            .collect()
    }
}

impl AnnotationDeserializer for ProtoAnnotationDeserializer {
    fn load_class_annotations(
        &self,
        class: &ProtoClass,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError> {
        self.load(&class.annotations, resolver)
    }

    fn load_callable_annotations(
        &self,
        callable: &ProtoCallable,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError> {
        self.load(&callable.annotations, resolver)
    }

    fn load_parameter_annotations(
        &self,
        parameter: &ProtoValueParameter,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError> {
        self.load(&parameter.annotations, resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_proto::{NameTableBuilder, ProtoAnnotationArgument, TableNameResolver};
    use std::sync::Arc;

    #[test]
    fn test_reads_constant_arguments() {
        let mut names = NameTableBuilder::new();
        let deprecated = names.class("jet/deprecated");
        let message = names.name("message");
        let text = names.name("use other");
        let class = ProtoClass {
            annotations: vec![ProtoAnnotation {
                id: deprecated,
                arguments: vec![ProtoAnnotationArgument {
                    name: message,
                    value: ProtoConstant::String(text),
                }],
            }],
            ..ProtoClass::default()
        };
        let interner = Interner::new();
        let resolver = TableNameResolver::new(Arc::new(names.build()), interner.clone());

        let annotations = ProtoAnnotationDeserializer::new(interner.clone())
            .load_class_annotations(&class, &resolver)
            .unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].ty.render(&interner), "jet/deprecated");
        assert_eq!(
            annotations[0].arguments,
            [(interner.intern("message"), ConstantValue::String("use other".to_owned()))]
        );
    }
}
