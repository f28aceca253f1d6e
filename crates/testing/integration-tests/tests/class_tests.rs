//! Class descriptor accessors over encoded entries

use anyhow::Result;
use cv_descriptors::{
    Annotation, AnnotationDeserializer, CallableKind, ClassKind, DeclarationRef, DeserializationError,
    MemberKind, ModuleSession, ProtoAnnotationDeserializer, Visibility, labels, render_class,
};
use cv_proto::{NameResolver, ProtoCallable, ProtoClass, ProtoClassKind, ProtoValueParameter, ProtoVisibility};
use expect_test::{Expect, expect};
use integration_tests::builder::{ClassSpec, MemberSpec, class_type, parameter_type};
use integration_tests::{Fixture, class};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn check(session: &ModuleSession, class_id: &cv_ids::ClassId, expect: Expect) {
    let id = class(session, class_id).unwrap();
    expect.assert_eq(&render_class(session, id).unwrap());
}

#[test]
fn test_class_with_one_property() -> Result<()> {
    let mut fixture = Fixture::new();
    let point = fixture.add_class(
        &ClassSpec::new("test/Point", ProtoClassKind::Class)
            .primary_constructor(
                MemberSpec::constructor(class_type("test/Point")).parameter("x", class_type("jet/Int")),
            )
            .member(MemberSpec::property("x", class_type("jet/Int"))),
    )?;
    let session = fixture.session();

    let descriptor = session.class(class(&session, &point)?);
    assert_eq!(descriptor.kind(), ClassKind::Class);
    assert!(descriptor.is_final());
    assert!(descriptor.supertypes(&session)?.is_empty());
    assert_eq!(descriptor.class_object(&session)?, None);
    assert!(descriptor.nested_classes(&session)?.is_empty());

    let x_name = session.interner().intern("x");
    let properties = descriptor.member_scope().properties(&session, x_name)?;
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].container, DeclarationRef::Class(descriptor.id()));
    assert!(descriptor.member_scope().functions(&session, x_name)?.is_empty());

    check(
        &session,
        &point,
        expect![[r#"
            public final class test/Point
              public final constructor <init>(x: jet/Int): test/Point
              public final val x: jet/Int"#]],
    );
    Ok(())
}

#[test]
fn test_object_gets_a_synthesized_constructor() -> Result<()> {
    let mut fixture = Fixture::new();
    let config = fixture.add_class(
        &ClassSpec::new("a/Config", ProtoClassKind::Object)
            .visibility(ProtoVisibility::Internal)
            .implicit_constructor(),
    )?;
    let session = fixture.session();

    let descriptor = session.class(class(&session, &config)?);
    let constructors = descriptor.constructors(&session)?;
    assert_eq!(constructors.len(), 1);
    let constructor = &constructors[0];
    assert_eq!(constructor.kind, CallableKind::Constructor { primary: true });
    assert_eq!(constructor.member_kind, MemberKind::Synthesized);
    assert_eq!(descriptor.visibility(), Visibility::Internal);
    assert_eq!(constructor.visibility, Visibility::Private);
    assert!(constructor.value_parameters.is_empty());
    assert_eq!(constructor.return_type, descriptor.default_type());
    assert!(Arc::ptr_eq(
        constructor,
        &descriptor.primary_constructor(&session)?.unwrap()
    ));
    assert_eq!(session.storage().computations(labels::PRIMARY_CONSTRUCTOR), 1);
    Ok(())
}

#[test]
fn test_object_class_object_without_payload() -> Result<()> {
    let mut fixture = Fixture::new();
    let broken = fixture.add_class(&ClassSpec::new("a/Broken", ProtoClassKind::Object).class_object_marker())?;
    let session = fixture.session();

    let descriptor = session.class(class(&session, &broken)?);
    let expected = DeserializationError::MissingClassObjectData {
        class: "a/Broken".to_owned(),
    };
    assert_eq!(descriptor.class_object(&session), Err(expected.clone()));
    assert_eq!(descriptor.class_object(&session), Err(expected));
    assert_eq!(session.storage().computations(labels::CLASS_OBJECT), 1);
    Ok(())
}

#[test]
fn test_inline_payload_of_the_wrong_kind() -> Result<()> {
    let mut fixture = Fixture::new();
    let mode = fixture.add_class(
        &ClassSpec::new("a/Mode", ProtoClassKind::EnumClass)
            .inline_enum_entry("ON", ClassSpec::new("a/Mode.ON", ProtoClassKind::Class)),
    )?;
    let session = fixture.session();

    let descriptor = session.class(class(&session, &mode)?);
    assert_eq!(
        descriptor.enum_entries(&session),
        Err(DeserializationError::UnsupportedClassKind {
            class: "a/Mode.ON".to_owned(),
            kind: ProtoClassKind::Class,
        })
    );
    Ok(())
}

#[test]
fn test_nested_classes_in_declaration_order() -> Result<()> {
    let mut fixture = Fixture::new();
    let outer = fixture.add_class(
        &ClassSpec::new("a/Outer", ProtoClassKind::Class)
            .nested("Second")
            .nested("Absent")
            .nested("First"),
    )?;
    let second = fixture.add_class(&ClassSpec::new("a/Outer.Second", ProtoClassKind::Class).inner())?;
    let first = fixture.add_class(&ClassSpec::new("a/Outer.First", ProtoClassKind::Trait))?;
    let session = fixture.session();

    let descriptor = session.class(class(&session, &outer)?);
    let second = class(&session, &second)?;
    let first = class(&session, &first)?;
    assert_eq!(descriptor.nested_classes(&session)?, [second, first]);
    assert!(session.class(second).is_inner());
    assert_eq!(session.class(first).kind(), ClassKind::Trait);
    assert_eq!(
        descriptor.member_scope().classifier(&session, session.interner().intern("First"))?,
        Some(cv_descriptors::DeclarationDescriptor::Class(first))
    );
    assert_eq!(
        session.class(second).containing_declaration(&session)?,
        DeclarationRef::Class(descriptor.id())
    );
    Ok(())
}

#[test]
fn test_generic_class_default_type() -> Result<()> {
    let mut fixture = Fixture::new();
    let boxed = fixture.add_class(
        &ClassSpec::new("a/Box", ProtoClassKind::Class)
            .type_parameter(0, "T")
            .member(MemberSpec::function("get", parameter_type(0)))
            .member(
                MemberSpec::function("map", class_type("a/Box").argument(parameter_type(1)))
                    .type_parameter(1, "R")
                    .parameter("item", parameter_type(0).nullable()),
            ),
    )?;
    let session = fixture.session();

    let descriptor = session.class(class(&session, &boxed)?);
    assert_eq!(descriptor.default_type().render(session.interner()), "a/Box<T>");
    let receiver = descriptor.member_scope().implicit_receiver(&session).unwrap();
    assert_eq!(receiver, descriptor.this_receiver());

    check(
        &session,
        &boxed,
        expect![[r#"
            public final class a/Box<T>
              public final fun get(): T
              public final fun <R> map(item: T?): a/Box<R>"#]],
    );
    Ok(())
}

struct CountingAnnotations {
    inner: ProtoAnnotationDeserializer,
    calls: AtomicUsize,
}

impl AnnotationDeserializer for CountingAnnotations {
    fn load_class_annotations(
        &self,
        class: &ProtoClass,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load_class_annotations(class, resolver)
    }

    fn load_callable_annotations(
        &self,
        callable: &ProtoCallable,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load_callable_annotations(callable, resolver)
    }

    fn load_parameter_annotations(
        &self,
        parameter: &ProtoValueParameter,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Annotation>, DeserializationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load_parameter_annotations(parameter, resolver)
    }
}

#[test]
fn test_annotations_are_read_only_when_flagged() -> Result<()> {
    let mut fixture = Fixture::new();
    let plain = fixture.add_class(
        &ClassSpec::new("a/Plain", ProtoClassKind::Class)
            .member(MemberSpec::function("run", class_type("jet/Unit"))),
    )?;
    let marked = fixture.add_class(
        &ClassSpec::new("a/Marked", ProtoClassKind::Class)
            .annotation("jet/deprecated")
            .member(MemberSpec::function("run", class_type("jet/Unit")).annotation("jet/inline")),
    )?;
    let interner = fixture.interner.clone();
    let annotations = Arc::new(CountingAnnotations {
        inner: ProtoAnnotationDeserializer::new(interner.clone()),
        calls: AtomicUsize::new(0),
    });
    let session = fixture
        .session()
        .with_annotation_deserializer(Arc::clone(&annotations) as Arc<dyn AnnotationDeserializer>);
    let run = interner.intern("run");

    let plain = session.class(class(&session, &plain)?);
    assert!(plain.annotations(&session)?.is_empty());
    assert!(plain.member_scope().functions(&session, run)?[0].annotations.is_empty());
    assert_eq!(annotations.calls.load(Ordering::SeqCst), 0);

    let marked = session.class(class(&session, &marked)?);
    let class_annotations = marked.annotations(&session)?;
    assert_eq!(class_annotations.len(), 1);
    assert_eq!(class_annotations[0].ty.render(&interner), "jet/deprecated");
    let functions = marked.member_scope().functions(&session, run)?;
    assert_eq!(functions[0].annotations[0].ty.render(&interner), "jet/inline");
    assert_eq!(annotations.calls.load(Ordering::SeqCst), 2);
    Ok(())
}
