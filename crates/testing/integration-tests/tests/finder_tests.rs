//! Finder lookups: caching, the class-object convention and containers

use anyhow::Result;
use cv_descriptors::{DeclarationRef, DeserializationError, labels};
use cv_ids::class_object_name;
use cv_proto::ProtoClassKind;
use cv_storage::StorageError;
use integration_tests::builder::ClassSpec;
use integration_tests::{Fixture, class};
use std::sync::Arc;

#[test]
fn test_find_class_returns_the_same_descriptor() -> Result<()> {
    let mut fixture = Fixture::new();
    let foo = fixture.add_class(&ClassSpec::new("a/Foo", ProtoClassKind::Class))?;
    let session = fixture.session();

    let first = class(&session, &foo)?;
    let second = class(&session, &foo)?;
    assert_eq!(first, second);
    assert!(Arc::ptr_eq(&session.class(first), &session.class(second)));
    assert_eq!(session.class_count(), 1);
    assert_eq!(session.storage().computations(labels::FIND_CLASS), 1);
    assert_eq!(session.class(first).to_string(), "deserialized class Foo");
    Ok(())
}

#[test]
fn test_misses_are_cached() -> Result<()> {
    let mut fixture = Fixture::new();
    fixture.add_class(&ClassSpec::new("a/Holder", ProtoClassKind::Class).nested("Missing"))?;
    let holder = fixture.class_id("a/Holder")?;
    let missing = fixture.name("Missing");
    let unknown = fixture.name("Unknown");
    let (session, finder) = fixture.counting_session();

    let holder = session.class(class(&session, &holder)?);
    let before = finder.class_lookups();
    assert_eq!(holder.nested_class(&session, missing)?, None);
    assert_eq!(holder.nested_class(&session, missing)?, None);
    assert_eq!(holder.nested_class(&session, unknown)?, None);
    assert_eq!(holder.nested_class(&session, unknown)?, None);
    assert_eq!(finder.class_lookups(), before + 1);
    assert_eq!(session.storage().computations(labels::NESTED_CLASS), 2);
    Ok(())
}

#[test]
fn test_class_object_convention_finds_inline_class_object() -> Result<()> {
    let mut fixture = Fixture::new();
    let registry = fixture.add_class(
        &ClassSpec::new("a/Registry", ProtoClassKind::Object)
            .implicit_constructor()
            .inline_class_object(ClassSpec::new(
                "a/Registry.<class-object-for-Registry>",
                ProtoClassKind::ClassObject,
            )),
    )?;
    let session = fixture.session();

    let class_object_id =
        registry.create_nested_class_id(class_object_name(registry.short_name(), session.interner()));
    let registry = class(&session, &registry)?;
    let found = class(&session, &class_object_id)?;
    assert_eq!(session.class(registry).class_object(&session)?, Some(found));
    assert_eq!(
        session.class(found).containing_declaration(&session)?,
        DeclarationRef::Class(registry)
    );
    assert_eq!(
        session.class(found).class_id().render(session.interner()),
        "a/Registry.<class-object-for-Registry>"
    );
    Ok(())
}

#[test]
fn test_class_object_stored_as_its_own_entry() -> Result<()> {
    let mut fixture = Fixture::new();
    let widget = fixture.add_class(&ClassSpec::new("a/Widget", ProtoClassKind::Class).class_object_marker())?;
    let companion = fixture.add_class(&ClassSpec::new(
        "a/Widget.<class-object-for-Widget>",
        ProtoClassKind::ClassObject,
    ))?;
    let session = fixture.session();

    let widget = class(&session, &widget)?;
    let companion = class(&session, &companion)?;
    let widget_class = session.class(widget);
    assert_eq!(widget_class.class_object(&session)?, Some(companion));
    assert_eq!(
        widget_class.class_object_type(&session)?,
        Some(session.class(companion).default_type())
    );
    assert_eq!(
        session.class(companion).containing_declaration(&session)?,
        DeclarationRef::Class(widget)
    );
    Ok(())
}

#[test]
fn test_class_object_marker_without_entry_is_recursive() -> Result<()> {
    let mut fixture = Fixture::new();
    let lonely = fixture.add_class(&ClassSpec::new("a/Lonely", ProtoClassKind::Class).class_object_marker())?;
    let session = fixture.session();

    let lonely = session.class(class(&session, &lonely)?);
    let expected = DeserializationError::Storage(StorageError::RecursionDetected {
        label: labels::CLASS_OBJECT,
    });
    assert_eq!(lonely.class_object(&session), Err(expected.clone()));
    assert_eq!(lonely.class_object(&session), Err(expected));
    Ok(())
}

#[test]
fn test_containing_declarations() -> Result<()> {
    let mut fixture = Fixture::new();
    let top = fixture.add_class(&ClassSpec::new("a.b/Top", ProtoClassKind::Class))?;
    let orphan = fixture.add_class(&ClassSpec::new("a.b/Gone.Orphan", ProtoClassKind::Class))?;
    let session = fixture.session();

    let package = session.find_package(top.package_fq_name())?;
    assert!(package.is_some());
    let top = session.class(class(&session, &top)?);
    assert_eq!(
        top.containing_declaration(&session)?,
        DeclarationRef::Package(package.unwrap())
    );

    let orphan = session.class(class(&session, &orphan)?);
    assert_eq!(orphan.containing_declaration(&session)?, DeclarationRef::Error);
    assert_eq!(session.storage().computations(labels::CONTAINING_DECLARATION), 2);
    orphan.containing_declaration(&session)?;
    assert_eq!(session.storage().computations(labels::CONTAINING_DECLARATION), 2);
    Ok(())
}

#[test]
fn test_parent_packages_are_known() -> Result<()> {
    let mut fixture = Fixture::new();
    fixture.add_class(&ClassSpec::new("a.b.c/Deep", ProtoClassKind::Class))?;
    let root = fixture.fq_name("");
    let segment = fixture.name("a");
    let session = fixture.session();

    let root = session.find_package(&root)?.unwrap();
    let child = session.package(root).member_scope().package(&session, segment)?;
    assert!(child.is_some());
    assert!(session.find_package(&session.package(root).fq_name().child(segment))?.is_some());
    Ok(())
}
