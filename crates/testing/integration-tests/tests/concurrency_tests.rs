//! One session shared by many threads

use anyhow::Result;
use cv_descriptors::{ClassDescriptorId, DeclarationRef, MemberKind, labels};
use cv_proto::{ProtoClassKind, ProtoModality};
use integration_tests::builder::{ClassSpec, MemberSpec, class_type};
use integration_tests::{Fixture, class};
use std::thread;

const THREADS: usize = 8;

#[test]
fn test_concurrent_lookups_share_descriptors() -> Result<()> {
    let mut fixture = Fixture::new();
    let outer = fixture.add_class(
        &ClassSpec::new("a/Outer", ProtoClassKind::Class)
            .modality(ProtoModality::Open)
            .nested("Inner")
            .member(MemberSpec::function("run", class_type("jet/Unit")).modality(ProtoModality::Open)),
    )?;
    let inner = fixture.add_class(
        &ClassSpec::new("a/Outer.Inner", ProtoClassKind::Class).supertype(class_type("a/Outer")),
    )?;
    let inner_name = fixture.name("Inner");
    let run = fixture.name("run");
    let session = fixture.session();

    let results: Vec<(ClassDescriptorId, ClassDescriptorId)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|index| {
                let session = &session;
                let outer = &outer;
                let inner = &inner;
                scope.spawn(move || -> Result<(ClassDescriptorId, ClassDescriptorId)> {
                    let (outer, inner) = if index % 2 == 0 {
                        let outer = class(session, outer)?;
                        (outer, class(session, inner)?)
                    } else {
                        let inner = class(session, inner)?;
                        (class(session, outer)?, inner)
                    };
                    let inner_class = session.class(inner);
                    let functions = inner_class.member_scope().functions(session, run)?;
                    assert_eq!(functions.len(), 1);
                    assert_eq!(functions[0].member_kind, MemberKind::FakeOverride);
                    assert_eq!(
                        inner_class.containing_declaration(session)?,
                        DeclarationRef::Class(outer)
                    );
                    assert_eq!(session.class(outer).nested_class(session, inner_name)?, Some(inner));
                    Ok((outer, inner))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Result<_>>()
    })?;

    assert_eq!(results.len(), THREADS);
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(session.class_count(), 2);
    assert_eq!(session.storage().computations(labels::FIND_CLASS), 2);
    assert_eq!(session.storage().computations(labels::FUNCTIONS), 2);
    Ok(())
}
