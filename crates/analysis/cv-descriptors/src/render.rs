//! Text dumps of descriptors, used for snapshot tests and debugging

use crate::class::ClassDescriptorId;
use crate::descriptors::DeclarationDescriptor;
use crate::error::DeserializationError;
use crate::package::PackageDescriptorId;
use crate::session::ModuleSession;

/// Renders a class header, its constructors, class object, nested classes and members
///
/// ```text
/// public final class a/Point
///   supertypes: jet/Any
///   public final constructor <init>(x: jet/Int): a/Point
///   public final val x: jet/Int
/// ```
///
/// # Errors
///
/// Fails if any part of the class cannot be resolved.
pub fn render_class(session: &ModuleSession, id: ClassDescriptorId) -> Result<String, DeserializationError> {
    let interner = session.interner();
    let class = session.class(id);
    let mut text = format!(
        "{} {} {} {}",
        class.visibility().keyword(),
        class.modality().keyword(),
        class.kind().keyword(),
        class.class_id().render(interner)
    );
    if !class.type_parameters().is_empty() {
        let parameters: Vec<_> = class
            .type_parameters()
            .iter()
            .map(|parameter| interner.resolve(&parameter.name))
            .collect();
        text.push_str(&format!("<{}>", parameters.join(", ")));
    }
    let supertypes = class.supertypes(session)?;
    if !supertypes.is_empty() {
        let rendered: Vec<_> = supertypes.iter().map(|ty| ty.render(interner)).collect();
        push_line(&mut text, 1, &format!("supertypes: {}", rendered.join(", ")));
    }
    for constructor in class.constructors(session)? {
        push_line(&mut text, 1, &constructor.render(interner));
    }
    if let Some(class_object) = class.class_object(session)? {
        push_line(
            &mut text,
            1,
            &format!("class object: {}", session.class(class_object).class_id().render(interner)),
        );
    }
    for descriptor in class.member_scope().all_descriptors(session)?.iter() {
        push_line(&mut text, 1, &render_declaration(session, descriptor));
    }
    Ok(text)
}

/// Renders a package and its members
///
/// # Errors
///
/// Fails if a member cannot be resolved.
pub fn render_package(session: &ModuleSession, id: PackageDescriptorId) -> Result<String, DeserializationError> {
    let package = session.package(id);
    let mut text = format!("package {}", package.fq_name().render(session.interner()));
    for descriptor in package.member_scope().all_descriptors(session)?.iter() {
        push_line(&mut text, 1, &render_declaration(session, descriptor));
    }
    Ok(text)
}

fn render_declaration(session: &ModuleSession, descriptor: &DeclarationDescriptor) -> String {
    let interner = session.interner();
    match descriptor {
        DeclarationDescriptor::Class(id) => {
            let class = session.class(*id);
            format!("{} {}", class.kind().keyword(), class.class_id().render(interner))
        }
        DeclarationDescriptor::Package(id) => {
            format!("package {}", session.package(*id).fq_name().render(interner))
        }
        DeclarationDescriptor::Callable(callable) => callable.render(interner),
    }
}

fn push_line(text: &mut String, depth: usize, line: &str) {
    text.push('\n');
    for _ in 0..depth {
        text.push_str("  ");
    }
    text.push_str(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::finder::ClassDataIndex;
    use cv_ids::FqName;
    use cv_intern::Interner;
    use cv_proto::{ClassData, NameTableBuilder, ProtoClass};
    use expect_test::expect;

    #[test]
    fn test_render_package_lists_classes() {
        let interner = Interner::new();
        let mut index = ClassDataIndex::new();
        for class_id in ["a.b/Foo", "a.b/Bar"] {
            let mut names = NameTableBuilder::new();
            let fq_name = names.class(class_id);
            let data = ClassData {
                names: names.build(),
                class: ProtoClass {
                    fq_name,
                    ..ProtoClass::default()
                },
            };
            index.add_class_data(&data, &interner).unwrap();
        }
        let session = ModuleSession::from_index(interner.clone(), SessionConfig::default(), index);
        let package = session
            .find_package(&FqName::parse("a.b", &interner))
            .unwrap()
            .unwrap();

        expect![[r#"
            package a.b
              class a.b/Foo
              class a.b/Bar"#]]
        .assert_eq(&render_package(&session, package).unwrap());
    }
}
