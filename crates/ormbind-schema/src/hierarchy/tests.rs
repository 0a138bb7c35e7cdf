use super::*;
use crate::{
    error::MappingErrorKind,
    index::IndexBuilder,
    node::{ClassMetadata, Tag},
};
use proptest::prelude::*;

fn index_of(classes: Vec<ClassMetadata>) -> Index {
    let mut builder = IndexBuilder::new();
    for class in classes {
        builder.add_class(class).expect("fixture classes are unique");
    }
    builder.freeze()
}

fn names(hierarchy: &Hierarchy) -> Vec<&str> {
    hierarchy.class_names().collect()
}

#[test]
fn direct_subclass_forms_one_root_first_hierarchy() {
    let index = index_of(vec![
        ClassMetadata::new("shop.C2").extends("shop.C1").tag(Tag::entity()),
        ClassMetadata::new("shop.C1").tag(Tag::entity()),
    ]);

    let set = build_hierarchies(&index).expect("hierarchies build");

    assert_eq!(set.len(), 1);
    let hierarchy = set.iter().next().expect("one hierarchy");
    assert_eq!(names(hierarchy), vec!["shop.C1", "shop.C2"]);
    assert_eq!(hierarchy.root().map(HierarchyMember::name), Some("shop.C1"));
}

#[test]
fn siblings_share_one_recorded_ancestor() {
    let index = index_of(vec![
        ClassMetadata::new("zoo.Animal").tag(Tag::MappedSuperclass),
        ClassMetadata::new("zoo.Dog").extends("zoo.Animal").tag(Tag::entity()),
        ClassMetadata::new("zoo.Cat").extends("zoo.Animal").tag(Tag::entity()),
    ]);

    let set = build_hierarchies(&index).expect("hierarchies build");

    assert_eq!(set.len(), 1, "Dog and Cat merge below Animal");
    let hierarchy = set.iter().next().expect("one hierarchy");
    assert_eq!(names(hierarchy), vec!["zoo.Animal", "zoo.Cat", "zoo.Dog"]);
    assert_eq!(
        hierarchy.class_names().filter(|n| *n == "zoo.Animal").count(),
        1,
        "the shared ancestor is recorded once"
    );
    assert_eq!(hierarchy.entities().count(), 2);
}

#[test]
fn merge_does_not_depend_on_processing_order() {
    // descendants sort before their ancestor, so the ancestor is first met
    // mid-walk rather than as a starting point
    let index = index_of(vec![
        ClassMetadata::new("z.Root").tag(Tag::entity()),
        ClassMetadata::new("a.Left").extends("z.Root").tag(Tag::entity()),
        ClassMetadata::new("b.Right").extends("z.Root").tag(Tag::entity()),
        ClassMetadata::new("c.LeftChild").extends("a.Left").tag(Tag::entity()),
    ]);

    let set = build_hierarchies(&index).expect("hierarchies build");

    assert_eq!(set.len(), 1);
    let hierarchy = set.iter().next().expect("one hierarchy");
    assert_eq!(
        names(hierarchy),
        vec!["z.Root", "a.Left", "b.Right", "c.LeftChild"]
    );
}

#[test]
fn untagged_intermediates_are_skipped_but_walked_through() {
    let index = index_of(vec![
        ClassMetadata::new("m.Base").tag(Tag::MappedSuperclass),
        ClassMetadata::new("m.Middle").extends("m.Base"),
        ClassMetadata::new("m.Leaf").extends("m.Middle").tag(Tag::entity()),
    ]);

    let set = build_hierarchies(&index).expect("hierarchies build");

    let hierarchy = set.hierarchy_of("m.Leaf").expect("leaf has a hierarchy");
    assert_eq!(names(hierarchy), vec!["m.Base", "m.Leaf"]);
    assert!(set.hierarchy_of("m.Middle").is_none());
}

#[test]
fn unrelated_entities_stay_in_separate_hierarchies() {
    let index = index_of(vec![
        ClassMetadata::new("shop.Order").tag(Tag::entity()),
        ClassMetadata::new("shop.Invoice").tag(Tag::entity()),
    ]);

    let set = build_hierarchies(&index).expect("hierarchies build");

    assert_eq!(set.len(), 2);
}

#[test]
fn mapped_superclass_without_entities_forms_no_hierarchy() {
    let index = index_of(vec![ClassMetadata::new("m.Orphan").tag(Tag::MappedSuperclass)]);

    let set = build_hierarchies(&index).expect("hierarchies build");

    assert!(set.is_empty());
}

#[test]
fn entity_and_mapped_superclass_is_a_configuration_error() {
    let index = index_of(vec![
        ClassMetadata::new("zoo.Animal")
            .tag(Tag::entity())
            .tag(Tag::MappedSuperclass),
        ClassMetadata::new("zoo.Dog").extends("zoo.Animal").tag(Tag::entity()),
    ]);

    let err = build_hierarchies(&index).expect_err("contradictory tags must fail");

    assert_eq!(err.kind(), MappingErrorKind::Configuration);
    assert_eq!(err.class(), Some("zoo.Animal"));
    assert!(err.to_string().contains("Entity and MappedSuperclass"));
}

#[test]
fn persistable_and_embeddable_is_a_configuration_error_even_when_unreached() {
    let index = index_of(vec![
        ClassMetadata::new("shop.Order").tag(Tag::entity()),
        ClassMetadata::new("shop.Money")
            .tag(Tag::MappedSuperclass)
            .tag(Tag::Embeddable),
    ]);

    let err = build_hierarchies(&index).expect_err("contradictory tags must fail");

    assert_eq!(err.class(), Some("shop.Money"));
    assert!(err.to_string().contains("MappedSuperclass and Embeddable"));
}

#[test]
fn cyclic_superclass_chain_is_rejected() {
    let index = index_of(vec![
        ClassMetadata::new("x.A").extends("x.B").tag(Tag::entity()),
        ClassMetadata::new("x.B").extends("x.A").tag(Tag::entity()),
    ]);

    let err = build_hierarchies(&index).expect_err("cycle must fail");

    assert_eq!(err.kind(), MappingErrorKind::Configuration);
    assert!(err.to_string().contains("cyclic"));
}

#[test]
fn embeddable_hierarchy_collects_value_type_ancestors() {
    let index = index_of(vec![
        ClassMetadata::new("geo.Located").tag(Tag::MappedSuperclass),
        ClassMetadata::new("geo.Plain").extends("geo.Located"),
        ClassMetadata::new("geo.Address")
            .extends("geo.Plain")
            .tag(Tag::Embeddable),
    ]);
    let set = build_hierarchies(&index).expect("hierarchies build");

    let hierarchy = set
        .embeddable_hierarchy(&index, "geo.Address")
        .expect("address is embeddable");

    assert_eq!(names(&hierarchy), vec!["geo.Located", "geo.Address"]);
    assert_eq!(hierarchy.members()[0].role(), ClassRole::MappedSuperclass);
}

#[test]
fn built_set_carries_the_role_of_every_indexed_class() {
    let index = index_of(vec![
        ClassMetadata::new("geo.Address").tag(Tag::Embeddable),
        ClassMetadata::new("geo.Helper"),
        ClassMetadata::new("shop.Order").tag(Tag::entity()),
    ]);

    let set = build_hierarchies(&index).expect("hierarchies build");

    assert_eq!(set.roles().len(), 3);
    assert_eq!(set.roles().get("geo.Address"), Some(ClassRole::Embeddable));
    assert_eq!(set.roles().get("geo.Helper"), Some(ClassRole::Plain));
    assert_eq!(set.roles().get("shop.Order"), Some(ClassRole::Entity));
    assert_eq!(set.roles().get("geo.Unknown"), None);
}

#[test]
fn embeddable_hierarchy_reads_resolved_roles_instead_of_tags() {
    let index = index_of(vec![
        ClassMetadata::new("geo.Base"),
        ClassMetadata::new("geo.Address")
            .extends("geo.Base")
            .tag(Tag::Embeddable),
    ]);
    let roles: ClassRoles = [
        ("geo.Base".to_string(), ClassRole::MappedSuperclass),
        ("geo.Address".to_string(), ClassRole::Embeddable),
    ]
    .into_iter()
    .collect();

    let hierarchy = embeddable_hierarchy(&index, &roles, "geo.Address")
        .expect("address is embeddable");

    assert_eq!(names(&hierarchy), vec!["geo.Base", "geo.Address"]);
}

#[test]
fn embeddable_hierarchy_for_an_entity_is_an_assertion_failure() {
    let index = index_of(vec![ClassMetadata::new("shop.Order").tag(Tag::entity())]);
    let set = build_hierarchies(&index).expect("hierarchies build");

    let err = set
        .embeddable_hierarchy(&index, "shop.Order")
        .expect_err("order is not embeddable");

    assert_eq!(err.kind(), MappingErrorKind::AssertionFailure);
}

#[test]
fn embeddable_hierarchy_for_an_unknown_class_is_a_reference_error() {
    let index = index_of(Vec::new());
    let roles = classify_index(&index).expect("nothing to classify");

    let err = embeddable_hierarchy(&index, &roles, "geo.Nowhere")
        .expect_err("unknown class");

    assert_eq!(err.kind(), MappingErrorKind::ReferenceResolution);
    assert_eq!(err.class(), Some("geo.Nowhere"));
}

//
// Property tests
//

// (has parent, parent pick, role pick) per class; parents always have a
// lower position, so the graph is a forest.
fn forest() -> impl Strategy<Value = Vec<ClassMetadata>> {
    prop::collection::vec((any::<bool>(), any::<prop::sample::Index>(), 0u8..3), 1..14).prop_map(
        |specs| {
            // names sort in reverse position order so descendants are
            // usually visited before their ancestors
            let name = |pos: usize| format!("p.C{:02}", 99 - pos);

            specs
                .iter()
                .enumerate()
                .map(|(pos, (has_parent, parent, role))| {
                    let mut class = ClassMetadata::new(name(pos));
                    if *has_parent && pos > 0 {
                        class = class.extends(name(parent.index(pos)));
                    }
                    match role {
                        0 => class.tag(Tag::entity()),
                        1 => class.tag(Tag::MappedSuperclass),
                        _ => class,
                    }
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn every_entity_lands_in_exactly_one_hierarchy(classes in forest()) {
        let index = index_of(classes);
        let set = build_hierarchies(&index).expect("forests always build");

        let mut seen = HashSet::new();
        for hierarchy in set.iter() {
            prop_assert!(hierarchy.entities().count() > 0, "every hierarchy holds an entity");
            for name in hierarchy.class_names() {
                prop_assert!(seen.insert(name.to_string()), "{} appears twice", name);
            }
        }

        for class in index.classes() {
            if classify(class).expect("no conflicts generated") == ClassRole::Entity {
                prop_assert!(seen.contains(&class.name), "{} is missing", class.name);
            }
        }
    }

    #[test]
    fn ancestors_precede_descendants(classes in forest()) {
        let index = index_of(classes);
        let set = build_hierarchies(&index).expect("forests always build");

        for hierarchy in set.iter() {
            let order: Vec<&str> = hierarchy.class_names().collect();
            for (pos, member) in hierarchy.members().iter().enumerate() {
                let nearest = index
                    .ancestors(member.class())
                    .find(|a| classify(a).map(ClassRole::is_persistable).unwrap_or(false));
                if let Some(ancestor) = nearest {
                    let at = order.iter().position(|n| *n == ancestor.name);
                    prop_assert!(
                        matches!(at, Some(at) if at < pos),
                        "{} must precede {}", ancestor.name, member.name()
                    );
                }
            }
        }
    }
}
