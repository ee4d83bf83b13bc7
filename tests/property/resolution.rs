//! Resolution invariants checked over generated forests

use proptest::prelude::*;
use std::collections::BTreeSet;
use treewire::policy::builtin::ids;
use treewire::scene::{FieldDef, Inject, TypeDef, TypeRegistry};
use treewire::types::{MemberId, NodeId, ObjectRef};
use treewire::{ChangeLog, Resolver, Scene, SceneModel, SlotState};

const MEMBER_TYPES: [&str; 6] = ["Body", "Controller", "Sensor", "Radar", "Squad", "Rifle"];

/// (parent choice, member type indices) per node
type Shape = Vec<(usize, Vec<usize>)>;

fn shape_strategy() -> impl Strategy<Value = Shape> {
    proptest::collection::vec(
        (any::<usize>(), proptest::collection::vec(0usize..MEMBER_TYPES.len(), 0..4)),
        1..24,
    )
}

fn registry() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.register(TypeDef::new("Body"));
    types.register(TypeDef::new("Sensor"));
    types.register(TypeDef::new("Weapon"));
    types.register(TypeDef::new("Rifle").extends("Weapon"));
    types.register(
        TypeDef::new("Controller")
            .field(FieldDef::new("body", "Body").injected(Inject::new(ids::SELF))),
    );
    types.register(
        TypeDef::new("Radar").field(FieldDef::new("sensor", "Sensor").injected(Inject::new(ids::ANY))),
    );
    types.register(
        TypeDef::new("Squad")
            .field(FieldDef::new("weapon", "Weapon").injected(Inject::new(ids::ANY_DESCENDANT))),
    );
    types
}

/// Node `i` hangs under an earlier node, or becomes a root when the choice lands on itself
fn build(shape: &Shape) -> Scene {
    let mut scene = Scene::new(registry());
    let mut nodes: Vec<NodeId> = Vec::with_capacity(shape.len());
    for (i, (parent_choice, members)) in shape.iter().enumerate() {
        let pick = parent_choice % (i + 1);
        let node = if pick == i {
            scene.add_root(format!("n{}", i))
        } else {
            scene.add_child(nodes[pick], format!("n{}", i)).unwrap()
        };
        for &kind in members {
            scene.attach(node, MEMBER_TYPES[kind]).unwrap();
        }
        nodes.push(node);
    }
    scene
}

fn node_of(scene: &Scene, member: MemberId) -> NodeId {
    scene.member(member).unwrap().node
}

/// `node` is `root` itself or sits anywhere below it
fn is_in_subtree_of(scene: &Scene, node: NodeId, root: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == root {
            return true;
        }
        current = scene.node(id).unwrap().parent;
    }
    false
}

fn members_of_type<'a>(scene: &'a Scene, name: &'a str) -> impl Iterator<Item = MemberId> + 'a {
    scene
        .member_ids()
        .filter(move |id| scene.member(*id).unwrap().type_name.as_str() == name)
}

#[test]
fn test_every_slot_lands_in_exactly_one_bucket() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&shape_strategy(), |shape| {
            let mut scene = build(&shape);
            let injected = ["Controller", "Radar", "Squad"]
                .iter()
                .map(|name| members_of_type(&scene, name).count())
                .sum::<usize>();

            let resolution = Resolver::standard().resolve(&mut scene, &mut ChangeLog::new());
            let buckets = resolution.buckets();

            let mut seen = BTreeSet::new();
            for state in [SlotState::Unresolved, SlotState::Succeeded, SlotState::Failed] {
                for key in buckets.bucket(state).keys() {
                    prop_assert!(seen.insert(key), "slot classified twice");
                }
            }
            prop_assert_eq!(seen.len(), injected);
            prop_assert!(buckets.failed.is_empty());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_bound_values_respect_their_policy() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&shape_strategy(), |shape| {
            let mut scene = build(&shape);
            Resolver::standard().resolve(&mut scene, &mut ChangeLog::new());

            for controller in members_of_type(&scene, "Controller").collect::<Vec<_>>() {
                if let Some(ObjectRef::Member(body)) = scene.field_value(controller, "body") {
                    prop_assert_eq!(node_of(&scene, body), node_of(&scene, controller));
                    prop_assert_eq!(scene.member(body).unwrap().type_name.as_str(), "Body");
                }
            }

            for squad in members_of_type(&scene, "Squad").collect::<Vec<_>>() {
                if let Some(value) = scene.field_value(squad, "weapon") {
                    let ObjectRef::Member(weapon) = value else {
                        return Err(TestCaseError::fail("weapon bound to a node"));
                    };
                    // The owner's own container counts: it is on the ancestor path
                    // when its members are visited.
                    prop_assert!(is_in_subtree_of(
                        &scene,
                        node_of(&scene, weapon),
                        node_of(&scene, squad)
                    ));
                }
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_any_policy_succeeds_whenever_a_candidate_exists() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&shape_strategy(), |shape| {
            let mut scene = build(&shape);
            let has_sensor = members_of_type(&scene, "Sensor").next().is_some();
            let resolution = Resolver::standard().resolve(&mut scene, &mut ChangeLog::new());

            for radar in members_of_type(&scene, "Radar").collect::<Vec<_>>() {
                let expected = if has_sensor {
                    SlotState::Succeeded
                } else {
                    SlotState::Unresolved
                };
                prop_assert_eq!(resolution.state_of(radar, "sensor"), Some(expected));
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_resolution_is_deterministic() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&shape_strategy(), |shape| {
            let mut first = build(&shape);
            let mut second = build(&shape);
            Resolver::standard().resolve(&mut first, &mut ChangeLog::new());
            Resolver::standard().resolve(&mut second, &mut ChangeLog::new());
            prop_assert_eq!(first.to_document(), second.to_document());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_any_match_type_is_stable_under_child_shuffle() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let kinds = Just(vec!["Body", "Rifle", "Sensor", "Body", "Sensor", "Rifle"]).prop_shuffle();

    runner
        .run(&kinds, |kinds| {
            let mut scene = Scene::new(registry());
            let root = scene.add_root("root");
            let radar = scene.attach(root, "Radar").unwrap();
            for (i, kind) in kinds.iter().enumerate() {
                let child = scene.add_child(root, format!("c{}", i)).unwrap();
                scene.attach(child, *kind).unwrap();
            }

            Resolver::standard().resolve(&mut scene, &mut ChangeLog::new());
            let Some(ObjectRef::Member(bound)) = scene.field_value(radar, "sensor") else {
                return Err(TestCaseError::fail("radar left unbound"));
            };
            prop_assert_eq!(scene.member(bound).unwrap().type_name.as_str(), "Sensor");
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_any_descendant_binds_weapon_on_owner_container() {
    let shape: Shape = vec![(0, vec![]), (0, vec![]), (0, vec![]), (0, vec![]), (0, vec![5, 4])];
    let mut scene = build(&shape);
    let rifle = members_of_type(&scene, "Rifle").next().unwrap();
    let squad = members_of_type(&scene, "Squad").next().unwrap();

    let resolution = Resolver::standard().resolve(&mut scene, &mut ChangeLog::new());

    assert_eq!(resolution.state_of(squad, "weapon"), Some(SlotState::Succeeded));
    assert_eq!(scene.field_value(squad, "weapon"), Some(rifle.into()));
    assert_eq!(node_of(&scene, rifle), node_of(&scene, squad));
}
