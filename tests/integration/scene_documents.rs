//! Scene documents: load, resolve and write back

use std::fs;
use tempfile::TempDir;
use treewire::scene::SceneDocument;
use treewire::types::MemberId;
use treewire::{ChangeLog, Resolver, Scene, SceneModel, SlotState};

const SQUAD_TOML: &str = r#"
[[types]]
name = "Weapon"

[[types]]
name = "Rifle"
base = "Weapon"

[[types]]
name = "Squad"

[[types.fields]]
name = "weapon"
type = "Weapon"
inject = { policy = "any-descendant" }

[[roots]]
name = "Squad"

[[roots.members]]
type = "Squad"

[[roots.children]]
name = "Rifleman"

[[roots.children.members]]
type = "Rifle"
"#;

#[test]
fn test_toml_scene_resolves_and_round_trips() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("squad.toml");
    fs::write(&path, SQUAD_TOML).unwrap();

    let document = SceneDocument::load(&path).unwrap();
    let mut scene = Scene::from_document(&document).unwrap();
    let squad = MemberId(0);
    let rifle = MemberId(1);

    let mut log = ChangeLog::new();
    let resolution = Resolver::standard().resolve(&mut scene, &mut log);
    assert_eq!(resolution.state_of(squad, "weapon"), Some(SlotState::Succeeded));
    assert!(log.contains(squad));

    let out = temp.path().join("resolved.toml");
    scene.to_document().save(&out).unwrap();

    let reloaded = Scene::from_document(&SceneDocument::load(&out).unwrap()).unwrap();
    assert_eq!(reloaded.field_value(squad, "weapon"), Some(rifle.into()));
}

#[test]
fn test_resolving_a_resolved_document_changes_nothing() {
    let document =
        SceneDocument::parse(SQUAD_TOML, treewire::scene::document::DocumentFormat::Toml).unwrap();
    let mut scene = Scene::from_document(&document).unwrap();
    Resolver::standard().resolve(&mut scene, &mut ChangeLog::new());

    let mut reloaded = Scene::from_document(&scene.to_document()).unwrap();
    let mut log = ChangeLog::new();
    let resolution = Resolver::standard().resolve(&mut reloaded, &mut log);

    assert!(resolution.buckets().is_empty());
    assert!(log.is_empty());
}

#[test]
fn test_json_document_with_tags_and_explicit_ids() {
    let content = r#"{
        "types": [
            { "name": "Body" },
            { "name": "Targeting", "fields": [
                { "name": "target", "type": "Body", "inject": { "policy": "by-tag", "tag": "Enemy" } }
            ] }
        ],
        "roots": [
            { "name": "World", "members": [ { "id": "aim", "type": "Targeting" } ], "children": [
                { "name": "Friend", "members": [ { "type": "Body" } ] },
                { "name": "Foe", "tag": "Enemy", "members": [ { "id": "foe-body", "type": "Body" } ] }
            ] }
        ]
    }"#;
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("world.json");
    fs::write(&path, content).unwrap();

    let mut scene = Scene::from_document(&SceneDocument::load(&path).unwrap()).unwrap();
    let resolution = Resolver::standard().resolve(&mut scene, &mut ChangeLog::new());
    assert!(resolution.is_complete());

    let written = scene.to_document();
    let aim = &written.roots[0].members[0];
    assert_eq!(aim.id.as_deref(), Some("aim"));
    assert_eq!(aim.values.get("target").map(String::as_str), Some("foe-body"));
}

#[test]
fn test_dangling_reference_is_rejected() {
    let content = r#"{
        "types": [ { "name": "Body" }, { "name": "Holder", "fields": [ { "name": "body", "type": "Body" } ] } ],
        "roots": [ { "name": "A", "members": [ { "type": "Holder", "values": { "body": "missing" } } ] } ]
    }"#;
    let document = SceneDocument::parse(content, treewire::scene::document::DocumentFormat::Json).unwrap();
    let err = Scene::from_document(&document).unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[test]
fn test_generated_ids_avoid_explicit_ones() {
    let content = r#"{
        "types": [
            { "name": "Body" },
            { "name": "Controller", "fields": [
                { "name": "body", "type": "Body", "inject": { "policy": "self" } }
            ] }
        ],
        "roots": [
            { "name": "Player", "members": [ { "id": "_m1", "type": "Controller" }, { "type": "Body" } ] }
        ]
    }"#;
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("player.json");
    fs::write(&path, content).unwrap();

    let mut scene = Scene::from_document(&SceneDocument::load(&path).unwrap()).unwrap();
    let controller = MemberId(0);
    let body = MemberId(1);
    let resolution = Resolver::standard().resolve(&mut scene, &mut ChangeLog::new());
    assert_eq!(resolution.state_of(controller, "body"), Some(SlotState::Succeeded));

    scene.to_document().save(&path).unwrap();
    let written = SceneDocument::load(&path).unwrap();
    let members = &written.roots[0].members;
    assert_eq!(members[0].id.as_deref(), Some("_m1"));
    assert_ne!(members[1].id.as_deref(), Some("_m1"));

    let reloaded = Scene::from_document(&written).unwrap();
    assert_eq!(reloaded.field_value(controller, "body"), Some(body.into()));
}
