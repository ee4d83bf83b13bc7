//! CLI commands driven through the parser and route table

use crate::integration::test_utils::with_xdg_env;
use clap::Parser;
use std::fs;
use tempfile::TempDir;
use treewire::cli::{Cli, CliContext};
use treewire::scene::SceneDocument;

const SCENE: &str = r#"{
    "types": [
        { "name": "Body" },
        { "name": "Controller", "fields": [
            { "name": "body", "type": "Body", "inject": { "policy": "self" } }
        ] },
        { "name": "Radar", "fields": [
            { "name": "sensor", "type": "Body", "inject": { "policy": "any" } }
        ] }
    ],
    "roots": [
        { "name": "Tower", "members": [ { "type": "Radar" } ] },
        { "name": "Player", "members": [ { "type": "Controller" }, { "type": "Body" } ] }
    ]
}"#;

fn run(test_dir: &TempDir, workspace: &TempDir, args: &[&str]) -> Result<String, String> {
    with_xdg_env(test_dir, || {
        let ws = workspace.path().to_string_lossy().to_string();
        let mut argv = vec!["treewire", "--workspace", ws.as_str()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
        let context = CliContext::new(cli.workspace.clone(), cli.config.clone())
            .map_err(|e| e.to_string())?;
        context.execute(&cli.command).map_err(|e| e.to_string())
    })
}

#[test]
fn test_policies_json_lists_builtins() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let out = run(&test_dir, &workspace, &["policies", "--format", "json"]).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
    let ids: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"self"));
    assert!(ids.contains(&"one-shot-self"));
}

#[test]
fn test_builders_marks_configured_selection() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("treewire.toml"),
        "[resolver]\npipeline = \"rediscover\"\n",
    )
    .unwrap();

    let out = run(&test_dir, &workspace, &["builders", "--format", "json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["selected"]["pipeline"], "rediscover");
    assert_eq!(value["selected"]["context"], "standard");
}

#[test]
fn test_resolve_write_updates_scene_in_place() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let scene_path = workspace.path().join("scene.json");
    fs::write(&scene_path, SCENE).unwrap();

    let out = run(&test_dir, &workspace, &["resolve", "scene.json", "--write"]).unwrap();
    assert!(out.contains("Wrote resolved scene"));

    let written = SceneDocument::load(&scene_path).unwrap();
    let radar = &written.roots[0].members[0];
    let controller = &written.roots[1].members[0];
    assert!(radar.values.contains_key("sensor"));
    assert!(controller.values.contains_key("body"));
}

#[test]
fn test_single_pass_runs_one_walk() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::write(workspace.path().join("scene.json"), SCENE).unwrap();

    let out = run(
        &test_dir,
        &workspace,
        &["resolve", "scene.json", "--single-pass", "--format", "json"],
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["summary"]["succeeded"], 2);
    assert_eq!(value["summary"]["unresolved"], 0);
    assert_eq!(value["passes"].as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_scene_file_is_an_error() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let err = run(&test_dir, &workspace, &["resolve", "absent.json"]).unwrap_err();
    assert!(!err.is_empty());
}
