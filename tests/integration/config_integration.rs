//! Integration tests for layered configuration and resolver construction

use crate::integration::test_utils::with_xdg_env;
use std::fs;
use tempfile::TempDir;
use treewire::catalog::BuilderCatalog;
use treewire::config::{ConfigLoader, TreewireConfig};
use treewire::Resolver;

#[test]
fn test_global_then_workspace_precedence() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_xdg_env(&test_dir, || {
        let global_dir = test_dir.path().join("treewire");
        fs::create_dir_all(&global_dir).unwrap();
        fs::write(
            global_dir.join("config.toml"),
            r#"
[resolver]
pipeline = "rediscover"
max_depth = 10

[logging]
level = "warn"
"#,
        )
        .unwrap();
        fs::write(
            workspace.path().join("treewire.toml"),
            r#"
[resolver]
max_depth = 20
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.resolver.pipeline, "rediscover");
        assert_eq!(config.resolver.max_depth, Some(20));
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate(&BuilderCatalog::builtin()).is_ok());
    });
}

#[test]
fn test_environment_file_selected_by_treewire_env() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_xdg_env(&test_dir, || {
        fs::create_dir_all(workspace.path().join("config")).unwrap();
        fs::write(
            workspace.path().join("config").join("strict.toml"),
            "[resolver]\nfail_leftovers = true\nsecond_pass = false\n",
        )
        .unwrap();

        let relaxed = ConfigLoader::load(workspace.path()).unwrap();
        assert!(!relaxed.resolver.fail_leftovers);

        std::env::set_var("TREEWIRE_ENV", "strict");
        let strict = ConfigLoader::load(workspace.path()).unwrap();
        assert!(strict.resolver.fail_leftovers);
        assert!(!strict.resolver.second_pass);
    });
}

#[test]
fn test_invalid_toml_is_an_error() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_xdg_env(&test_dir, || {
        fs::write(workspace.path().join("treewire.toml"), "[resolver\npipeline = ").unwrap();
        assert!(ConfigLoader::load(workspace.path()).is_err());
    });
}

#[test]
fn test_resolver_from_loaded_config() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_xdg_env(&test_dir, || {
        fs::write(
            workspace.path().join("treewire.toml"),
            "[resolver]\npipeline = \"rediscover\"\ninclude_inherited = true\n",
        )
        .unwrap();

        let config = ConfigLoader::load(workspace.path()).unwrap();
        let resolver = Resolver::from_config(&config.resolver, &BuilderCatalog::builtin()).unwrap();
        assert_eq!(resolver.pipeline_builder(), "rediscover");
        assert_eq!(resolver.context_builder(), "standard");
    });
}

#[test]
fn test_default_config_round_trips_through_toml() {
    let config = TreewireConfig::default();
    let rendered = toml::to_string(&config).unwrap();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rendered.toml");
    fs::write(&path, rendered).unwrap();

    assert_eq!(ConfigLoader::load_from_file(&path).unwrap(), config);
}
