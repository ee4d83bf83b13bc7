//! Shared test utilities for integration tests
//!
//! Environment isolation for configuration tests and small scene builders.

use std::sync::Mutex;
use tempfile::TempDir;
use treewire::policy::builtin::ids;
use treewire::scene::{FieldDef, Inject, TypeDef, TypeRegistry};

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: [&str; 4] = ["HOME", "XDG_CONFIG_HOME", "TREEWIRE_ENV", "TREEWIRE_RESOLVER__PIPELINE"];

/// Environment variable state to restore after test
struct EnvState {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            saved: ISOLATED_VARS
                .iter()
                .map(|key| (*key, std::env::var(key).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (key, value) in self.saved {
            match value {
                Some(orig) => std::env::set_var(key, orig),
                None => std::env::remove_var(key),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into `test_dir`
///
/// The global config file lives at `<test_dir>/treewire/config.toml`.
/// TREEWIRE_ENV and resolver overrides are cleared. Everything is restored
/// afterwards.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().to_str().unwrap());
    std::env::remove_var("TREEWIRE_ENV");
    std::env::remove_var("TREEWIRE_RESOLVER__PIPELINE");

    let result = f();

    env_state.restore();

    result
}

/// Types used by the resolution scenarios
///
/// - `Body`, `Weapon`, `Sensor` are plain component types; `Rifle` extends `Weapon`
/// - `Controller` wants a `Body` on its own node
/// - `Squad` wants any `Weapon` below it
/// - `Radar` wants any `Sensor` anywhere
/// - `Targeting` wants a `Body` on a node tagged "Enemy"
/// - `Cache` grabs a `Body` from its own node at discovery
pub fn game_types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.register(TypeDef::new("Body"));
    types.register(TypeDef::new("Weapon"));
    types.register(TypeDef::new("Rifle").extends("Weapon"));
    types.register(TypeDef::new("Sensor"));
    types.register(
        TypeDef::new("Controller")
            .field(FieldDef::new("body", "Body").injected(Inject::new(ids::SELF))),
    );
    types.register(
        TypeDef::new("Squad")
            .field(FieldDef::new("weapon", "Weapon").injected(Inject::new(ids::ANY_DESCENDANT))),
    );
    types.register(
        TypeDef::new("Radar").field(FieldDef::new("sensor", "Sensor").injected(Inject::new(ids::ANY))),
    );
    types.register(
        TypeDef::new("Targeting").field(
            FieldDef::new("target", "Body").injected(Inject::with_tag(ids::BY_TAG, "Enemy")),
        ),
    );
    types.register(
        TypeDef::new("Cache")
            .field(FieldDef::new("body", "Body").injected(Inject::new(ids::ONE_SHOT_SELF))),
    );
    types
}
