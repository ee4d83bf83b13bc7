//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("resolver.pipeline", "standard")?
        .set_default("resolver.context", "standard")?
        .set_default("resolver.second_pass", true)?
        .set_default("resolver.include_inherited", false)?
        .set_default("resolver.fail_leftovers", false)
}
