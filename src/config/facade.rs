//! Loader facade: assembles every source in override order.

use super::merge::builder_with_defaults;
use super::sources::{environment, global_file, workspace_file};
use super::TreewireConfig;
use crate::error::TreewireError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Loads [`TreewireConfig`] from defaults, files and the environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, workspace
    /// `treewire.toml`, workspace `config/{TREEWIRE_ENV}.toml`, `TREEWIRE_*`
    /// environment variables.
    pub fn load(workspace_root: &Path) -> Result<TreewireConfig, TreewireError> {
        Self::load_with_file(workspace_root, None)
    }

    /// Like [`ConfigLoader::load`], with an explicit file layered above the workspace files
    pub fn load_with_file(
        workspace_root: &Path,
        explicit: Option<&Path>,
    ) -> Result<TreewireConfig, TreewireError> {
        let mut builder = builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        builder = workspace_file::add_to_builder(builder, workspace_root)?;
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(TreewireError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = environment::add_to_builder(builder);

        let config: TreewireConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            pipeline = %config.resolver.pipeline,
            context = %config.resolver.context,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load a single file on top of the defaults, ignoring every other source
    pub fn load_from_file(path: &Path) -> Result<TreewireConfig, TreewireError> {
        let config = builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}
