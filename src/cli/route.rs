//! CLI route: single route table and CLI context. Dispatches to the resolver and presentation.

use crate::catalog::BuilderCatalog;
use crate::changes::ChangeLog;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_builders_json, format_builders_text, format_policies_json, format_policies_text,
    format_resolution_json, format_resolution_text,
};
use crate::config::{ConfigLoader, TreewireConfig};
use crate::error::TreewireError;
use crate::policy::PolicyRegistry;
use crate::resolver::Resolver;
use crate::scene::{Scene, SceneDocument};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span};

/// Command name for logging (e.g. "resolve", "policies").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Resolve { .. } => "resolve",
        Commands::Policies { .. } => "policies",
        Commands::Builders { .. } => "builders",
    }
}

/// Runtime context for CLI execution: workspace, loaded configuration and builder catalog.
pub struct CliContext {
    workspace_root: PathBuf,
    config: TreewireConfig,
    policies: Arc<PolicyRegistry>,
    catalog: BuilderCatalog,
}

impl CliContext {
    /// Load and validate configuration for a workspace
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, TreewireError> {
        let config = ConfigLoader::load_with_file(&workspace_root, config_path.as_deref())?;
        Self::with_config(workspace_root, config)
    }

    /// Build a context from an already loaded configuration
    pub fn with_config(workspace_root: PathBuf, config: TreewireConfig) -> Result<Self, TreewireError> {
        let policies = Arc::new(PolicyRegistry::builtin());
        let catalog = BuilderCatalog::with_policies(policies.clone());

        config.validate(&catalog).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            TreewireError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;

        Ok(Self {
            workspace_root,
            config,
            policies,
            catalog,
        })
    }

    pub fn config(&self) -> &TreewireConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, TreewireError> {
        let span = info_span!("command", name = command_name(command));
        let _entered = span.enter();
        let started = Instant::now();

        let result = match command {
            Commands::Resolve {
                scene,
                format,
                write,
                output,
                pipeline,
                single_pass,
            } => self.handle_resolve(
                scene,
                format,
                *write,
                output.as_deref(),
                pipeline.as_deref(),
                *single_pass,
            ),
            Commands::Policies { format } => match format.as_str() {
                "json" => format_policies_json(&self.policies),
                _ => Ok(format_policies_text(&self.policies)),
            },
            Commands::Builders { format } => {
                let selected = (
                    self.config.resolver.pipeline.as_str(),
                    self.config.resolver.context.as_str(),
                );
                match format.as_str() {
                    "json" => format_builders_json(&self.catalog, selected),
                    _ => Ok(format_builders_text(&self.catalog, selected)),
                }
            }
        };

        info!(
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    fn handle_resolve(
        &self,
        scene_path: &Path,
        format: &str,
        write: bool,
        output: Option<&Path>,
        pipeline: Option<&str>,
        single_pass: bool,
    ) -> Result<String, TreewireError> {
        let scene_path = self.resolve_path(scene_path);
        let document = SceneDocument::load(&scene_path)?;
        let mut scene = Scene::from_document(&document)?;

        let mut resolver_config = self.config.resolver.clone();
        if let Some(pipeline) = pipeline {
            resolver_config.pipeline = pipeline.to_string();
        }
        if single_pass {
            resolver_config.second_pass = false;
        }
        let resolver = Resolver::from_config(&resolver_config, &self.catalog)?;

        let mut changes = ChangeLog::new();
        let resolution = resolver.resolve(&mut scene, &mut changes);
        let changed = changes.changed().count();

        let target = match output {
            Some(path) => Some(self.resolve_path(path)),
            None if write => Some(scene_path.clone()),
            None => None,
        };
        let written = match target {
            Some(path) if output.is_some() || !changes.is_empty() => {
                scene.to_document().save(&path)?;
                info!(path = %path.display(), changed, "Resolved scene written");
                Some(path)
            }
            _ => None,
        };

        let report = resolution.report(&scene);
        match format {
            "json" => format_resolution_json(&report, changed, written.as_deref()),
            _ => Ok(format_resolution_text(&report, changed, written.as_deref())),
        }
    }
}
