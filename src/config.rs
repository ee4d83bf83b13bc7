//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, workspace
//! files and `TREEWIRE_*` environment variables, merged through the `config`
//! crate. Selects the resolution builders and tunes traversal and logging.

use crate::catalog::BuilderCatalog;
use crate::logging::LoggingConfig;
use crate::services::ContextOptions;
use crate::tree::WalkerConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreewireConfig {
    /// Resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Pipeline builder name in the catalog
    #[serde(default = "default_builder")]
    pub pipeline: String,

    /// Context builder name in the catalog
    #[serde(default = "default_builder")]
    pub context: String,

    /// Run the process-only pass when slots remain unresolved
    #[serde(default = "default_true")]
    pub second_pass: bool,

    /// Discover fields declared on base types too
    #[serde(default)]
    pub include_inherited: bool,

    /// Deepest node depth visited (unlimited when absent)
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Move slots still unresolved after the last pass into Failed
    #[serde(default)]
    pub fail_leftovers: bool,
}

fn default_builder() -> String {
    "standard".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            pipeline: default_builder(),
            context: default_builder(),
            second_pass: default_true(),
            include_inherited: false,
            max_depth: None,
            fail_leftovers: false,
        }
    }
}

impl ResolverConfig {
    pub fn context_options(&self) -> ContextOptions {
        ContextOptions {
            include_inherited: self.include_inherited,
        }
    }

    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            max_depth: self.max_depth,
        }
    }

    /// Validate resolver settings against a builder catalog
    pub fn validate(&self, catalog: &BuilderCatalog) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !catalog.has_pipeline(&self.pipeline) {
            errors.push(ValidationError::Resolver(format!(
                "Unknown pipeline builder '{}' (available: {})",
                self.pipeline,
                catalog.pipeline_names().join(", ")
            )));
        }
        if !catalog.has_context(&self.context) {
            errors.push(ValidationError::Resolver(format!(
                "Unknown context builder '{}' (available: {})",
                self.context,
                catalog.context_names().join(", ")
            )));
        }
        if self.max_depth == Some(0) {
            errors.push(ValidationError::Resolver(
                "max_depth must be at least 1".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Resolver(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Resolver(msg) => write!(f, "Resolver: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl TreewireConfig {
    /// Validate the entire configuration
    pub fn validate(&self, catalog: &BuilderCatalog) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(resolver_errors) = self.resolver.validate(catalog) {
            errors.extend(resolver_errors);
        }
        if let Err(e) = crate::logging::validate(&self.logging) {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
