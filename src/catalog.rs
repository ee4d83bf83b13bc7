//! Named pipeline and context builders
//!
//! Configuration selects builders by name; hosts register their own next to the
//! built-in ones.

use crate::error::TreewireError;
use crate::pipeline::{PipelineBuilder, RediscoverPipelineBuilder, StandardPipelineBuilder};
use crate::policy::PolicyRegistry;
use crate::services::{ContextBuilder, StandardContextBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of builders keyed by name
#[derive(Clone, Default)]
pub struct BuilderCatalog {
    pipelines: BTreeMap<&'static str, Arc<dyn PipelineBuilder>>,
    contexts: BTreeMap<&'static str, Arc<dyn ContextBuilder>>,
}

impl BuilderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// "standard" and "rediscover" pipelines, "standard" context over the built-in policies
    pub fn builtin() -> Self {
        Self::with_policies(Arc::new(PolicyRegistry::builtin()))
    }

    /// Built-in builders, with the standard context using `policies`
    pub fn with_policies(policies: Arc<PolicyRegistry>) -> Self {
        let mut catalog = Self::new();
        catalog.register_pipeline(Arc::new(StandardPipelineBuilder));
        catalog.register_pipeline(Arc::new(RediscoverPipelineBuilder));
        catalog.register_context(Arc::new(StandardContextBuilder::new(policies)));
        catalog
    }

    pub fn register_pipeline(
        &mut self,
        builder: Arc<dyn PipelineBuilder>,
    ) -> Option<Arc<dyn PipelineBuilder>> {
        self.pipelines.insert(builder.name(), builder)
    }

    pub fn register_context(
        &mut self,
        builder: Arc<dyn ContextBuilder>,
    ) -> Option<Arc<dyn ContextBuilder>> {
        self.contexts.insert(builder.name(), builder)
    }

    pub fn pipeline(&self, name: &str) -> Result<Arc<dyn PipelineBuilder>, TreewireError> {
        self.pipelines
            .get(name)
            .cloned()
            .ok_or_else(|| TreewireError::UnknownPipelineBuilder(name.to_string()))
    }

    pub fn context(&self, name: &str) -> Result<Arc<dyn ContextBuilder>, TreewireError> {
        self.contexts
            .get(name)
            .cloned()
            .ok_or_else(|| TreewireError::UnknownContextBuilder(name.to_string()))
    }

    pub fn has_pipeline(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.contexts.contains_key(name)
    }

    pub fn pipeline_names(&self) -> Vec<&'static str> {
        self.pipelines.keys().copied().collect()
    }

    pub fn context_names(&self) -> Vec<&'static str> {
        self.contexts.keys().copied().collect()
    }
}
