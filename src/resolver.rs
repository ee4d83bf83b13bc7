//! Two-phase resolution
//!
//! Phase "collect" walks the whole tree discovering and matching slots. When
//! slots remain unresolved, the ancestor path is cleared and phase
//! "process-only" walks the tree once more so that candidates visited before
//! their owners get a second chance. There is never a third pass.

use crate::bucket::{Classification, SlotState};
use crate::catalog::BuilderCatalog;
use crate::changes::PersistenceHook;
use crate::config::ResolverConfig;
use crate::error::{PipelineError, TreewireError};
use crate::pipeline::{PipelineBuilder, RunContext, StandardPipelineBuilder};
use crate::scene::SceneModel;
use crate::services::{ContextBuilder, ContextOptions, StandardContextBuilder};
use crate::tree::{WalkStats, Walker, WalkerConfig};
use crate::types::MemberId;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Outcome of one walk over the tree
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub phase: usize,
    pub pipeline: &'static str,
    #[serde(flatten)]
    pub walk: WalkStats,
    pub unresolved_after: usize,
    pub succeeded_after: usize,
    pub failed_after: usize,
}

/// Runs resolution over a scene with the configured builders
#[derive(Clone)]
pub struct Resolver {
    pipelines: Arc<dyn PipelineBuilder>,
    contexts: Arc<dyn ContextBuilder>,
    options: ContextOptions,
    walker: Walker,
    second_pass: bool,
    fail_leftovers: bool,
}

impl Resolver {
    pub fn new(pipelines: Arc<dyn PipelineBuilder>, contexts: Arc<dyn ContextBuilder>) -> Self {
        Self {
            pipelines,
            contexts,
            options: ContextOptions::default(),
            walker: Walker::new(),
            second_pass: true,
            fail_leftovers: false,
        }
    }

    /// Standard pipeline and context over the built-in policies
    pub fn standard() -> Self {
        Self::new(
            Arc::new(StandardPipelineBuilder),
            Arc::new(StandardContextBuilder::default()),
        )
    }

    /// Build a resolver from configuration, looking builders up by name
    pub fn from_config(
        config: &ResolverConfig,
        catalog: &BuilderCatalog,
    ) -> Result<Self, TreewireError> {
        Ok(Self::new(catalog.pipeline(&config.pipeline)?, catalog.context(&config.context)?)
            .with_options(config.context_options())
            .with_walker(config.walker_config())
            .with_second_pass(config.second_pass)
            .with_fail_leftovers(config.fail_leftovers))
    }

    pub fn with_options(mut self, options: ContextOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_walker(mut self, config: WalkerConfig) -> Self {
        self.walker = Walker::with_config(config);
        self
    }

    pub fn with_second_pass(mut self, enabled: bool) -> Self {
        self.second_pass = enabled;
        self
    }

    pub fn with_fail_leftovers(mut self, enabled: bool) -> Self {
        self.fail_leftovers = enabled;
        self
    }

    pub fn pipeline_builder(&self) -> &str {
        self.pipelines.name()
    }

    pub fn context_builder(&self) -> &str {
        self.contexts.name()
    }

    /// Fresh run context with services from the context builder
    pub fn context<'a>(
        &self,
        scene: &'a mut dyn SceneModel,
        persistence: &'a mut dyn PersistenceHook,
    ) -> RunContext<'a> {
        RunContext::new(scene, persistence, self.contexts.build(&self.options))
    }

    /// Walk the whole tree once with the pipeline for `phase`
    pub fn run_phase(&self, ctx: &mut RunContext<'_>, phase: usize) -> PassSummary {
        ctx.set_phase(phase);
        let pipeline = self.pipelines.build(phase);
        let walk = self.walker.walk(ctx, &pipeline);
        let buckets = ctx.services.buckets.as_ref();
        let count = |state: SlotState| buckets.map_or(0, |b| b.bucket(state).len());

        let summary = PassSummary {
            phase,
            pipeline: pipeline.label(),
            walk,
            unresolved_after: count(SlotState::Unresolved),
            succeeded_after: count(SlotState::Succeeded),
            failed_after: count(SlotState::Failed),
        };
        info!(
            phase,
            pipeline = summary.pipeline,
            nodes = walk.nodes_visited,
            members = walk.members_visited,
            unresolved = summary.unresolved_after,
            succeeded = summary.succeeded_after,
            "Pass complete"
        );
        summary
    }

    /// Resolve every declared slot in the scene.
    ///
    /// Changed owners are reported to `persistence` once per pipeline
    /// invocation in which they changed.
    #[instrument(
        skip_all,
        fields(pipeline = self.pipelines.name(), context = self.contexts.name())
    )]
    pub fn resolve(
        &self,
        scene: &mut dyn SceneModel,
        persistence: &mut dyn PersistenceHook,
    ) -> Resolution {
        let mut ctx = self.context(scene, persistence);
        let mut passes = vec![self.run_phase(&mut ctx, 0)];

        let needs_second_pass = ctx.services.unresolved_count() > 0;
        if self.second_pass && needs_second_pass && !ctx.is_cancelled() {
            if let Some(ancestors) = ctx.services.ancestors.as_mut() {
                ancestors.reset();
            }
            passes.push(self.run_phase(&mut ctx, 1));
        }

        let cancellation = ctx.cancellation().cloned();
        let mut buckets = ctx.into_services().buckets.unwrap_or_default();
        if let Some(reason) = &cancellation {
            warn!("Resolution cancelled: {}", reason);
        } else if self.fail_leftovers {
            let failed = buckets.fail_unresolved();
            if failed > 0 {
                info!(failed, "Unresolved slots moved to failed");
            }
        }

        Resolution {
            buckets,
            passes,
            cancellation,
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::standard()
    }
}

/// Final buckets and per-pass statistics of a resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    buckets: Classification,
    passes: Vec<PassSummary>,
    cancellation: Option<PipelineError>,
}

impl Resolution {
    pub fn buckets(&self) -> &Classification {
        &self.buckets
    }

    pub fn into_buckets(self) -> Classification {
        self.buckets
    }

    pub fn passes(&self) -> &[PassSummary] {
        &self.passes
    }

    pub fn cancellation(&self) -> Option<&PipelineError> {
        self.cancellation.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_some()
    }

    /// Every discovered slot ended up succeeded
    pub fn is_complete(&self) -> bool {
        !self.is_cancelled() && self.buckets.unresolved.is_empty() && self.buckets.failed.is_empty()
    }

    pub fn state_of(&self, owner: MemberId, slot: &str) -> Option<SlotState> {
        self.buckets.state_of(&crate::slot::SlotKey {
            owner,
            name: slot.to_string(),
        })
    }

    /// Serializable report, with objects labelled by the scene
    pub fn report(&self, scene: &dyn SceneModel) -> ResolutionReport {
        let mut slots = Vec::with_capacity(self.buckets.len());
        for state in [SlotState::Succeeded, SlotState::Failed, SlotState::Unresolved] {
            for slot in self.buckets.bucket(state).iter() {
                slots.push(SlotReport {
                    owner: scene.describe(slot.owner().into()),
                    slot: slot.name().to_string(),
                    declared_type: slot.declared_type().to_string(),
                    policy: slot.policy().id(),
                    tag: slot.tag().map(str::to_string),
                    state,
                    value: slot.get(scene).map(|value| scene.describe(value)),
                });
            }
        }

        ResolutionReport {
            summary: ReportSummary {
                succeeded: self.buckets.succeeded.len(),
                failed: self.buckets.failed.len(),
                unresolved: self.buckets.unresolved.len(),
                cancelled: self.cancellation.as_ref().map(|reason| reason.to_string()),
            },
            passes: self.passes.clone(),
            slots,
        }
    }
}

/// Printable view of a [`Resolution`]
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub summary: ReportSummary,
    pub passes: Vec<PassSummary>,
    pub slots: Vec<SlotReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub unresolved: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotReport {
    pub owner: String,
    pub slot: String,
    pub declared_type: String,
    pub policy: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub state: SlotState,
    pub value: Option<String>,
}
