//! Pipeline and run context
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s run once per visited object.
//! Stages share a [`RunContext`]; a failing stage cancels the rest of the
//! invocation and the traversal driver stops at the next object.

pub mod stages;

pub use stages::{AncestorUpdateStage, FinalizeStage, SlotDiscoveryStage, SlotMatchingStage};

use crate::changes::PersistenceHook;
use crate::error::PipelineError;
use crate::scene::SceneModel;
use crate::services::ServiceRegistry;
use crate::types::ObjectRef;
use tracing::error;

/// Mutable state threaded through every stage of a resolution run
pub struct RunContext<'a> {
    pub scene: &'a mut dyn SceneModel,
    pub persistence: &'a mut dyn PersistenceHook,
    pub services: ServiceRegistry,
    current: Option<ObjectRef>,
    phase: usize,
    cancellation: Option<PipelineError>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        scene: &'a mut dyn SceneModel,
        persistence: &'a mut dyn PersistenceHook,
        services: ServiceRegistry,
    ) -> Self {
        Self {
            scene,
            persistence,
            services,
            current: None,
            phase: 0,
            cancellation: None,
        }
    }

    /// Object currently being visited
    pub fn current(&self) -> Option<ObjectRef> {
        self.current
    }

    pub fn set_current(&mut self, object: Option<ObjectRef>) {
        self.current = object;
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn set_phase(&mut self, phase: usize) {
        self.phase = phase;
    }

    /// Request cancellation; the first reason wins
    pub fn cancel(&mut self, reason: PipelineError) {
        if self.cancellation.is_none() {
            self.cancellation = Some(reason);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_some()
    }

    pub fn cancellation(&self) -> Option<&PipelineError> {
        self.cancellation.as_ref()
    }

    pub fn into_services(self) -> ServiceRegistry {
        self.services
    }
}

/// One discrete processing step
pub trait Stage {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<(), PipelineError>;
}

/// Ordered, cancellable list of stages
pub struct Pipeline {
    label: &'static str,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage against the current object, stopping once cancelled
    pub fn run(&self, ctx: &mut RunContext<'_>) {
        for stage in &self.stages {
            if ctx.is_cancelled() {
                break;
            }
            if let Err(e) = stage.run(ctx) {
                error!(
                    pipeline = self.label,
                    stage = stage.name(),
                    current = ?ctx.current(),
                    "Stage failed, cancelling pipeline: {}",
                    e
                );
                ctx.cancel(e);
            }
        }
    }

    /// Phase "collect": hierarchy, discovery, matching, finalize
    pub fn collect() -> Self {
        Pipeline::new("collect")
            .with_stage(AncestorUpdateStage)
            .with_stage(SlotDiscoveryStage)
            .with_stage(SlotMatchingStage)
            .with_stage(FinalizeStage)
    }

    /// Phase "process-only": discovery skipped, Unresolved reused
    pub fn process_only() -> Self {
        Pipeline::new("process-only")
            .with_stage(AncestorUpdateStage)
            .with_stage(SlotMatchingStage)
            .with_stage(FinalizeStage)
    }
}

/// Produces the stage list for a given phase
pub trait PipelineBuilder: Send + Sync {
    fn name(&self) -> &'static str;

    fn build(&self, phase: usize) -> Pipeline;
}

/// Collect on phase 0, process-only afterwards
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardPipelineBuilder;

impl PipelineBuilder for StandardPipelineBuilder {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn build(&self, phase: usize) -> Pipeline {
        if phase == 0 {
            Pipeline::collect()
        } else {
            Pipeline::process_only()
        }
    }
}

/// Collect on every phase, for hosts whose scene changes between passes
#[derive(Debug, Default, Clone, Copy)]
pub struct RediscoverPipelineBuilder;

impl PipelineBuilder for RediscoverPipelineBuilder {
    fn name(&self) -> &'static str {
        "rediscover"
    }

    fn build(&self, _phase: usize) -> Pipeline {
        Pipeline::collect()
    }
}
