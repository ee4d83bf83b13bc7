//! Built-in pipeline stages

use super::{RunContext, Stage};
use crate::error::PipelineError;
use crate::policy::BindContext;
use crate::services::{require, require_mut};
use crate::types::ObjectRef;
use tracing::{debug, trace};

const ANCESTOR_TRACKER: &str = "ancestor tracker";
const SLOT_DISCOVERER: &str = "slot discoverer";
const BUCKETS: &str = "classification buckets";
const CHANGE_TRACKER: &str = "change tracker";

/// Keeps the ancestor path in step with the current container node.
#[derive(Debug, Default, Clone, Copy)]
pub struct AncestorUpdateStage;

impl Stage for AncestorUpdateStage {
    fn name(&self) -> &'static str {
        "ancestor-update"
    }

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<(), PipelineError> {
        let Some(ObjectRef::Node(node)) = ctx.current() else {
            return Ok(());
        };
        let parent = ctx.scene.parent(node);
        let ancestors = require_mut(ctx.services.ancestors.as_mut(), ANCESTOR_TRACKER)?;
        ancestors.enter(node, parent);
        trace!(node = %node, depth = ancestors.depth(), "Ancestor path updated");
        Ok(())
    }
}

/// Discovers the slots of the current member and classifies them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlotDiscoveryStage;

impl Stage for SlotDiscoveryStage {
    fn name(&self) -> &'static str {
        "slot-discovery"
    }

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<(), PipelineError> {
        let Some(ObjectRef::Member(owner)) = ctx.current() else {
            return Ok(());
        };
        let services = &mut ctx.services;
        let ancestors = require(services.ancestors.as_ref(), ANCESTOR_TRACKER)?;
        let discoverer = require(services.discoverer.as_deref(), SLOT_DISCOVERER)?;
        let buckets = require_mut(services.buckets.as_mut(), BUCKETS)?;
        let changes = require_mut(services.changes.as_mut(), CHANGE_TRACKER)?;

        let discovery = discoverer.discover(&mut *ctx.scene, ancestors, owner);
        if discovery.is_empty() {
            return Ok(());
        }
        debug!(
            owner = %owner,
            pending = discovery.pending.len(),
            one_shot_succeeded = discovery.succeeded.len(),
            one_shot_failed = discovery.failed.len(),
            "Slots discovered"
        );

        if !discovery.succeeded.is_empty() {
            changes.record(owner);
        }
        for slot in discovery.pending {
            buckets.add_unresolved(slot);
        }
        for slot in discovery.succeeded {
            buckets.record_succeeded(slot);
        }
        for slot in discovery.failed {
            buckets.record_failed(slot);
        }
        Ok(())
    }
}

/// Offers the current object to every unresolved slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlotMatchingStage;

impl Stage for SlotMatchingStage {
    fn name(&self) -> &'static str {
        "slot-matching"
    }

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<(), PipelineError> {
        let Some(candidate) = ctx.current() else {
            return Ok(());
        };
        let services = &mut ctx.services;
        let ancestors = require(services.ancestors.as_ref(), ANCESTOR_TRACKER)?;
        let buckets = require_mut(services.buckets.as_mut(), BUCKETS)?;
        let changes = require_mut(services.changes.as_mut(), CHANGE_TRACKER)?;

        if buckets.unresolved.is_empty() {
            return Ok(());
        }

        let mut bind = BindContext::new(&mut *ctx.scene, ancestors);
        for slot in buckets.unresolved.snapshot() {
            if slot.policy().try_bind(candidate, &slot, &mut bind) && buckets.promote(&slot.key()) {
                changes.record(slot.owner());
            }
        }
        Ok(())
    }
}

/// Reports every changed owner to the persistence hook once.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinalizeStage;

impl Stage for FinalizeStage {
    fn name(&self) -> &'static str {
        "finalize"
    }

    fn run(&self, ctx: &mut RunContext<'_>) -> Result<(), PipelineError> {
        let changes = require_mut(ctx.services.changes.as_mut(), CHANGE_TRACKER)?;
        for owner in changes.drain() {
            trace!(owner = %owner, "Marking owner changed");
            ctx.persistence.mark_changed(owner);
        }
        Ok(())
    }
}
