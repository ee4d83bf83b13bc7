//! Traversal driver for the resolution pipeline
//!
//! Depth-first pre-order over the host tree: a container node is visited, then
//! its attached members in enumeration order, then its child containers in
//! enumeration order. Uses an explicit stack, so tree depth never grows the
//! call stack.

use crate::pipeline::{Pipeline, RunContext};
use crate::types::{NodeId, ObjectRef};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Deepest node depth to visit, roots are depth 0 (None = unlimited)
    pub max_depth: Option<usize>,
}

/// Counters collected during one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    pub nodes_visited: usize,
    pub members_visited: usize,
    /// Subtrees skipped for exceeding `max_depth`
    pub skipped_depth: usize,
    /// Nodes reached more than once
    pub skipped_revisits: usize,
    pub cancelled: bool,
}

/// Drives a pipeline over every object of the scene
#[derive(Debug, Clone, Default)]
pub struct Walker {
    config: WalkerConfig,
}

impl Walker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WalkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Walk the tree, running `pipeline` once per visited object.
    ///
    /// Stops at the first object after which the run context is cancelled.
    pub fn walk(&self, ctx: &mut RunContext<'_>, pipeline: &Pipeline) -> WalkStats {
        let mut stats = WalkStats::default();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<(NodeId, usize)> =
            ctx.scene.roots().into_iter().rev().map(|root| (root, 0)).collect();

        while let Some((node, depth)) = stack.pop() {
            if self.config.max_depth.is_some_and(|max| depth > max) {
                warn!(node = %node, depth, "Maximum depth exceeded, subtree skipped");
                stats.skipped_depth += 1;
                continue;
            }
            if !visited.insert(node) {
                warn!(node = %node, "Node reached twice, skipped");
                stats.skipped_revisits += 1;
                continue;
            }

            stats.nodes_visited += 1;
            if !Self::visit(ctx, pipeline, ObjectRef::Node(node)) {
                stats.cancelled = true;
                break;
            }

            for member in ctx.scene.attached_members(node) {
                stats.members_visited += 1;
                if !Self::visit(ctx, pipeline, ObjectRef::Member(member)) {
                    stats.cancelled = true;
                    break;
                }
            }
            if stats.cancelled {
                break;
            }

            stack.extend(
                ctx.scene
                    .children(node)
                    .into_iter()
                    .rev()
                    .map(|child| (child, depth + 1)),
            );
        }

        ctx.set_current(None);
        debug!(
            pipeline = pipeline.label(),
            nodes = stats.nodes_visited,
            members = stats.members_visited,
            cancelled = stats.cancelled,
            "Walk finished"
        );
        stats
    }

    /// Returns false once the run has been cancelled
    fn visit(ctx: &mut RunContext<'_>, pipeline: &Pipeline, object: ObjectRef) -> bool {
        ctx.set_current(Some(object));
        pipeline.run(ctx);
        !ctx.is_cancelled()
    }
}
