//! Built-in matching policies.
//!
//! Position-aware policies infer tree position from visitation order plus the
//! ancestor path: when a candidate is current, the tracker holds the path from
//! the root to the candidate's container.

use super::{BindContext, MatchingPolicy};
use crate::slot::Slot;
use crate::types::ObjectRef;

/// Policy identifiers as written in injection annotations
pub mod ids {
    pub const SELF: &str = "self";
    pub const ANY_DESCENDANT: &str = "any-descendant";
    pub const ANY_ANCESTOR: &str = "any-ancestor";
    pub const SELF_OR_DESCENDANT: &str = "self-or-descendant";
    pub const ANY: &str = "any";
    pub const BY_TAG: &str = "by-tag";
    pub const ONE_SHOT_SELF: &str = "one-shot-self";
}

/// Binds a member attached to the same container node as the owner.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelfPolicy;

impl MatchingPolicy for SelfPolicy {
    fn id(&self) -> &'static str {
        ids::SELF
    }

    fn try_bind(&self, candidate: ObjectRef, slot: &Slot, ctx: &mut BindContext<'_>) -> bool {
        let Some(candidate_member) = candidate.as_member() else {
            return false;
        };
        let (Some(owner_node), Some(candidate_node)) = (
            ctx.owner_container(slot),
            ctx.scene.container_of(candidate_member),
        ) else {
            return false;
        };

        owner_node == candidate_node && ctx.accepts(slot, candidate) && ctx.bind(slot, candidate)
    }
}

/// Binds any object visited underneath the owner's container.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyDescendantPolicy;

impl MatchingPolicy for AnyDescendantPolicy {
    fn id(&self) -> &'static str {
        ids::ANY_DESCENDANT
    }

    fn try_bind(&self, candidate: ObjectRef, slot: &Slot, ctx: &mut BindContext<'_>) -> bool {
        let Some(owner_node) = ctx.owner_container(slot) else {
            return false;
        };

        ctx.ancestors.contains(owner_node)
            && ctx.accepts(slot, candidate)
            && ctx.bind(slot, candidate)
    }
}

/// Binds any object visited while the owner's container is off the current path.
///
/// This matches "anything outside the current lineage", which includes but is
/// not limited to real ancestors. The condition is kept as is; see DESIGN.md.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyAncestorPolicy;

impl MatchingPolicy for AnyAncestorPolicy {
    fn id(&self) -> &'static str {
        ids::ANY_ANCESTOR
    }

    fn try_bind(&self, candidate: ObjectRef, slot: &Slot, ctx: &mut BindContext<'_>) -> bool {
        let Some(owner_node) = ctx.owner_container(slot) else {
            return false;
        };

        !ctx.ancestors.contains(owner_node)
            && ctx.accepts(slot, candidate)
            && ctx.bind(slot, candidate)
    }
}

/// Binds objects in the owner's container or anywhere below it.
///
/// A bind in the descendant case counts as success, so the slot leaves
/// Unresolved as soon as its value is written.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelfOrDescendantPolicy;

impl MatchingPolicy for SelfOrDescendantPolicy {
    fn id(&self) -> &'static str {
        ids::SELF_OR_DESCENDANT
    }

    fn try_bind(&self, candidate: ObjectRef, slot: &Slot, ctx: &mut BindContext<'_>) -> bool {
        let Some(owner_node) = ctx.owner_container(slot) else {
            return false;
        };
        if !ctx.accepts(slot, candidate) {
            return false;
        }

        if ctx.ancestors.current() == Some(owner_node) {
            return ctx.bind(slot, candidate);
        }
        if ctx.ancestors.contains(owner_node) {
            return ctx.bind(slot, candidate);
        }
        false
    }
}

/// Binds the first type-compatible candidate anywhere in the tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyPolicy;

impl MatchingPolicy for AnyPolicy {
    fn id(&self) -> &'static str {
        ids::ANY
    }

    fn try_bind(&self, candidate: ObjectRef, slot: &Slot, ctx: &mut BindContext<'_>) -> bool {
        ctx.accepts(slot, candidate) && ctx.bind(slot, candidate)
    }
}

/// Binds a type-compatible candidate carrying the slot's tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByTagPolicy;

impl MatchingPolicy for ByTagPolicy {
    fn id(&self) -> &'static str {
        ids::BY_TAG
    }

    fn try_bind(&self, candidate: ObjectRef, slot: &Slot, ctx: &mut BindContext<'_>) -> bool {
        let Some(wanted) = slot.tag() else {
            return false;
        };
        if ctx.scene.tag_of(candidate) != Some(wanted) {
            return false;
        }

        ctx.accepts(slot, candidate) && ctx.bind(slot, candidate)
    }
}

/// One-shot self resolution, run once at discovery.
///
/// The candidate is the owner itself; the policy searches the owner's own
/// container, members first in enumeration order, then the container node.
#[derive(Debug, Default, Clone, Copy)]
pub struct OneShotSelfPolicy;

impl MatchingPolicy for OneShotSelfPolicy {
    fn id(&self) -> &'static str {
        ids::ONE_SHOT_SELF
    }

    fn is_one_shot(&self) -> bool {
        true
    }

    fn try_bind(&self, candidate: ObjectRef, slot: &Slot, ctx: &mut BindContext<'_>) -> bool {
        let (Some(owner_node), Some(candidate_node)) =
            (ctx.owner_container(slot), ctx.candidate_container(candidate))
        else {
            return false;
        };
        if owner_node != candidate_node {
            return false;
        }

        let found = ctx
            .scene
            .attached_members(owner_node)
            .into_iter()
            .map(ObjectRef::Member)
            .chain(std::iter::once(ObjectRef::Node(owner_node)))
            .find(|&object| ctx.accepts(slot, object));

        match found {
            Some(object) => ctx.bind(slot, object),
            None => false,
        }
    }
}
