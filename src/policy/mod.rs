//! Matching policies
//!
//! A policy decides whether a candidate object satisfies a slot and, if so,
//! writes the candidate into the slot. Policies are stateless and are looked
//! up by identifier in a [`PolicyRegistry`] built from an explicit
//! registration table.

pub mod builtin;

pub use builtin::{
    AnyAncestorPolicy, AnyDescendantPolicy, AnyPolicy, ByTagPolicy, OneShotSelfPolicy,
    SelfOrDescendantPolicy, SelfPolicy,
};

use crate::scene::SceneModel;
use crate::slot::Slot;
use crate::tree::AncestorTracker;
use crate::types::{NodeId, ObjectRef};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Strategy deciding whether a candidate satisfies a slot.
///
/// Contract: `try_bind` never panics on unexpected shapes (a node where a member
/// was expected, unknown ids, missing containers). It returns `false`. On
/// success it calls the slot setter exactly once.
pub trait MatchingPolicy: Send + Sync {
    /// Identifier used by injection annotations
    fn id(&self) -> &'static str;

    /// One-shot policies run once at discovery, with the owner as the only candidate
    fn is_one_shot(&self) -> bool {
        false
    }

    fn try_bind(&self, candidate: ObjectRef, slot: &Slot, ctx: &mut BindContext<'_>) -> bool;
}

/// What a policy may look at (and write to) while deciding.
pub struct BindContext<'a> {
    pub scene: &'a mut dyn SceneModel,
    pub ancestors: &'a AncestorTracker,
}

impl<'a> BindContext<'a> {
    pub fn new(scene: &'a mut dyn SceneModel, ancestors: &'a AncestorTracker) -> Self {
        Self { scene, ancestors }
    }

    /// Container node the slot's owner is attached to
    pub fn owner_container(&self, slot: &Slot) -> Option<NodeId> {
        self.scene.container_of(slot.owner())
    }

    /// Container node of a candidate: itself for nodes, its container for members
    pub fn candidate_container(&self, candidate: ObjectRef) -> Option<NodeId> {
        match candidate {
            ObjectRef::Node(node) => Some(node),
            ObjectRef::Member(member) => self.scene.container_of(member),
        }
    }

    pub fn accepts(&self, slot: &Slot, candidate: ObjectRef) -> bool {
        slot.accepts(&*self.scene, candidate)
    }

    /// Write `candidate` into the slot; a scene write failure counts as no match
    pub fn bind(&mut self, slot: &Slot, candidate: ObjectRef) -> bool {
        match slot.set(&mut *self.scene, candidate) {
            Ok(()) => {
                debug!(
                    slot = %slot.key(),
                    policy = slot.policy().id(),
                    candidate = %candidate,
                    "Slot bound"
                );
                true
            }
            Err(e) => {
                warn!(slot = %slot.key(), candidate = %candidate, "Slot write rejected: {}", e);
                false
            }
        }
    }
}

/// Constructor entry in the policy registration table
pub type PolicyConstructor = fn() -> Arc<dyn MatchingPolicy>;

fn construct<P: MatchingPolicy + Default + 'static>() -> Arc<dyn MatchingPolicy> {
    Arc::new(P::default())
}

/// Every policy shipped with the crate
pub const BUILTIN_POLICIES: [PolicyConstructor; 7] = [
    construct::<SelfPolicy>,
    construct::<AnyDescendantPolicy>,
    construct::<AnyAncestorPolicy>,
    construct::<SelfOrDescendantPolicy>,
    construct::<AnyPolicy>,
    construct::<ByTagPolicy>,
    construct::<OneShotSelfPolicy>,
];

/// Instantiated policies keyed by identifier
#[derive(Clone, Default)]
pub struct PolicyRegistry {
    policies: BTreeMap<&'static str, Arc<dyn MatchingPolicy>>,
}

impl PolicyRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated from [`BUILTIN_POLICIES`]
    pub fn builtin() -> Self {
        Self::from_table(&BUILTIN_POLICIES)
    }

    /// Instantiate every constructor in a registration table
    pub fn from_table(table: &[PolicyConstructor]) -> Self {
        let mut registry = Self::new();
        for constructor in table {
            registry.register(constructor());
        }
        registry
    }

    /// Register a policy, replacing any previous policy with the same id
    pub fn register(&mut self, policy: Arc<dyn MatchingPolicy>) -> Option<Arc<dyn MatchingPolicy>> {
        self.policies.insert(policy.id(), policy)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn MatchingPolicy>> {
        self.policies.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.policies.contains_key(id)
    }

    /// Registered policies, ordered by id
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn MatchingPolicy>> {
        self.policies.values()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
