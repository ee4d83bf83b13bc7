//! Slot discovery: turns an owner's annotated fields into slots.

use crate::policy::{BindContext, PolicyRegistry};
use crate::scene::SceneModel;
use crate::slot::Slot;
use crate::tree::AncestorTracker;
use crate::types::{MemberId, ObjectRef};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Result of discovering one owner's slots
#[derive(Debug, Default)]
pub struct Discovery {
    /// Slots that need traversal-wide matching
    pub pending: Vec<Slot>,
    /// One-shot slots bound at discovery
    pub succeeded: Vec<Slot>,
    /// One-shot slots that found nothing
    pub failed: Vec<Slot>,
    /// Annotated fields that already held a value
    pub pre_satisfied: usize,
    /// Annotated fields naming an unregistered policy
    pub misconfigured: usize,
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.succeeded.is_empty() && self.failed.is_empty()
    }
}

/// Capability: produce the slots declared by an owner.
///
/// Any implementation (static tables, generated code, scene introspection) is
/// interchangeable. One-shot policies are resolved inside `discover`.
pub trait SlotDiscoverer {
    fn discover(
        &self,
        scene: &mut dyn SceneModel,
        ancestors: &AncestorTracker,
        owner: MemberId,
    ) -> Discovery;
}

/// Default discoverer: reads field declarations from the scene model.
#[derive(Clone)]
pub struct SlotFactory {
    policies: Arc<PolicyRegistry>,
    include_inherited: bool,
}

impl SlotFactory {
    pub fn new(policies: Arc<PolicyRegistry>) -> Self {
        Self {
            policies,
            include_inherited: false,
        }
    }

    /// Also discover fields declared on base types of the owner's type
    pub fn with_inherited(mut self, include_inherited: bool) -> Self {
        self.include_inherited = include_inherited;
        self
    }

    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }
}

impl SlotDiscoverer for SlotFactory {
    fn discover(
        &self,
        scene: &mut dyn SceneModel,
        ancestors: &AncestorTracker,
        owner: MemberId,
    ) -> Discovery {
        let mut discovery = Discovery::default();

        for field in scene.declared_fields(owner, self.include_inherited) {
            let Some(inject) = &field.def.inject else {
                continue;
            };
            let Some(policy) = self.policies.get(&inject.policy) else {
                error!(
                    owner = %owner,
                    field = %field.def.name,
                    policy = %inject.policy,
                    "Unknown matching policy, slot skipped"
                );
                discovery.misconfigured += 1;
                continue;
            };

            let slot = Slot::new(owner, &field, inject.tag.clone(), policy);

            if slot.get(&*scene).is_some() {
                trace!(slot = %slot.key(), "Slot already satisfied");
                discovery.pre_satisfied += 1;
                continue;
            }

            if slot.policy().is_one_shot() {
                let mut ctx = BindContext::new(&mut *scene, ancestors);
                if slot.policy().try_bind(ObjectRef::Member(owner), &slot, &mut ctx) {
                    discovery.succeeded.push(slot);
                } else {
                    debug!(slot = %slot.key(), "One-shot slot found no match");
                    discovery.failed.push(slot);
                }
                continue;
            }

            discovery.pending.push(slot);
        }

        discovery
    }
}
