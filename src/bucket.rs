//! Classification buckets
//!
//! Three keyed multimaps (owner -> slots) that hold the resolution state of every
//! discovered slot. [`Classification`] keeps them mutually exclusive: a slot is
//! in at most one bucket at any time.

use crate::slot::{Slot, SlotKey};
use crate::types::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolution state of a discovered slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Unresolved,
    Succeeded,
    Failed,
}

impl SlotState {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotState::Unresolved => "unresolved",
            SlotState::Succeeded => "succeeded",
            SlotState::Failed => "failed",
        }
    }
}

/// Owner -> slots keyed by slot name
#[derive(Debug, Clone, Default)]
pub struct SlotBucket {
    slots: BTreeMap<MemberId, BTreeMap<String, Slot>>,
}

impl SlotBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a slot, replacing one with the same key
    pub fn insert(&mut self, slot: Slot) -> Option<Slot> {
        self.slots
            .entry(slot.owner())
            .or_default()
            .insert(slot.name().to_string(), slot)
    }

    pub fn remove(&mut self, key: &SlotKey) -> Option<Slot> {
        let owned = self.slots.get_mut(&key.owner)?;
        let removed = owned.remove(&key.name);
        if owned.is_empty() {
            self.slots.remove(&key.owner);
        }
        removed
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &SlotKey) -> Option<&Slot> {
        self.slots.get(&key.owner)?.get(&key.name)
    }

    /// Slots of one owner, ordered by name
    pub fn slots_of(&self, owner: MemberId) -> impl Iterator<Item = &Slot> {
        self.slots.get(&owner).into_iter().flat_map(|owned| owned.values())
    }

    pub fn owners(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.slots.keys().copied()
    }

    /// All slots, ordered by owner then name
    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values().flat_map(|owned| owned.values())
    }

    pub fn keys(&self) -> Vec<SlotKey> {
        self.iter().map(Slot::key).collect()
    }

    /// Owned copy of every slot, safe to iterate while the bucket changes
    pub fn snapshot(&self) -> Vec<Slot> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// The three resolution buckets
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub unresolved: SlotBucket,
    pub succeeded: SlotBucket,
    pub failed: SlotBucket,
}

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a slot in Unresolved, taking it out of any other bucket
    pub fn add_unresolved(&mut self, slot: Slot) {
        self.place(slot, SlotState::Unresolved);
    }

    pub fn record_succeeded(&mut self, slot: Slot) {
        self.place(slot, SlotState::Succeeded);
    }

    pub fn record_failed(&mut self, slot: Slot) {
        self.place(slot, SlotState::Failed);
    }

    /// Move a slot from Unresolved to Succeeded. Returns false if it was not unresolved.
    pub fn promote(&mut self, key: &SlotKey) -> bool {
        match self.unresolved.remove(key) {
            Some(slot) => {
                self.succeeded.insert(slot);
                true
            }
            None => false,
        }
    }

    /// Move everything still unresolved into Failed
    pub fn fail_unresolved(&mut self) -> usize {
        let slots = self.unresolved.snapshot();
        self.unresolved.clear();
        let count = slots.len();
        for slot in slots {
            self.failed.insert(slot);
        }
        count
    }

    pub fn state_of(&self, key: &SlotKey) -> Option<SlotState> {
        if self.unresolved.contains(key) {
            Some(SlotState::Unresolved)
        } else if self.succeeded.contains(key) {
            Some(SlotState::Succeeded)
        } else if self.failed.contains(key) {
            Some(SlotState::Failed)
        } else {
            None
        }
    }

    pub fn bucket(&self, state: SlotState) -> &SlotBucket {
        match state {
            SlotState::Unresolved => &self.unresolved,
            SlotState::Succeeded => &self.succeeded,
            SlotState::Failed => &self.failed,
        }
    }

    /// Total number of classified slots
    pub fn len(&self) -> usize {
        self.unresolved.len() + self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn place(&mut self, slot: Slot, state: SlotState) {
        let key = slot.key();
        for other in [SlotState::Unresolved, SlotState::Succeeded, SlotState::Failed] {
            if other != state {
                self.bucket_mut(other).remove(&key);
            }
        }
        self.bucket_mut(state).insert(slot);
    }

    fn bucket_mut(&mut self, state: SlotState) -> &mut SlotBucket {
        match state {
            SlotState::Unresolved => &mut self.unresolved,
            SlotState::Succeeded => &mut self.succeeded,
            SlotState::Failed => &mut self.failed,
        }
    }
}
