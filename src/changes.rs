//! Change tracking and the persistence hook.

use crate::types::MemberId;
use std::collections::BTreeSet;

/// Host-side persistence: called once per changed owner when a pipeline finalizes.
pub trait PersistenceHook {
    fn mark_changed(&mut self, member: MemberId);
}

/// Owners that received a new slot value since the last drain
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    changed: BTreeSet<MemberId>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the owner was not already recorded
    pub fn record(&mut self, member: MemberId) -> bool {
        self.changed.insert(member)
    }

    pub fn contains(&self, member: MemberId) -> bool {
        self.changed.contains(&member)
    }

    /// Take every recorded owner, leaving the tracker empty
    pub fn drain(&mut self) -> Vec<MemberId> {
        std::mem::take(&mut self.changed).into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Persistence hook that only remembers what it was told
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changed: BTreeSet<MemberId>,
    calls: usize,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changed(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.changed.iter().copied()
    }

    pub fn contains(&self, member: MemberId) -> bool {
        self.changed.contains(&member)
    }

    /// Number of `mark_changed` calls received
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

impl PersistenceHook for ChangeLog {
    fn mark_changed(&mut self, member: MemberId) {
        self.calls += 1;
        self.changed.insert(member);
    }
}
