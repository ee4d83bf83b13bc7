//! Slot abstraction
//!
//! A [`Slot`] wraps one declared dependency request: the owning member, the
//! field name, its declared type and the matching policy bound to it. Values
//! are never cached on the slot; reads and writes go through the scene.

pub mod factory;

pub use factory::{Discovery, SlotDiscoverer, SlotFactory};

use crate::error::SceneError;
use crate::policy::MatchingPolicy;
use crate::scene::{DeclaredField, SceneModel};
use crate::types::{MemberId, ObjectRef, TypeName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a slot: owner plus field name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub owner: MemberId,
    pub name: String,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// One dependency request awaiting a value
#[derive(Clone)]
pub struct Slot {
    owner: MemberId,
    name: String,
    declared_type: TypeName,
    declared_by: TypeName,
    tag: Option<String>,
    policy: Arc<dyn MatchingPolicy>,
}

impl Slot {
    pub fn new(
        owner: MemberId,
        field: &DeclaredField,
        tag: Option<String>,
        policy: Arc<dyn MatchingPolicy>,
    ) -> Self {
        Self {
            owner,
            name: field.def.name.clone(),
            declared_type: field.def.declared_type.clone(),
            declared_by: field.declared_by.clone(),
            tag,
            policy,
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey {
            owner: self.owner,
            name: self.name.clone(),
        }
    }

    pub fn owner(&self) -> MemberId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &TypeName {
        &self.declared_type
    }

    /// Type that declared the field (differs from the owner's type for inherited fields)
    pub fn declared_by(&self) -> &TypeName {
        &self.declared_by
    }

    /// Tag argument from the injection annotation
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn policy(&self) -> &Arc<dyn MatchingPolicy> {
        &self.policy
    }

    /// Current value of the slot
    pub fn get(&self, scene: &dyn SceneModel) -> Option<ObjectRef> {
        scene.field_value(self.owner, &self.name)
    }

    /// Write a value into the slot
    pub fn set(&self, scene: &mut dyn SceneModel, value: ObjectRef) -> Result<(), SceneError> {
        scene.set_field_value(self.owner, &self.name, value)
    }

    /// Whether the candidate's runtime type is assignable to the declared type
    pub fn accepts(&self, scene: &dyn SceneModel, candidate: ObjectRef) -> bool {
        match scene.type_of(candidate) {
            Some(candidate_type) => scene.is_assignable(&candidate_type, &self.declared_type),
            None => false,
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("policy", &self.policy.id())
            .field("tag", &self.tag)
            .finish()
    }
}
