//! Shared identifiers for objects in a resolution tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a container node in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Index of an attached member in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member#{}", self.0)
    }
}

/// Any object that can be visited, matched as a candidate, or stored in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectRef {
    /// A structural container node
    Node(NodeId),
    /// A member attached to exactly one container node
    Member(MemberId),
}

impl ObjectRef {
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            ObjectRef::Node(id) => Some(id),
            ObjectRef::Member(_) => None,
        }
    }

    pub fn as_member(self) -> Option<MemberId> {
        match self {
            ObjectRef::Member(id) => Some(id),
            ObjectRef::Node(_) => None,
        }
    }
}

impl From<NodeId> for ObjectRef {
    fn from(id: NodeId) -> Self {
        ObjectRef::Node(id)
    }
}

impl From<MemberId> for ObjectRef {
    fn from(id: MemberId) -> Self {
        ObjectRef::Member(id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Node(id) => id.fmt(f),
            ObjectRef::Member(id) => id.fmt(f),
        }
    }
}

/// Name of a runtime type in the scene's type registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
