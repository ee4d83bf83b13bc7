//! Host scene model
//!
//! The resolution engine only talks to the host through [`SceneModel`]. [`Scene`]
//! is the in-memory implementation used by the CLI and the tests: an arena of
//! container nodes and attached members plus a [`TypeRegistry`].

pub mod document;
pub mod types;

pub use document::SceneDocument;
pub use types::{DeclaredField, FieldDef, Inject, TypeDef, TypeRegistry, NODE_TYPE};

use crate::error::SceneError;
use crate::tree::TreeProvider;
use crate::types::{MemberId, NodeId, ObjectRef, TypeName};
use std::collections::BTreeMap;

/// What the resolution engine needs from a host beyond tree enumeration.
///
/// Implementations must never panic on ids they do not know; they answer
/// `None`, an empty list or an error instead.
pub trait SceneModel: TreeProvider {
    /// Runtime type of an object
    fn type_of(&self, object: ObjectRef) -> Option<TypeName>;

    /// Symbolic tag carried by an object
    fn tag_of(&self, object: ObjectRef) -> Option<&str>;

    /// Whether a value of type `from` may be stored in a slot of type `to`
    fn is_assignable(&self, from: &TypeName, to: &TypeName) -> bool;

    /// Fields declared for a member's concrete type
    fn declared_fields(&self, member: MemberId, include_inherited: bool) -> Vec<DeclaredField>;

    /// Current value stored in a member's field
    fn field_value(&self, member: MemberId, field: &str) -> Option<ObjectRef>;

    /// Store a value in a member's field
    fn set_field_value(
        &mut self,
        member: MemberId,
        field: &str,
        value: ObjectRef,
    ) -> Result<(), SceneError>;

    /// Human-readable label used in reports
    fn describe(&self, object: ObjectRef) -> String {
        object.to_string()
    }
}

/// Container node record
#[derive(Debug, Clone)]
pub struct NodeData {
    pub name: String,
    pub tag: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub members: Vec<MemberId>,
    /// Stable identifier used by scene documents
    pub id: Option<String>,
}

/// Attached member record
#[derive(Debug, Clone)]
pub struct MemberData {
    pub type_name: TypeName,
    pub node: NodeId,
    pub values: BTreeMap<String, ObjectRef>,
    /// Stable identifier used by scene documents
    pub id: Option<String>,
}

/// In-memory scene
#[derive(Debug, Clone, Default)]
pub struct Scene {
    types: TypeRegistry,
    nodes: Vec<NodeData>,
    members: Vec<MemberData>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            nodes: Vec::new(),
            members: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    /// Add a new root container node
    pub fn add_root(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.push_node(name.into(), None);
        self.roots.push(id);
        id
    }

    /// Add a container node as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId, SceneError> {
        if parent.0 >= self.nodes.len() {
            return Err(SceneError::NodeNotFound(parent));
        }
        let id = self.push_node(name.into(), Some(parent));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Attach a new member of `type_name` as the last member of `node`
    pub fn attach(&mut self, node: NodeId, type_name: impl Into<TypeName>) -> Result<MemberId, SceneError> {
        let type_name = type_name.into();
        let data = self
            .nodes
            .get_mut(node.0)
            .ok_or(SceneError::NodeNotFound(node))?;
        if !self.types.contains(&type_name) {
            return Err(SceneError::UnknownType(type_name.to_string()));
        }
        let id = MemberId(self.members.len());
        data.members.push(id);
        self.members.push(MemberData {
            type_name,
            node,
            values: BTreeMap::new(),
            id: None,
        });
        Ok(id)
    }

    pub fn set_tag(&mut self, node: NodeId, tag: impl Into<String>) -> Result<(), SceneError> {
        let data = self
            .nodes
            .get_mut(node.0)
            .ok_or(SceneError::NodeNotFound(node))?;
        data.tag = Some(tag.into());
        Ok(())
    }

    pub fn set_node_id(&mut self, node: NodeId, id: impl Into<String>) -> Result<(), SceneError> {
        let data = self
            .nodes
            .get_mut(node.0)
            .ok_or(SceneError::NodeNotFound(node))?;
        data.id = Some(id.into());
        Ok(())
    }

    pub fn set_member_id(&mut self, member: MemberId, id: impl Into<String>) -> Result<(), SceneError> {
        let data = self
            .members
            .get_mut(member.0)
            .ok_or(SceneError::MemberNotFound(member))?;
        data.id = Some(id.into());
        Ok(())
    }

    /// Remove a stored field value, making the slot empty again
    pub fn clear_field_value(&mut self, member: MemberId, field: &str) -> Result<Option<ObjectRef>, SceneError> {
        let data = self
            .members
            .get_mut(member.0)
            .ok_or(SceneError::MemberNotFound(member))?;
        Ok(data.values.remove(field))
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    pub fn member(&self, id: MemberId) -> Option<&MemberData> {
        self.members.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn member_ids(&self) -> impl Iterator<Item = MemberId> {
        (0..self.members.len()).map(MemberId)
    }

    fn node_path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Some(node) => {
                    segments.push(node.name.as_str());
                    current = node.parent;
                }
                None => break,
            }
        }
        segments.reverse();
        segments.join("/")
    }

    fn push_node(&mut self, name: String, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name,
            tag: None,
            parent,
            children: Vec::new(),
            members: Vec::new(),
            id: None,
        });
        id
    }
}

impl TreeProvider for Scene {
    fn roots(&self) -> Vec<NodeId> {
        self.roots.clone()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn attached_members(&self, node: NodeId) -> Vec<MemberId> {
        self.node(node).map(|n| n.members.clone()).unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn container_of(&self, member: MemberId) -> Option<NodeId> {
        self.member(member).map(|m| m.node)
    }
}

impl SceneModel for Scene {
    fn type_of(&self, object: ObjectRef) -> Option<TypeName> {
        match object {
            ObjectRef::Node(id) => self.node(id).map(|_| TypeName::from(NODE_TYPE)),
            ObjectRef::Member(id) => self.member(id).map(|m| m.type_name.clone()),
        }
    }

    fn tag_of(&self, object: ObjectRef) -> Option<&str> {
        let node = match object {
            ObjectRef::Node(id) => id,
            ObjectRef::Member(id) => self.member(id)?.node,
        };
        self.node(node)?.tag.as_deref()
    }

    fn is_assignable(&self, from: &TypeName, to: &TypeName) -> bool {
        self.types.is_assignable(from, to)
    }

    fn declared_fields(&self, member: MemberId, include_inherited: bool) -> Vec<DeclaredField> {
        match self.member(member) {
            Some(data) => self.types.declared_fields(&data.type_name, include_inherited),
            None => Vec::new(),
        }
    }

    fn field_value(&self, member: MemberId, field: &str) -> Option<ObjectRef> {
        self.member(member)?.values.get(field).copied()
    }

    fn set_field_value(
        &mut self,
        member: MemberId,
        field: &str,
        value: ObjectRef,
    ) -> Result<(), SceneError> {
        let type_name = self
            .member(member)
            .map(|m| m.type_name.clone())
            .ok_or(SceneError::MemberNotFound(member))?;
        if self.types.find_field(&type_name, field).is_none() {
            return Err(SceneError::FieldNotFound {
                member,
                field: field.to_string(),
            });
        }
        self.members[member.0].values.insert(field.to_string(), value);
        Ok(())
    }

    /// Node path for nodes, `path:Type` for members
    fn describe(&self, object: ObjectRef) -> String {
        match object {
            ObjectRef::Node(id) => self.node_path(id),
            ObjectRef::Member(id) => match self.member(id) {
                Some(member) => format!("{}:{}", self.node_path(member.node), member.type_name),
                None => id.to_string(),
            },
        }
    }
}
