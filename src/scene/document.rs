//! Scene documents: serde description of types and a node forest.
//!
//! Objects may carry an `id`; field values reference objects by id. Documents
//! are read and written as JSON or TOML, chosen by file extension.

use crate::error::SceneError;
use crate::scene::{Scene, TypeDef, TypeRegistry};
use crate::types::{MemberId, NodeId, ObjectRef, TypeName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Serialized scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub roots: Vec<NodeDocument>,
}

/// Serialized container node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDocument>,
}

/// Serialized attached member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_name: TypeName,
    /// Field name -> referenced object id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
}

/// On-disk document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick a format from a path extension; anything other than `.toml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

impl SceneDocument {
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, SceneError> {
        match format {
            DocumentFormat::Json => serde_json::from_str(content)
                .map_err(|e| SceneError::InvalidDocument(e.to_string())),
            DocumentFormat::Toml => {
                toml::from_str(content).map_err(|e| SceneError::InvalidDocument(e.to_string()))
            }
        }
    }

    pub fn render(&self, format: DocumentFormat) -> Result<String, SceneError> {
        match format {
            DocumentFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| SceneError::InvalidDocument(e.to_string())),
            DocumentFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| SceneError::InvalidDocument(e.to_string())),
        }
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, DocumentFormat::from_path(path))
    }

    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let rendered = self.render(DocumentFormat::from_path(path))?;
        std::fs::write(path, rendered)?;
        Ok(())
    }
}

impl Scene {
    /// Build a scene from a document, resolving id references
    pub fn from_document(doc: &SceneDocument) -> Result<Scene, SceneError> {
        let mut types = TypeRegistry::new();
        for def in &doc.types {
            types.register(def.clone());
        }

        let mut scene = Scene::new(types);
        let mut ids: HashMap<String, ObjectRef> = HashMap::new();
        let mut pending: Vec<(MemberId, String, String)> = Vec::new();

        // Explicit stack of (document node, parent) keeps sibling order.
        let mut stack: Vec<(&NodeDocument, Option<NodeId>)> =
            doc.roots.iter().rev().map(|node| (node, None)).collect();

        while let Some((node_doc, parent)) = stack.pop() {
            let node = match parent {
                Some(parent) => scene.add_child(parent, node_doc.name.clone())?,
                None => scene.add_root(node_doc.name.clone()),
            };
            if let Some(tag) = &node_doc.tag {
                scene.set_tag(node, tag.clone())?;
            }
            if let Some(id) = &node_doc.id {
                register_id(&mut ids, id, node.into())?;
                scene.set_node_id(node, id.clone())?;
            }

            for member_doc in &node_doc.members {
                let member = scene.attach(node, member_doc.type_name.clone())?;
                if let Some(id) = &member_doc.id {
                    register_id(&mut ids, id, member.into())?;
                    scene.set_member_id(member, id.clone())?;
                }
                for (field, reference) in &member_doc.values {
                    pending.push((member, field.clone(), reference.clone()));
                }
            }

            for child in node_doc.children.iter().rev() {
                stack.push((child, Some(node)));
            }
        }

        for (member, field, reference) in pending {
            let target = ids
                .get(&reference)
                .copied()
                .ok_or_else(|| SceneError::UnresolvedReference(reference.clone()))?;
            crate::scene::SceneModel::set_field_value(&mut scene, member, &field, target)?;
        }

        Ok(scene)
    }

    /// Serialize the scene, assigning ids to referenced objects that lack one.
    ///
    /// Generated ids never collide with explicit ones, so the written document
    /// always loads back.
    pub fn to_document(&self) -> SceneDocument {
        let mut node_ids: HashMap<NodeId, String> = HashMap::new();
        let mut member_ids: HashMap<MemberId, String> = HashMap::new();

        for id in self.node_ids() {
            if let Some(explicit) = self.node(id).and_then(|n| n.id.clone()) {
                node_ids.insert(id, explicit);
            }
        }
        for id in self.member_ids() {
            if let Some(explicit) = self.member(id).and_then(|m| m.id.clone()) {
                member_ids.insert(id, explicit);
            }
        }

        let mut taken: HashSet<String> = node_ids
            .values()
            .chain(member_ids.values())
            .cloned()
            .collect();

        for member in self.member_ids().filter_map(|id| self.member(id)) {
            for value in member.values.values() {
                match *value {
                    ObjectRef::Node(id) => {
                        node_ids
                            .entry(id)
                            .or_insert_with(|| fresh_id(&mut taken, "_n", id.0));
                    }
                    ObjectRef::Member(id) => {
                        member_ids
                            .entry(id)
                            .or_insert_with(|| fresh_id(&mut taken, "_m", id.0));
                    }
                }
            }
        }

        let roots = self.node_documents(&node_ids, &member_ids);

        let types = self
            .types()
            .definitions()
            .into_iter()
            .filter(|def| def.name.as_str() != crate::scene::NODE_TYPE)
            .cloned()
            .collect();

        SceneDocument { types, roots }
    }

    /// Build the document forest without recursion.
    ///
    /// Nodes are flattened in pre-order with the index of their parent, then
    /// folded back from the end: every child sits after its parent, so each
    /// node is complete by the time it is attached.
    fn node_documents(
        &self,
        node_ids: &HashMap<NodeId, String>,
        member_ids: &HashMap<MemberId, String>,
    ) -> Vec<NodeDocument> {
        let mut docs: Vec<NodeDocument> = Vec::new();
        let mut parents: Vec<Option<usize>> = Vec::new();
        let mut stack: Vec<(NodeId, Option<usize>)> = crate::tree::TreeProvider::roots(self)
            .into_iter()
            .rev()
            .map(|root| (root, None))
            .collect();

        while let Some((node, parent)) = stack.pop() {
            let Some(data) = self.node(node) else {
                continue;
            };
            let index = docs.len();
            docs.push(NodeDocument {
                id: node_ids.get(&node).cloned(),
                name: data.name.clone(),
                tag: data.tag.clone(),
                members: self.member_documents(&data.members, node_ids, member_ids),
                children: Vec::new(),
            });
            parents.push(parent);
            for &child in data.children.iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        let mut roots = Vec::new();
        while let Some(mut doc) = docs.pop() {
            // Children were attached last sibling first.
            doc.children.reverse();
            match parents.pop().flatten() {
                Some(parent) => docs[parent].children.push(doc),
                None => roots.push(doc),
            }
        }
        roots.reverse();
        roots
    }

    fn member_documents(
        &self,
        members: &[MemberId],
        node_ids: &HashMap<NodeId, String>,
        member_ids: &HashMap<MemberId, String>,
    ) -> Vec<MemberDocument> {
        let reference = |object: ObjectRef| -> String {
            match object {
                ObjectRef::Node(id) => node_ids.get(&id).cloned().unwrap_or_default(),
                ObjectRef::Member(id) => member_ids.get(&id).cloned().unwrap_or_default(),
            }
        };

        members
            .iter()
            .filter_map(|&member| {
                let member_data = self.member(member)?;
                Some(MemberDocument {
                    id: member_ids.get(&member).cloned(),
                    type_name: member_data.type_name.clone(),
                    values: member_data
                        .values
                        .iter()
                        .map(|(field, value)| (field.clone(), reference(*value)))
                        .collect(),
                })
            })
            .collect()
    }
}

/// `{prefix}{index}`, suffixed with `_{n}` until it is not in `taken`
fn fresh_id(taken: &mut HashSet<String>, prefix: &str, index: usize) -> String {
    let base = format!("{}{}", prefix, index);
    let mut candidate = base.clone();
    let mut suffix = 1;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

fn register_id(
    ids: &mut HashMap<String, ObjectRef>,
    id: &str,
    object: ObjectRef,
) -> Result<(), SceneError> {
    if ids.insert(id.to_string(), object).is_some() {
        return Err(SceneError::DuplicateId(id.to_string()));
    }
    Ok(())
}
