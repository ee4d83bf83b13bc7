//! Ancestor tracking for the node currently being visited.

use crate::types::NodeId;
use std::collections::HashSet;

/// Path from the tree root to the current container node.
///
/// Updated only when a container node becomes current. If the new node's
/// parent is not on the path, the path restarts at the new node; this covers
/// traversals that begin mid-tree or jump between branches.
#[derive(Debug, Clone, Default)]
pub struct AncestorTracker {
    path: Vec<NodeId>,
    members: HashSet<NodeId>,
}

impl AncestorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `node` current, given its structural parent
    pub fn enter(&mut self, node: NodeId, parent: Option<NodeId>) {
        let parent_position =
            parent.and_then(|p| self.path.iter().rposition(|&ancestor| ancestor == p));

        match parent_position {
            Some(position) => {
                for dropped in self.path.drain(position + 1..) {
                    self.members.remove(&dropped);
                }
            }
            None => self.reset(),
        }

        self.path.push(node);
        self.members.insert(node);
    }

    /// Node most recently entered
    pub fn current(&self) -> Option<NodeId> {
        self.path.last().copied()
    }

    /// Whether `node` is on the path, including the current node itself
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// Root-first path to the current node
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn reset(&mut self) {
        self.path.clear();
        self.members.clear();
    }
}
