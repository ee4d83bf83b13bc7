//! Tree access and traversal
//!
//! The host exposes its object tree through [`TreeProvider`]. The [`walker`]
//! drives the resolution pipeline over that tree and [`ancestry`] tracks the
//! path from the root to the node currently being visited.

pub mod ancestry;
pub mod walker;

pub use ancestry::AncestorTracker;
pub use walker::{WalkStats, Walker, WalkerConfig};

use crate::types::{MemberId, NodeId};

/// Read-only enumeration of a host tree.
///
/// Ordering of `roots`, `children` and `attached_members` is significant: it
/// defines visitation order and therefore which matches are possible.
pub trait TreeProvider {
    fn roots(&self) -> Vec<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn attached_members(&self, node: NodeId) -> Vec<MemberId>;

    /// Structural parent of a container node, `None` for roots
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Container node a member is attached to
    fn container_of(&self, member: MemberId) -> Option<NodeId>;
}
