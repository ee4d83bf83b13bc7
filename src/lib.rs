//! treewire: declarative reference resolution over object trees
//!
//! Members attached to container nodes declare fields annotated with a
//! matching policy. A depth-first walk offers every node and member to the
//! pending fields and binds the first candidate each policy accepts, running a
//! second pass for candidates visited before their owners.

pub mod bucket;
pub mod catalog;
pub mod changes;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod policy;
pub mod resolver;
pub mod scene;
pub mod services;
pub mod slot;
pub mod tree;
pub mod types;

pub use bucket::{Classification, SlotState};
pub use changes::{ChangeLog, PersistenceHook};
pub use error::{PipelineError, SceneError, TreewireError};
pub use resolver::{Resolution, Resolver};
pub use scene::{Scene, SceneModel};
pub use tree::TreeProvider;
pub use types::{MemberId, NodeId, ObjectRef, TypeName};
