//! Error types for the treewire resolution engine.

use crate::types::{MemberId, NodeId};
use thiserror::Error;

/// Scene-related errors
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("Field '{field}' not declared on {member}")]
    FieldNotFound { member: MemberId, field: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Duplicate object id in scene document: {0}")]
    DuplicateId(String),

    #[error("Unresolved reference in scene document: {0}")]
    UnresolvedReference(String),

    #[error("Invalid scene document: {0}")]
    InvalidDocument(String),

    #[error("Scene I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Pipeline-related errors. Any of these cancels the current pipeline invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Required service missing from registry: {0}")]
    MissingService(&'static str),

    #[error("Pipeline cancelled by stage '{stage}': {reason}")]
    Cancelled { stage: &'static str, reason: String },
}

/// Top-level errors surfaced by the configuration layer and CLI
#[derive(Debug, Error)]
pub enum TreewireError {
    #[error("Scene error: {0}")]
    SceneError(#[from] SceneError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown pipeline builder: {0}")]
    UnknownPipelineBuilder(String),

    #[error("Unknown context builder: {0}")]
    UnknownContextBuilder(String),

    #[error("Output error: {0}")]
    OutputError(String),
}

impl From<config::ConfigError> for TreewireError {
    fn from(err: config::ConfigError) -> Self {
        TreewireError::ConfigError(err.to_string())
    }
}
