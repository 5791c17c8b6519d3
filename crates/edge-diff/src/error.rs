//! Error types for the edge-diff crate.

use edge_core::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Edge {from} -> {to} touches a node pending deletion")]
    DeletedEndpoint { from: NodeId, to: NodeId },

    #[error("Invalid value for property {key:?}: expected {expected}")]
    InvalidProperty { key: String, expected: &'static str },

    #[error("Diff encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("Node update JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DiffError>;
