//! edge-core: Shared types, configuration, and error handling for the Edge graph client.
//!
//! This crate provides the foundational types used across all Edge crates:
//! - Graph and node identifiers, normalized to their canonical 16-byte form
//! - The node property model and its fixed default set
//! - Configuration management
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::EdgeConfig;
pub use error::CoreError;
pub use types::{GraphId, NodeId, NodeProperties, PropertyValue};
