//! edge-client: HTTP access to a graph hosted on an Edge server.
//!
//! [`GraphSession`] is the single mutation point for one remote graph. Node and
//! edge writes are recorded into a client-side diff and flushed to the server
//! as one binary payload, immediately or when the outermost [`BatchScope`]
//! closes. Reads, file uploads and graph management are direct requests.

pub mod batch;
pub mod client;
pub mod data;
pub mod export;
pub mod mutations;
pub mod node;
pub mod queries;
pub mod view;

pub use batch::BatchScope;
pub use client::{EdgeError, GraphSession, Result};
pub use edge_core::{EdgeConfig, GraphId, NodeId, NodeProperties, PropertyValue};
pub use export::ExportedGraph;
pub use mutations::DEFAULT_EDGE_WEIGHT;
pub use node::NodeView;
pub use view::ViewAxes;
