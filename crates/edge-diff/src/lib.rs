//! edge-diff: the client-side buffer of pending graph mutations.
//!
//! A [`GraphDiff`] accumulates node upserts, node deletions, edge upserts and
//! edge deletions that have not yet been sent to the server, keeps them
//! consistent with each other (deleting a node drops edges to it, upserting
//! cancels a pending deletion), and encodes them into the binary payload
//! accepted by the `graph-diff` endpoint.

pub mod diff;
pub mod error;
pub mod node_update;
pub mod wire;

pub use diff::{EdgeDiff, GraphDiff, NodeDiff};
pub use error::DiffError;
pub use node_update::NodeUpdate;
