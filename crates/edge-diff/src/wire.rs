//! Binary encoding of a [`GraphDiff`] for the `graph-diff` endpoint.
//!
//! The payload is the bincode encoding of the tuple
//! `(node id -> JSON node update, deleted node ids, EdgeDiff)`. Node updates
//! travel as JSON strings so that absent fields stay absent on the server.
//! Node ids are written as their raw 16 bytes.

use edge_core::NodeId;
use indexmap::{IndexMap, IndexSet};

use crate::diff::{EdgeDiff, GraphDiff, NodeDiff};
use crate::error::Result;
use crate::node_update::NodeUpdate;

type WireDiff = (IndexMap<NodeId, String>, IndexSet<NodeId>, EdgeDiff);

impl GraphDiff {
    /// Serialize the diff into the server's wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut json_map = IndexMap::with_capacity(self.nodes.new_or_updated().len());
        for (id, update) in self.nodes.new_or_updated() {
            json_map.insert(*id, serde_json::to_string(update)?);
        }
        Ok(bincode::serialize(&(
            &json_map,
            self.nodes.deleted(),
            &self.edges,
        ))?)
    }

    /// Decode a payload produced by [`to_bytes`](Self::to_bytes).
    ///
    /// Operation counters are rebuilt from the decoded contents: one per node
    /// and one per `(from, to)` pair.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (json_map, deleted, edges): WireDiff = bincode::deserialize(bytes)?;

        let mut new_or_updated = IndexMap::with_capacity(json_map.len());
        for (id, json) in json_map {
            new_or_updated.insert(id, serde_json::from_str::<NodeUpdate>(&json)?);
        }
        let nodes = NodeDiff {
            new_or_updated,
            deleted,
        };

        Ok(GraphDiff {
            node_ops: nodes.new_or_updated().len() + nodes.deleted().len(),
            edge_ops: edges.upsert_count() + edges.delete_count(),
            nodes,
            edges,
        })
    }
}
