//! Write operations for the graph.
//!
//! Node and edge mutations never talk to the server directly. Each one is
//! recorded into the session's diff through a single wrapper, after which the
//! diff is flushed unless a batch scope is open. A failed flush keeps the diff
//! so that the next flush resends everything accumulated so far.

use edge_core::{NodeId, NodeProperties};
use edge_diff::{DiffError, GraphDiff, NodeUpdate};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

use crate::client::{GraphSession, Result};

/// Weight used for edges when the caller has no particular weight in mind.
pub const DEFAULT_EDGE_WEIGHT: f32 = 1.0;

impl GraphSession {
    // ── Nodes ────────────────────────────────────────────────────

    /// Create a node and return its id.
    ///
    /// `properties` are laid over the default set and `label`; an `id` key in
    /// `properties` is used as the node id, otherwise a fresh one is generated.
    pub async fn create_node(&mut self, label: &str, properties: &NodeProperties) -> Result<NodeId> {
        let mut merged = NodeProperties::defaults().with("label", label);
        merged.merge(properties);
        let node_id = merged.take_id()?.unwrap_or_else(NodeId::new);
        let update = NodeUpdate::try_from(&merged)?;

        self.record(|diff| {
            diff.add_or_update_node(node_id, update);
            Ok(())
        })
        .await?;
        Ok(node_id)
    }

    /// Update some properties of a node. Only the given properties are sent.
    pub async fn update_node(&mut self, node_id: NodeId, properties: &NodeProperties) -> Result<()> {
        let update = NodeUpdate::try_from(properties)?;
        self.record(|diff| {
            diff.add_or_update_node(node_id, update);
            Ok(())
        })
        .await
    }

    /// Delete a node and, server-side, every edge touching it.
    pub async fn delete_node(&mut self, node_id: NodeId) -> Result<()> {
        self.record(|diff| {
            diff.delete_node(node_id);
            Ok(())
        })
        .await
    }

    // ── Edges ────────────────────────────────────────────────────

    /// Create or re-weight the edge `from -> to`.
    pub async fn create_edge(&mut self, from: NodeId, to: NodeId, weight: f32) -> Result<()> {
        self.record(|diff| diff.add_edge(from, to, weight)).await
    }

    /// Delete the edge `from -> to`.
    pub async fn delete_edge(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        self.record(|diff| {
            diff.delete_edge(from, to);
            Ok(())
        })
        .await
    }

    // ── Flushing ─────────────────────────────────────────────────

    /// Send the pending diff now, whatever the batch depth.
    ///
    /// Does nothing when the diff is empty. The diff is cleared only after the
    /// server accepted it.
    pub async fn flush(&mut self) -> Result<()> {
        if self.diff.is_empty() {
            return Ok(());
        }

        let payload = self.diff.to_bytes()?;
        let bytes = payload.len();
        let url = self.graph_url("graph-diff");
        self.send(
            self.request(Method::POST, &url)
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(payload),
        )
        .await?;

        tracing::debug!(
            graph_id = %self.graph_id(),
            nodes = self.diff.num_nodes(),
            edges = self.diff.num_edges(),
            bytes,
            "Flushed graph diff"
        );
        self.diff.clear();
        Ok(())
    }

    /// Node plus edge operations recorded since the last successful flush.
    pub fn diff_size(&self) -> usize {
        self.diff.len()
    }

    /// The mutations recorded but not yet accepted by the server.
    pub fn pending_diff(&self) -> &GraphDiff {
        &self.diff
    }

    /// Apply `op` to the diff, then flush unless batching.
    async fn record<T>(
        &mut self,
        op: impl FnOnce(&mut GraphDiff) -> std::result::Result<T, DiffError>,
    ) -> Result<T> {
        let out = op(&mut self.diff)?;
        if !self.is_batching() {
            self.flush().await?;
        }
        Ok(out)
    }
}
