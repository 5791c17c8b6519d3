//! Read operations against the server's current state.
//!
//! Reads go straight to the server and ignore the pending diff: mutations
//! recorded inside an open batch scope are not visible here until flushed.

use std::collections::HashMap;

use edge_core::{NodeId, NodeProperties};
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::client::{decode_json, ensure_success, EdgeError, GraphSession, Result};
use crate::node::NodeView;

#[derive(Debug, Deserialize)]
struct NodePayload {
    #[serde(default)]
    properties: NodeProperties,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Successors,
    Predecessors,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Successors => "successors",
            Direction::Predecessors => "predecessors",
        }
    }
}

impl GraphSession {
    // ── Nodes ────────────────────────────────────────────────────

    /// Fetch a single node. `None` when the server does not know the id.
    pub async fn get_node(&self, node_id: NodeId) -> Result<Option<NodeView>> {
        let url = self.graph_url(&format!("atomic/{node_id}"));
        let response = self.request(Method::GET, &url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        let payload: Option<NodePayload> = decode_json(response).await?;
        Ok(payload.map(|p| NodeView::new(node_id, p.properties)))
    }

    /// Fetch several nodes in one request. Unknown ids are absent from the result.
    pub async fn get_nodes(&self, node_ids: &[NodeId]) -> Result<HashMap<NodeId, NodeView>> {
        let url = self.graph_url("atomic/nodes");
        let response = self
            .send(self.request(Method::POST, &url).json(node_ids))
            .await?;
        let payloads: HashMap<NodeId, Option<NodePayload>> = decode_json(response).await?;

        Ok(payloads
            .into_iter()
            .filter_map(|(id, payload)| payload.map(|p| (id, NodeView::new(id, p.properties))))
            .collect())
    }

    // ── Neighbours ───────────────────────────────────────────────

    pub async fn get_successors(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        self.neighbours(node_id, Direction::Successors).await
    }

    pub async fn get_predecessors(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        self.neighbours(node_id, Direction::Predecessors).await
    }

    /// Successors paired with the weight of the edge leading to each.
    pub async fn get_successors_weighted(&self, node_id: NodeId) -> Result<Vec<(NodeId, f32)>> {
        self.weighted_neighbours(node_id, Direction::Successors).await
    }

    /// Predecessors paired with the weight of the edge leading from each.
    pub async fn get_predecessors_weighted(&self, node_id: NodeId) -> Result<Vec<(NodeId, f32)>> {
        self.weighted_neighbours(node_id, Direction::Predecessors).await
    }

    async fn neighbours(&self, node_id: NodeId, direction: Direction) -> Result<Vec<NodeId>> {
        let url = self.graph_url(&format!("atomic/{node_id}"));
        let response = self
            .send(
                self.request(Method::GET, &url)
                    .query(&[("type", direction.as_str())]),
            )
            .await?;
        decode_json(response).await
    }

    async fn weighted_neighbours(
        &self,
        node_id: NodeId,
        direction: Direction,
    ) -> Result<Vec<(NodeId, f32)>> {
        let url = self.graph_url(&format!("atomic/{node_id}"));
        let response = self
            .send(
                self.request(Method::GET, &url)
                    .query(&[("type", direction.as_str()), ("weights", "true")]),
            )
            .await?;
        let (ids, weights): (Vec<NodeId>, Vec<f32>) = decode_json(response).await?;
        pair_weights(ids, weights)
    }

    // ── Edges ────────────────────────────────────────────────────

    /// Outgoing edges of each requested node, keyed `from -> to -> weight`.
    ///
    /// Every requested id is present in the result; nodes without outgoing
    /// edges map to an empty table.
    pub async fn get_edges(
        &self,
        node_ids: &[NodeId],
    ) -> Result<HashMap<NodeId, HashMap<NodeId, f32>>> {
        let url = self.graph_url("atomic/edges");
        let response = self
            .send(self.request(Method::POST, &url).json(node_ids))
            .await?;
        let mut edges: HashMap<NodeId, HashMap<NodeId, f32>> = decode_json(response).await?;
        for id in node_ids {
            edges.entry(*id).or_default();
        }
        Ok(edges)
    }
}

/// Zip the server's parallel `[ids, weights]` lists.
fn pair_weights(ids: Vec<NodeId>, weights: Vec<f32>) -> Result<Vec<(NodeId, f32)>> {
    if ids.len() != weights.len() {
        return Err(EdgeError::Decode(format!(
            "neighbour list has {} ids but {} weights",
            ids.len(),
            weights.len()
        )));
    }
    Ok(ids.into_iter().zip(weights).collect())
}
