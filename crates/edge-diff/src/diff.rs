//! The pending-mutation buffer.

use std::ops::AddAssign;

use edge_core::NodeId;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Result};
use crate::node_update::NodeUpdate;

/// Pending node upserts and deletions, in recording order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDiff {
    pub(crate) new_or_updated: IndexMap<NodeId, NodeUpdate>,
    pub(crate) deleted: IndexSet<NodeId>,
}

impl NodeDiff {
    pub fn new_or_updated(&self) -> &IndexMap<NodeId, NodeUpdate> {
        &self.new_or_updated
    }

    pub fn deleted(&self) -> &IndexSet<NodeId> {
        &self.deleted
    }
}

/// Pending edge upserts (`from -> to -> weight`) and deletions (`from -> {to}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDiff {
    new_or_updated: IndexMap<NodeId, IndexMap<NodeId, f32>>,
    deleted: IndexMap<NodeId, IndexSet<NodeId>>,
}

impl EdgeDiff {
    pub fn new_or_updated(&self) -> &IndexMap<NodeId, IndexMap<NodeId, f32>> {
        &self.new_or_updated
    }

    pub fn deleted(&self) -> &IndexMap<NodeId, IndexSet<NodeId>> {
        &self.deleted
    }

    /// Number of distinct `(from, to)` pairs pending upsert.
    pub fn upsert_count(&self) -> usize {
        self.new_or_updated.values().map(IndexMap::len).sum()
    }

    /// Number of distinct `(from, to)` pairs pending deletion.
    pub fn delete_count(&self) -> usize {
        self.deleted.values().map(IndexSet::len).sum()
    }
}

/// Everything recorded since the last successful flush.
///
/// The diff keeps its contents self-consistent: the last write to a node or
/// edge wins, upserts cancel pending deletions of the same element and vice
/// versa, and deleting a node drops every pending edge touching it.
///
/// [`len`](Self::len) counts recorded operations, not distinct elements, so it
/// only grows until [`clear`](Self::clear).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphDiff {
    pub(crate) nodes: NodeDiff,
    pub(crate) edges: EdgeDiff,
    pub(crate) node_ops: usize,
    pub(crate) edge_ops: usize,
}

impl GraphDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &NodeDiff {
        &self.nodes
    }

    pub fn edges(&self) -> &EdgeDiff {
        &self.edges
    }

    pub fn new_or_updated_nodes(&self) -> &IndexMap<NodeId, NodeUpdate> {
        &self.nodes.new_or_updated
    }

    pub fn deleted_nodes(&self) -> &IndexSet<NodeId> {
        &self.nodes.deleted
    }

    pub fn new_or_updated_edges(&self) -> &IndexMap<NodeId, IndexMap<NodeId, f32>> {
        &self.edges.new_or_updated
    }

    pub fn deleted_edges(&self) -> &IndexMap<NodeId, IndexSet<NodeId>> {
        &self.edges.deleted
    }

    /// Node operations recorded since the last clear.
    pub fn num_nodes(&self) -> usize {
        self.node_ops
    }

    /// Edge operations recorded since the last clear.
    pub fn num_edges(&self) -> usize {
        self.edge_ops
    }

    pub fn len(&self) -> usize {
        self.node_ops + self.edge_ops
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Nodes ────────────────────────────────────────────────────

    /// Add or update a node. A pending update for the same id is merged
    /// field-wise; a pending deletion of it is cancelled.
    pub fn add_or_update_node(&mut self, node_id: NodeId, update: NodeUpdate) {
        match self.nodes.new_or_updated.get_mut(&node_id) {
            Some(existing) => *existing += update,
            None => {
                self.nodes.new_or_updated.insert(node_id, update);
            }
        }
        self.nodes.deleted.shift_remove(&node_id);
        self.node_ops += 1;
    }

    /// Mark a node for deletion.
    ///
    /// Drops its pending update and outgoing edges; pending incoming edges are
    /// turned into edge deletions so the server removes them too.
    pub fn delete_node(&mut self, node_id: NodeId) {
        self.nodes.new_or_updated.shift_remove(&node_id);

        let EdgeDiff {
            new_or_updated,
            deleted,
        } = &mut self.edges;
        new_or_updated.shift_remove(&node_id);
        for (from, to_weight) in new_or_updated.iter_mut() {
            if to_weight.shift_remove(&node_id).is_some() {
                deleted.entry(*from).or_default().insert(node_id);
            }
        }
        new_or_updated.retain(|_, to_weight| !to_weight.is_empty());

        self.nodes.deleted.insert(node_id);
        self.node_ops += 1;
    }

    // ── Edges ────────────────────────────────────────────────────

    /// Add or update the edge `from -> to`. A pending deletion of it is cancelled.
    ///
    /// Non-finite weights are ignored. Fails if either endpoint is pending deletion.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: f32) -> Result<()> {
        if !weight.is_finite() {
            tracing::warn!(%from, %to, weight, "Ignoring edge with non-finite weight");
            return Ok(());
        }
        if self.nodes.deleted.contains(&from) || self.nodes.deleted.contains(&to) {
            return Err(DiffError::DeletedEndpoint { from, to });
        }

        if let Some(targets) = self.edges.deleted.get_mut(&from) {
            targets.shift_remove(&to);
            if targets.is_empty() {
                self.edges.deleted.shift_remove(&from);
            }
        }
        self.edges
            .new_or_updated
            .entry(from)
            .or_default()
            .insert(to, weight);
        self.edge_ops += 1;
        Ok(())
    }

    /// Mark the edge `from -> to` for deletion, dropping any pending upsert of it.
    pub fn delete_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.deleted.entry(from).or_default().insert(to);

        if let Some(to_weight) = self.edges.new_or_updated.get_mut(&from) {
            to_weight.shift_remove(&to);
            if to_weight.is_empty() {
                self.edges.new_or_updated.shift_remove(&from);
            }
        }
        self.edge_ops += 1;
    }

    /// Forget everything recorded.
    pub fn clear(&mut self) {
        self.nodes.new_or_updated.clear();
        self.nodes.deleted.clear();
        self.edges.new_or_updated.clear();
        self.edges.deleted.clear();
        self.node_ops = 0;
        self.edge_ops = 0;
    }
}

/// Replays `other`'s operations on top of `self`.
impl AddAssign for GraphDiff {
    fn add_assign(&mut self, other: GraphDiff) {
        for (node_id, update) in other.nodes.new_or_updated {
            self.add_or_update_node(node_id, update);
        }
        for node_id in other.nodes.deleted {
            self.delete_node(node_id);
        }
        for (from, to_weight) in other.edges.new_or_updated {
            for (to, weight) in to_weight {
                if let Err(e) = self.add_edge(from, to, weight) {
                    tracing::warn!(error = %e, "Dropping edge while merging diffs");
                }
            }
        }
        for (from, targets) in other.edges.deleted {
            for to in targets {
                self.delete_edge(from, to);
            }
        }
    }
}
