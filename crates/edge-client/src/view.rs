//! Views: nodes that lay out other nodes on two axes.
//!
//! A view node has ordered successors. The lowest-weighted one is the x axis,
//! the next the y axis, and every later one a filter. Placing a node in a view
//! means adding an edge from each axis node to it, weighted by the coordinate.

use edge_core::{NodeId, NodeProperties};

use crate::client::{EdgeError, GraphSession, Result};

/// Weight of the edge from the graph's root node to a new view.
pub const VIEW_ANCHOR_WEIGHT: f32 = 1.0;
pub const X_AXIS_WEIGHT: f32 = 0.0;
pub const Y_AXIS_WEIGHT: f32 = 1.0;
/// Filters are weighted from here upward in the order given.
pub const FIRST_FILTER_WEIGHT: f32 = 2.0;

const X_AXIS_LABEL: &str = "x ";
const Y_AXIS_LABEL: &str = "y ";

/// The axis and filter nodes of a view, ordered by edge weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewAxes {
    pub x: NodeId,
    pub y: NodeId,
    pub filters: Vec<NodeId>,
}

impl ViewAxes {
    /// Order weighted successors of a view node into axes and filters.
    ///
    /// Ties keep the server's order.
    pub fn from_weighted(mut successors: Vec<(NodeId, f32)>) -> Result<Self> {
        if successors.len() < 2 {
            return Err(EdgeError::Decode(format!(
                "view node has {} successors, expected at least the two axes",
                successors.len()
            )));
        }
        successors.sort_by(|a, b| a.1.total_cmp(&b.1));
        let mut ids = successors.into_iter().map(|(id, _)| id);
        match (ids.next(), ids.next()) {
            (Some(x), Some(y)) => Ok(Self {
                x,
                y,
                filters: ids.collect(),
            }),
            _ => Err(EdgeError::Decode("view node is missing an axis".to_string())),
        }
    }
}

impl GraphSession {
    /// Create a view node and return its id.
    ///
    /// Axis nodes are created when not supplied. The view is linked from the
    /// graph's root node, and everything is sent as a single diff.
    pub async fn create_view(
        &mut self,
        label: &str,
        x_node: Option<NodeId>,
        y_node: Option<NodeId>,
        filters: &[NodeId],
    ) -> Result<NodeId> {
        let root = NodeId::from(self.graph_id());
        let mut batch = self.batch();

        let view = batch.create_node(label, &NodeProperties::new()).await?;
        let x = match x_node {
            Some(id) => id,
            None => batch.create_node(X_AXIS_LABEL, &NodeProperties::new()).await?,
        };
        let y = match y_node {
            Some(id) => id,
            None => batch.create_node(Y_AXIS_LABEL, &NodeProperties::new()).await?,
        };

        batch.create_edge(root, view, VIEW_ANCHOR_WEIGHT).await?;
        batch.create_edge(view, x, X_AXIS_WEIGHT).await?;
        batch.create_edge(view, y, Y_AXIS_WEIGHT).await?;
        for (i, filter) in filters.iter().enumerate() {
            batch
                .create_edge(view, *filter, FIRST_FILTER_WEIGHT + i as f32)
                .await?;
        }
        batch.finish().await?;

        tracing::debug!(%view, %x, %y, filters = filters.len(), "Created view");
        Ok(view)
    }

    /// Read a view's axes and filters from the server.
    pub async fn view_axes_and_filters(&self, view: NodeId) -> Result<ViewAxes> {
        let successors = self.get_successors_weighted(view).await?;
        ViewAxes::from_weighted(successors)
    }

    /// Place `nodes` in a view at the matching `(x, y)` coordinates.
    pub async fn add_nodes_to_view(
        &mut self,
        view: NodeId,
        nodes: &[NodeId],
        coordinates: &[(f32, f32)],
    ) -> Result<()> {
        if nodes.len() != coordinates.len() {
            return Err(EdgeError::Validation(format!(
                "{} nodes but {} coordinates",
                nodes.len(),
                coordinates.len()
            )));
        }
        let axes = self.view_axes_and_filters(view).await?;

        let mut batch = self.batch();
        for (node, (x, y)) in nodes.iter().zip(coordinates) {
            batch.create_edge(axes.x, *node, *x).await?;
            batch.create_edge(axes.y, *node, *y).await?;
        }
        batch.finish().await
    }
}
