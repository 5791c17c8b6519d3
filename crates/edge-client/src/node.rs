use std::fmt;

use edge_core::types::ID_KEY;
use edge_core::{NodeId, NodeProperties, PropertyValue};

use crate::client::{GraphSession, Result};

/// A snapshot of one node as last read from the server.
///
/// Missing standard properties are filled with their defaults. The snapshot
/// is not refreshed by other writers; [`NodeView::update`] keeps it in step
/// with changes made through it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    id: NodeId,
    properties: NodeProperties,
}

impl NodeView {
    pub fn new(id: NodeId, properties: NodeProperties) -> Self {
        Self {
            id,
            properties: properties.with_defaults(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    pub fn label(&self) -> Option<&str> {
        self.properties.label()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Merge `changes` into the snapshot and send the merged properties.
    ///
    /// An `id` key in `changes` is ignored.
    pub async fn update(&mut self, session: &mut GraphSession, changes: &NodeProperties) -> Result<()> {
        let mut changes = changes.clone();
        changes.remove(ID_KEY);
        self.properties.merge(&changes);
        session.update_node(self.id, &self.properties).await
    }
}

impl fmt::Display for NodeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(label={})", self.label().unwrap_or_default())
    }
}
