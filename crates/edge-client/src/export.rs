//! Whole-graph export in node-link form.
//!
//! The server returns a zip archive holding `{graph_id}_node_link.json`. It is
//! decoded into a compact directed adjacency list for local traversal.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use edge_core::{GraphId, NodeProperties, PropertyValue};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::{EdgeError, GraphSession, Result};
use crate::mutations::DEFAULT_EDGE_WEIGHT;

/// Weight given to links that carry none.
pub const DEFAULT_LINK_WEIGHT: f32 = DEFAULT_EDGE_WEIGHT;

#[derive(Debug, Deserialize)]
struct NodeLinkData {
    nodes: Vec<NodeLinkNode>,
    #[serde(default, alias = "edges")]
    links: Vec<NodeLinkLink>,
}

#[derive(Debug, Deserialize)]
struct NodeLinkNode {
    id: Value,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct NodeLinkLink {
    source: Value,
    target: Value,
    #[serde(default = "default_link_weight")]
    weight: f32,
}

fn default_link_weight() -> f32 {
    DEFAULT_LINK_WEIGHT
}

/// A node of an exported graph.
#[derive(Debug, Clone)]
pub struct ExportedNode {
    /// Dense index (0..N-1).
    pub index: usize,
    pub id: String,
    /// Node properties with the default set filled in.
    pub properties: NodeProperties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedEdge {
    pub target_index: usize,
    pub weight: f32,
}

/// A directed, simple graph decoded from a node-link export.
#[derive(Debug, Clone, Default)]
pub struct ExportedGraph {
    pub nodes: Vec<ExportedNode>,
    /// `adjacency[i]` = outgoing edges from node `i`.
    pub adjacency: Vec<Vec<ExportedEdge>>,
    /// Original node id → dense index.
    pub node_index: HashMap<String, usize>,
}

impl ExportedGraph {
    /// Extract and decode the node-link member of an export archive.
    pub fn from_archive(graph_id: GraphId, archive: &[u8]) -> Result<Self> {
        let name = format!("{graph_id}_node_link.json");
        let mut reader = zip::ZipArchive::new(Cursor::new(archive))
            .map_err(|e| EdgeError::Archive(e.to_string()))?;
        let mut member = reader
            .by_name(&name)
            .map_err(|e| EdgeError::Archive(format!("{name}: {e}")))?;

        let mut json = Vec::new();
        member
            .read_to_end(&mut json)
            .map_err(|e| EdgeError::Archive(format!("{name}: {e}")))?;
        Self::from_node_link_json(&json)
    }

    /// Decode node-link JSON.
    ///
    /// A repeated node id merges its attributes into the first occurrence. A
    /// repeated `(source, target)` link replaces the earlier weight; links
    /// naming unknown nodes are skipped.
    pub fn from_node_link_json(json: &[u8]) -> Result<Self> {
        let data: NodeLinkData =
            serde_json::from_slice(json).map_err(|e| EdgeError::Decode(e.to_string()))?;

        let mut node_index: HashMap<String, usize> = HashMap::with_capacity(data.nodes.len());
        let mut nodes: Vec<ExportedNode> = Vec::with_capacity(data.nodes.len());
        for node in data.nodes {
            let id = id_string(&node.id);
            let attributes = scalar_properties(node.attributes);
            if let Some(&i) = node_index.get(&id) {
                nodes[i].properties.merge(&attributes);
                continue;
            }
            let index = nodes.len();
            node_index.insert(id.clone(), index);
            nodes.push(ExportedNode {
                index,
                id,
                properties: attributes.with_defaults(),
            });
        }

        let mut adjacency: Vec<Vec<ExportedEdge>> = vec![Vec::new(); nodes.len()];
        for link in &data.links {
            let (source, target) = (id_string(&link.source), id_string(&link.target));
            let (Some(&src), Some(&tgt)) = (node_index.get(&source), node_index.get(&target))
            else {
                tracing::warn!(%source, %target, "Skipping link to unknown node");
                continue;
            };
            match adjacency[src].iter_mut().find(|e| e.target_index == tgt) {
                Some(existing) => existing.weight = link.weight,
                None => adjacency[src].push(ExportedEdge {
                    target_index: tgt,
                    weight: link.weight,
                }),
            }
        }

        Ok(Self {
            nodes,
            adjacency,
            node_index,
        })
    }

    pub fn node(&self, id: &str) -> Option<&ExportedNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Outgoing neighbours of `id` with edge weights. Empty for unknown ids.
    pub fn successors(&self, id: &str) -> Vec<(&ExportedNode, f32)> {
        match self.node_index.get(id) {
            Some(&i) => self.adjacency[i]
                .iter()
                .map(|e| (&self.nodes[e.target_index], e.weight))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }
}

impl GraphSession {
    /// Download the whole graph.
    pub async fn export_graph(&self) -> Result<ExportedGraph> {
        let url = self.graph_url("export-node-link");
        let response = self.send(self.request(Method::GET, &url)).await?;
        let archive = response.bytes().await?;
        let graph = ExportedGraph::from_archive(self.graph_id(), &archive)?;
        tracing::info!(
            graph_id = %self.graph_id(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Exported graph"
        );
        Ok(graph)
    }
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keep scalar attributes; nested values have no place in [`NodeProperties`].
fn scalar_properties(attributes: Map<String, Value>) -> NodeProperties {
    let mut properties = NodeProperties::new();
    for (key, value) in attributes {
        let value = match value {
            Value::Bool(b) => PropertyValue::Bool(b),
            Value::String(s) => PropertyValue::Text(s),
            Value::Number(n) => match n.as_f64() {
                Some(f) => PropertyValue::Number(f),
                None => continue,
            },
            _ => {
                tracing::debug!(%key, "Dropping non-scalar node attribute");
                continue;
            }
        };
        properties.insert(key, value);
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn sample_json() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "directed": true,
            "multigraph": false,
            "graph": {},
            "nodes": [
                {"id": "a", "label": "start", "size": 3.0},
                {"id": "b", "label": "end", "tags": ["x"]},
            ],
            "links": [
                {"source": "a", "target": "b", "weight": 2.5},
                {"source": "b", "target": "a"},
                {"source": "a", "target": "ghost", "weight": 1.0},
            ],
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_applied_to_nodes() {
        let graph = ExportedGraph::from_node_link_json(&sample_json()).unwrap();
        let a = graph.node("a").unwrap();
        assert_eq!(a.properties.label(), Some("start"));
        assert_eq!(a.properties.get("size").and_then(PropertyValue::as_f64), Some(3.0));
        assert_eq!(a.properties.get("url").and_then(PropertyValue::as_str), Some(""));

        let b = graph.node("b").unwrap();
        assert!(!b.properties.contains_key("tags"));
        assert_eq!(b.properties.get("size").and_then(PropertyValue::as_f64), Some(1.0));
    }

    #[test]
    fn test_links_become_directed_adjacency() {
        let graph = ExportedGraph::from_node_link_json(&sample_json()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);

        let out: Vec<(&str, f32)> = graph
            .successors("a")
            .into_iter()
            .map(|(n, w)| (n.id.as_str(), w))
            .collect();
        assert_eq!(out, vec![("b", 2.5)]);
        assert_eq!(graph.successors("b")[0].1, DEFAULT_LINK_WEIGHT);
    }

    #[test]
    fn test_repeated_link_replaces_weight() {
        let json = serde_json::to_vec(&json!({
            "nodes": [{"id": "a"}, {"id": "b"}],
            "links": [
                {"source": "a", "target": "b", "weight": 1.0},
                {"source": "a", "target": "b", "weight": 4.0},
            ],
        }))
        .unwrap();
        let graph = ExportedGraph::from_node_link_json(&json).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.successors("a")[0].1, 4.0);
    }

    #[test]
    fn test_repeated_node_id_merges_attributes() {
        let json = serde_json::to_vec(&json!({
            "nodes": [
                {"id": "a", "label": "first", "size": 2.0},
                {"id": "b"},
                {"id": "a", "label": "second"},
            ],
            "links": [{"source": "a", "target": "b"}],
        }))
        .unwrap();
        let graph = ExportedGraph::from_node_link_json(&json).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.adjacency.len(), 2);

        let a = graph.node("a").unwrap();
        assert_eq!(a.index, 0);
        assert_eq!(a.properties.label(), Some("second"));
        assert_eq!(a.properties.get("size").and_then(PropertyValue::as_f64), Some(2.0));
        assert_eq!(graph.successors("a")[0].0.id, "b");
    }

    #[test]
    fn test_from_archive() {
        let graph_id = GraphId::new();
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(
                format!("{graph_id}_node_link.json"),
                zip::write::SimpleFileOptions::default(),
            )
            .unwrap();
        writer.write_all(&sample_json()).unwrap();
        let archive = writer.finish().unwrap().into_inner();

        let graph = ExportedGraph::from_archive(graph_id, &archive).unwrap();
        assert_eq!(graph.node_count(), 2);

        let err = ExportedGraph::from_archive(GraphId::new(), &archive).unwrap_err();
        assert!(matches!(err, EdgeError::Archive(_)));
    }

    #[test]
    fn test_not_an_archive() {
        let err = ExportedGraph::from_archive(GraphId::new(), b"plain text").unwrap_err();
        assert!(matches!(err, EdgeError::Archive(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = ExportedGraph::from_node_link_json(b"{\"nodes\": 3}").unwrap_err();
        assert!(matches!(err, EdgeError::Decode(_)));
    }
}
