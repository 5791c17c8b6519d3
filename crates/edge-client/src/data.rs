//! File and JSON uploads. These bypass the diff and hit the server directly.

use edge_core::NodeId;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{json, Value};

use crate::client::{decode_json, GraphSession, Result};

impl GraphSession {
    /// Upload a file; the server creates a node for it and returns its id.
    pub async fn import_file_as_node(&self, filename: &str, contents: Vec<u8>) -> Result<NodeId> {
        let url = self.graph_url("data/file");
        let response = self
            .send(self.request(Method::POST, &url).multipart(file_form(filename, contents)))
            .await?;
        let node_id: NodeId = decode_json(response).await?;
        tracing::debug!(%node_id, filename, "Imported file as node");
        Ok(node_id)
    }

    /// Replace the file attached to an existing node.
    pub async fn update_file_in_node(
        &self,
        node_id: NodeId,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<()> {
        let url = self.graph_url(&format!("data/file/{node_id}"));
        self.send(self.request(Method::PUT, &url).multipart(file_form(filename, contents)))
            .await?;
        Ok(())
    }

    /// Store a JSON document as a new node and return its id.
    pub async fn add_json_as_node(&self, filename: &str, document: &Value) -> Result<NodeId> {
        let url = self.graph_url("data/json");
        let body = json!({ "filename": filename, "file": document });
        let response = self
            .send(self.request(Method::POST, &url).json(&body))
            .await?;
        decode_json(response).await
    }
}

/// Single-part form; the field name is the file name.
fn file_form(filename: &str, contents: Vec<u8>) -> Form {
    let part = Part::bytes(contents).file_name(filename.to_string());
    Form::new().part(filename.to_string(), part)
}
