//! Connection management and the graph session.

use std::fmt;

use edge_core::{CoreError, EdgeConfig, GraphId};
use edge_diff::{DiffError, GraphDiff};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// Errors from Edge operations.
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    #[error("Edge server error\nStatus code: {status}\n{body}")]
    Server { status: u16, body: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode server response: {0}")]
    Decode(String),

    #[error("Export archive error: {0}")]
    Archive(String),

    #[error("Diff error: {0}")]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, EdgeError>;

/// A connection to one graph on an Edge server.
///
/// This is the single point of access for reads and writes against the graph.
/// Node and edge mutations are recorded into an owned [`GraphDiff`] and sent
/// according to the flush policy in [`crate::mutations`]; batch depth is
/// tracked here too, so a session is used through `&mut` by one caller at a time.
pub struct GraphSession {
    http: Client,
    url: String,
    token: String,
    graph_id: GraphId,
    pub(crate) diff: GraphDiff,
    pub(crate) batch_depth: usize,
}

impl fmt::Debug for GraphSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphSession")
            .field("url", &self.url)
            .field("graph_id", &self.graph_id)
            .field("pending_ops", &self.diff.len())
            .field("batch_depth", &self.batch_depth)
            .finish_non_exhaustive()
    }
}

impl GraphSession {
    /// Create a new graph named `name` and connect to it.
    ///
    /// `url` defaults to the standard graphs endpoint.
    pub async fn create_graph(name: &str, token: &str, url: Option<&str>) -> Result<Self> {
        Self::create_graph_with_config(&config_for(token, url), name).await
    }

    /// Create a new graph using connection settings from an [`EdgeConfig`].
    pub async fn create_graph_with_config(config: &EdgeConfig, name: &str) -> Result<Self> {
        let http = http_client(config)?;
        let base = config.url.trim_end_matches('/');

        let response = http
            .post(base)
            .header(AUTHORIZATION, config.token.as_str())
            .query(&[("name", name)])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let graph_id: GraphId = decode_json(response).await?;

        tracing::info!(%graph_id, name, "Created Edge graph");
        Self::bind(http, config, graph_id).await
    }

    /// Connect to an existing graph.
    pub async fn open(graph_id: GraphId, token: &str, url: Option<&str>) -> Result<Self> {
        Self::from_config(&config_for(token, url), graph_id).await
    }

    /// Connect to an existing graph using settings from an [`EdgeConfig`].
    pub async fn from_config(config: &EdgeConfig, graph_id: GraphId) -> Result<Self> {
        let http = http_client(config)?;
        Self::bind(http, config, graph_id).await
    }

    async fn bind(http: Client, config: &EdgeConfig, graph_id: GraphId) -> Result<Self> {
        let session = Self {
            http,
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            graph_id,
            diff: GraphDiff::new(),
            batch_depth: 0,
        };
        session.connect().await?;
        Ok(session)
    }

    /// Ask the server to load the graph. Safe to call repeatedly.
    pub async fn connect(&self) -> Result<()> {
        let url = self.graph_url("load");
        self.send(self.request(Method::GET, &url)).await?;
        tracing::info!(graph_id = %self.graph_id, url = %self.url, "Connected to Edge graph");
        Ok(())
    }

    /// Rename the graph. The name must not be empty.
    pub async fn rename_graph(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(EdgeError::Validation("Name cannot be empty".to_string()));
        }
        let url = self.graph_url("save");
        self.send(
            self.request(Method::PUT, &url)
                .query(&[("name", name), ("groups", "")]),
        )
        .await?;
        tracing::info!(graph_id = %self.graph_id, name, "Renamed Edge graph");
        Ok(())
    }

    /// Delete the graph on the server.
    pub async fn delete_graph(&self) -> Result<()> {
        let url = self.graph_url("delete");
        self.send(self.request(Method::DELETE, &url)).await?;
        tracing::info!(graph_id = %self.graph_id, "Deleted Edge graph");
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn graph_id(&self) -> GraphId {
        self.graph_id
    }

    /// Base URL of the graphs API this session talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    // ── Request plumbing ─────────────────────────────────────────

    /// `{base}/{graph_id}/{suffix}`
    pub(crate) fn graph_url(&self, suffix: &str) -> String {
        format!("{}/{}/{}", self.url, self.graph_id, suffix)
    }

    /// A request carrying the session's `Authorization` header.
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, self.token.as_str())
    }

    /// Send a request and turn any non-success status into [`EdgeError::Server`].
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        ensure_success(response).await
    }
}

fn config_for(token: &str, url: Option<&str>) -> EdgeConfig {
    let mut config = EdgeConfig {
        token: token.to_string(),
        ..Default::default()
    };
    if let Some(url) = url {
        config.url = url.to_string();
    }
    config
}

fn http_client(config: &EdgeConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), "Edge request failed");
    Err(EdgeError::Server {
        status: status.as_u16(),
        body,
    })
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| EdgeError::Decode(e.to_string()))
}
