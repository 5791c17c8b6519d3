//! Configuration for Edge clients.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (EDGE_ prefix, e.g. `EDGE_TOKEN`, `EDGE_GRAPH_ID`)
//! 2. Config file (`edge.toml`)
//! 3. Defaults

use std::time::Duration;

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::GraphId;

/// Base URL of the Edge graph API when none is configured.
pub const DEFAULT_URL: &str = "http://localhost:5001/v3/graphs";

/// Connection settings for an Edge server.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EdgeConfig {
    /// Base URL of the graphs API.
    #[serde(default = "default_url")]
    pub url: String,

    /// Value sent in the `Authorization` header of every request.
    #[serde(default)]
    pub token: String,

    /// Graph to open when none is given explicitly.
    #[serde(default)]
    pub graph_id: Option<String>,

    /// Per-request timeout in seconds; 0 disables the timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: String::new(),
            graph_id: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl EdgeConfig {
    /// Load from `<file_prefix>.toml` (optional) and `EDGE_*` variables.
    ///
    /// Keys missing from both sources keep their defaults.
    pub fn load(file_prefix: &str) -> Result<Self, CoreError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("EDGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let loaded: EdgeConfig = cfg.try_deserialize()?;
        tracing::debug!(file_prefix, url = %loaded.url, "Loaded Edge configuration");
        Ok(loaded)
    }

    /// Per-request timeout, `None` when `timeout_secs` is 0.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// The configured graph id, if any.
    pub fn graph_id(&self) -> Result<Option<GraphId>, CoreError> {
        self.graph_id
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(str::parse)
            .transpose()
    }
}
