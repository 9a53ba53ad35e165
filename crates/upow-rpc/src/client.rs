//! Base HTTP client for the uPow node API.
//!
//! Thin wrapper over reqwest: GET with query pairs and POST JSON against a
//! base URL, with a configurable timeout. Every request runs exactly once;
//! transient failures are surfaced, never retried here.

use crate::error::RpcError;
use serde_json::Value;
use std::time::Duration;

/// Configuration for a node client.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Base URL (e.g. `https://api.upow.ai`).
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3006".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Async HTTP client for raw node endpoints.
pub struct RpcClient {
    client: reqwest::Client,
    config: NodeConfig,
}

impl RpcClient {
    /// Create a new client with the given base URL.
    pub fn new(url: &str) -> Self {
        Self::with_config(NodeConfig {
            url: url.trim_end_matches('/').to_string(),
            ..Default::default()
        })
    }

    /// Create a new client with full configuration.
    pub fn with_config(config: NodeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to create HTTP client");

        Self { client, config }
    }

    /// Get the configured base URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// GET an endpoint with query parameters, returning the raw JSON body.
    pub async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value, RpcError> {
        let url = format!("{}/{}", self.config.url, endpoint);
        log::debug!("GET {url}");
        let resp = self.client.get(&url).query(query).send().await?;
        self.read_json(endpoint, resp).await
    }

    /// POST a JSON body to an endpoint, returning the raw JSON body.
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, RpcError> {
        let url = format!("{}/{}", self.config.url, endpoint);
        log::debug!("POST {url}");
        let resp = self.client.post(&url).json(body).send().await?;
        self.read_json(endpoint, resp).await
    }

    async fn read_json(
        &self,
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<Value, RpcError> {
        let status = resp.status().as_u16();
        if status >= 400 {
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::HttpStatus {
                endpoint: endpoint.to_string(),
                status,
                body: body.chars().take(500).collect(),
            });
        }
        Ok(resp.json().await?)
    }
}
