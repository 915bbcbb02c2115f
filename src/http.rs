//! HTTP client wrapper for metadata and webhook requests.

use log::debug;
use reqwest::{Client, Response};

use crate::config::ClientConfig;
use crate::error::{DisboxError, Result};

/// HTTP client shared by the metadata and webhook clients.
///
/// Wraps a `reqwest::Client`, so clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a client honoring the proxy and timeout settings of `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| DisboxError::InvalidArgument(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Make a GET request, failing on non-success status.
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            debug!("GET {} -> {}", url, response.status());
            return Err(DisboxError::HttpError(response.status().as_u16()));
        }

        Ok(response)
    }

    /// Make a GET request and return the body as a string.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let text = self.get(url).await?.text().await?;
        debug!("GET {} -> {} bytes", url, text.len());
        Ok(text)
    }

    /// Make a POST request with a JSON body.
    ///
    /// The status is returned unchecked; callers decide what counts as rejection.
    pub async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<Response> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(body)?)
            .send()
            .await?;
        debug!("POST {} -> {}", url, response.status());
        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
