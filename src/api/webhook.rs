//! Webhook channel access: message attachments hold the file chunks.

use log::debug;
use reqwest::Response;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{DisboxError, Result};
use crate::http::HttpClient;

/// Derive the tenant key for a webhook: hex SHA-256 of the URL as given.
pub fn webhook_id(webhook_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(webhook_url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Client for one webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: HttpClient,
    webhook_url: String,
}

impl WebhookClient {
    pub fn new(http: HttpClient, webhook_url: &str) -> Self {
        Self {
            http,
            webhook_url: webhook_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Resolve a chunk reference to the URL of its first attachment.
    pub async fn attachment_url(&self, reference: &str) -> Result<String> {
        let url = format!("{}/messages/{}", self.webhook_url, reference);
        let text = self.http.get_text(&url).await?;
        let message: Value = serde_json::from_str(&text)?;

        message
            .get("attachments")
            .and_then(|v| v.as_array())
            .and_then(|attachments| attachments.first())
            .and_then(|attachment| attachment.get("url"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                DisboxError::MalformedResponse(format!("message {} has no attachment", reference))
            })
    }

    /// Start downloading the attachment behind `reference`.
    ///
    /// The returned response has a success status; its body is not read yet.
    pub async fn open_attachment(&self, reference: &str) -> Result<Response> {
        let attachment_url = self.attachment_url(reference).await?;
        debug!("chunk {} -> {}", reference, attachment_url);
        self.http.get(&attachment_url).await
    }

    /// Download the raw bytes of the attachment behind `reference`.
    pub async fn fetch_bytes(&self, reference: &str) -> Result<Vec<u8>> {
        let response = self.open_attachment(reference).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
