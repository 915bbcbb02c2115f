//! The DisBox client.

use log::debug;

use crate::api::{ApiClient, WebhookClient, webhook_id};
use crate::config::ClientConfig;
use crate::error::{DisboxError, Result};
use crate::http::HttpClient;
use crate::progress::{ProgressCallback, TransferProgress};

/// Client bound to one webhook.
///
/// Cheap to clone; clones share the HTTP connection pool and progress callback.
#[derive(Clone)]
pub struct DisboxClient {
    api: ApiClient,
    webhook: WebhookClient,
    webhook_id: String,
    config: ClientConfig,
    progress: Option<ProgressCallback>,
}

impl DisboxClient {
    /// Create a client for `webhook_url` with the default configuration.
    pub fn new(webhook_url: &str) -> Result<Self> {
        Self::with_config(webhook_url, ClientConfig::default())
    }

    /// Create a client for `webhook_url` with a custom configuration.
    ///
    /// The tenant key is derived from the URL exactly as given.
    pub fn with_config(webhook_url: &str, config: ClientConfig) -> Result<Self> {
        reqwest::Url::parse(webhook_url).map_err(|e| {
            DisboxError::InvalidArgument(format!("invalid webhook URL {:?}: {}", webhook_url, e))
        })?;

        let http = HttpClient::from_config(&config)?;
        let webhook_id = webhook_id(webhook_url);
        debug!("webhook id {}", webhook_id);

        Ok(Self {
            api: ApiClient::new(http.clone(), &config.server_url, &webhook_id),
            webhook: WebhookClient::new(http, webhook_url),
            webhook_id,
            config,
            progress: None,
        })
    }

    /// Tenant key used for all metadata queries.
    pub fn webhook_id(&self) -> &str {
        &self.webhook_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Metadata server client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Webhook client used to fetch chunks.
    pub fn webhook(&self) -> &WebhookClient {
        &self.webhook
    }

    /// Install a callback receiving progress after every written chunk.
    pub fn watch_status(&mut self, callback: ProgressCallback) {
        self.progress = Some(callback);
    }

    /// Remove the progress callback.
    pub fn clear_status(&mut self) {
        self.progress = None;
    }

    /// Report progress; `false` means the callback asked to cancel.
    pub(crate) fn report_progress(&self, progress: &TransferProgress) -> bool {
        match &self.progress {
            Some(callback) => callback(progress),
            None => true,
        }
    }
}

impl std::fmt::Debug for DisboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisboxClient")
            .field("webhook_id", &self.webhook_id)
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
