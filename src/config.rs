//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default metadata server.
pub const DEFAULT_SERVER_URL: &str = "https://disboxserver.azurewebsites.net";

/// Default delay between starting successive downloads of a folder batch.
pub const DEFAULT_TASK_INTERVAL: Duration = Duration::from_millis(350);

const MAX_TASK_INTERVAL: Duration = Duration::from_secs(60);

/// Settings shared by every request a [`DisboxClient`](crate::DisboxClient) makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the metadata server (no trailing slash).
    pub server_url: String,
    /// Delay between task starts in `download_folder`.
    pub task_interval: Duration,
    /// Upper bound on concurrently running file downloads (`None` = unbounded).
    pub max_concurrent_downloads: Option<usize>,
    /// Per-request timeout (`None` = wait forever).
    pub request_timeout: Option<Duration>,
    /// HTTP proxy URL.
    pub proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            task_interval: DEFAULT_TASK_INTERVAL,
            max_concurrent_downloads: None,
            request_timeout: None,
            proxy: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another metadata server.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the delay between folder download task starts (clamped to 60s).
    pub fn with_task_interval(mut self, interval: Duration) -> Self {
        self.task_interval = interval.min(MAX_TASK_INTERVAL);
        self
    }

    /// Cap concurrent file downloads (at least 1).
    pub fn with_max_concurrent_downloads(mut self, limit: usize) -> Self {
        self.max_concurrent_downloads = Some(limit.max(1));
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}
