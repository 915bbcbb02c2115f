//! Metadata server client.

use log::debug;
use serde_json::Value;

use crate::error::{DisboxError, Result};
use crate::fs::DirectoryNode;
use crate::http::HttpClient;

/// Client for the metadata server that stores the directory index.
///
/// All requests are scoped by the tenant key (the webhook id).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    server_url: String,
    tenant: String,
}

impl ApiClient {
    pub fn new(http: HttpClient, server_url: &str, tenant: &str) -> Self {
        Self {
            http,
            server_url: server_url.trim_end_matches('/').to_string(),
            tenant: tenant.to_string(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Fetch the tenant's whole tree and return the root's children.
    pub async fn get_tree(&self) -> Result<DirectoryNode> {
        let url = format!("{}/files/get/{}", self.server_url, self.tenant);
        let text = self.http.get_text(&url).await?;
        let response: Value = serde_json::from_str(&text)?;

        let children = response.get("children").ok_or_else(|| {
            DisboxError::MalformedResponse("tree root has no children".to_string())
        })?;

        let tree = DirectoryNode::from_json(children)?;
        debug!("fetched tree with {} root entries", tree.len());
        Ok(tree)
    }

    /// Merge `changes` into the metadata of file `file_id`.
    ///
    /// Any status other than 200 means the server rejected the field set.
    pub async fn update_file(&self, file_id: i64, changes: &Value) -> Result<()> {
        let url = format!(
            "{}/files/update/{}/{}",
            self.server_url, self.tenant, file_id
        );
        let response = self.http.post_json(&url, changes).await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(DisboxError::RemoteUpdate(status));
        }
        Ok(())
    }
}
