//! Directory index fetching and folder resolution.

use crate::client::DisboxClient;
use crate::error::{DisboxError, Result};
use crate::fs::node::DirectoryNode;
use super::utils::folder_segments;

/// Descend from the root level into `folder`, one `/`-separated segment at a time.
///
/// Fails with `NotFound` when a segment is absent or names a file, and with
/// `MalformedResponse` when a segment names an entry the server sent in an unreadable shape.
pub fn resolve_folder(root: DirectoryNode, folder: &str) -> Result<DirectoryNode> {
    let mut level = root;
    for segment in folder_segments(folder) {
        level = level.into_children(segment).map_err(|err| match err {
            DisboxError::NotFound(_) => {
                DisboxError::NotFound(format!("Invalid folder name: {} (in {})", segment, folder))
            }
            other => other,
        })?;
    }
    Ok(level)
}

impl DisboxClient {
    /// Fetch the directory index, optionally narrowed to one folder.
    ///
    /// The whole tree is fetched from the server on every call.
    ///
    /// # Arguments
    /// * `folder` - Remote folder path such as `"photos/2023"`; `None` for the root
    pub async fn fetch_tree(&self, folder: Option<&str>) -> Result<DirectoryNode> {
        let root = self.api().get_tree().await?;
        match folder {
            Some(folder) => resolve_folder(root, folder),
            None => Ok(root),
        }
    }
}
