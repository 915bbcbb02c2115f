//! File lookup and listing.

use rand::Rng;

use crate::client::DisboxClient;
use crate::error::{DisboxError, Result};
use crate::fs::node::{DirectoryNode, FileEntry, FileRef, Node};

/// Find a file within one tree level.
///
/// By id, entries are scanned in server order and the first file with that id wins;
/// directories never match. By name, the entry must exist and be a file.
///
/// An unreadable entry only fails the lookup when it could be the one asked for.
pub fn find_file(level: &DirectoryNode, file: &FileRef) -> Result<FileEntry> {
    match file {
        FileRef::ById(id) => {
            let found = level
                .iter()
                .find_map(|(_, node)| node.as_file().filter(|entry| entry.id == *id))
                .cloned();
            match found {
                Some(entry) => Ok(entry),
                None => {
                    level.ensure_well_formed()?;
                    Err(DisboxError::NotFound(format!("Can't find a file with ID: {}", id)))
                }
            }
        }
        FileRef::ByName(name) => {
            if name.is_empty() {
                return Err(DisboxError::InvalidArgument(
                    "file name must not be empty".to_string(),
                ));
            }
            match level.get(name) {
                Some(Node::File(entry)) => Ok(entry.clone()),
                Some(Node::Directory(_)) => Err(DisboxError::NotAFile(name.clone())),
                None => Err(level
                    .malformed_entry(name)
                    .unwrap_or_else(|| DisboxError::NotFound(format!("Invalid file name: {}", name)))),
            }
        }
    }
}

/// All files directly inside `level`, in server order.
///
/// Fails if any entry of the level could not be parsed.
pub fn level_files(level: &DirectoryNode) -> Result<Vec<FileEntry>> {
    level.ensure_well_formed()?;
    Ok(level
        .iter()
        .filter_map(|(_, node)| node.as_file())
        .cloned()
        .collect())
}

impl DisboxClient {
    /// Get information about a file.
    ///
    /// # Arguments
    /// * `file` - File id (`i64`) or name (`&str` / `String`)
    /// * `from_folder` - Remote folder holding the file; `None` for the root
    ///
    /// # Example
    /// ```no_run
    /// # use disbox::DisboxClient;
    /// # async fn example() -> disbox::Result<()> {
    /// let client = DisboxClient::new("https://discord.com/api/webhooks/1/token")?;
    /// let by_id = client.get_file_info(10611, None).await?;
    /// let by_name = client.get_file_info("notes.txt", Some("test folder")).await?;
    /// println!("{} has {} chunks", by_name.name, by_name.content.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_file_info(
        &self,
        file: impl Into<FileRef>,
        from_folder: Option<&str>,
    ) -> Result<FileEntry> {
        let file = file.into();
        let level = self.fetch_tree(from_folder).await?;
        find_file(&level, &file)
    }

    /// List every file in a folder, skipping subfolders.
    pub async fn list_files(&self, from_folder: Option<&str>) -> Result<Vec<FileEntry>> {
        let level = self.fetch_tree(from_folder).await?;
        level_files(&level)
    }

    /// Pick a random file from a folder.
    pub async fn random_file(&self, from_folder: Option<&str>) -> Result<FileEntry> {
        let mut files = self.list_files(from_folder).await?;
        if files.is_empty() {
            return Err(DisboxError::NotFound(format!(
                "No files in {}",
                from_folder.unwrap_or("root folder")
            )));
        }
        let idx = rand::thread_rng().gen_range(0..files.len());
        Ok(files.swap_remove(idx))
    }
}
