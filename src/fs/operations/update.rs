//! Metadata updates: rename and raw field merges.

use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::client::DisboxClient;
use crate::error::{DisboxError, Result};
use crate::fs::node::FileRef;

/// Current time in the server's timestamp format (`2023-04-01T10:20:30.123Z`).
pub(crate) fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl DisboxClient {
    /// Merge `changes` into a file's metadata.
    ///
    /// `updated_at` is always set to the current time.
    ///
    /// # Arguments
    /// * `file_id` - Id of the file to update
    /// * `changes` - JSON object of fields to merge
    pub async fn update_file(&self, file_id: i64, changes: Value) -> Result<()> {
        let mut changes = match changes {
            Value::Object(map) => map,
            other => {
                return Err(DisboxError::InvalidArgument(format!(
                    "changes must be a JSON object, got {}",
                    other
                )));
            }
        };
        changes.insert("updated_at".to_string(), Value::String(timestamp_now()));

        self.api()
            .update_file(file_id, &Value::Object(changes))
            .await
    }

    /// Rename a file.
    ///
    /// Fails with `AlreadyExists` when `new_name` is taken in the same folder.
    ///
    /// # Example
    /// ```no_run
    /// # use disbox::DisboxClient;
    /// # async fn example() -> disbox::Result<()> {
    /// let client = DisboxClient::new("https://discord.com/api/webhooks/1/token")?;
    /// client.rename_file("old.txt", "new.txt", Some("test folder")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn rename_file(
        &self,
        file: impl Into<FileRef>,
        new_name: &str,
        from_folder: Option<&str>,
    ) -> Result<()> {
        if new_name.is_empty() || new_name.contains('/') {
            return Err(DisboxError::InvalidArgument(format!(
                "invalid file name: {:?}",
                new_name
            )));
        }

        let file = file.into();
        let level = self.fetch_tree(from_folder).await?;
        let entry = super::browse::find_file(&level, &file)?;

        if level.get(new_name).is_some() || level.malformed_entry(new_name).is_some() {
            return Err(DisboxError::AlreadyExists(new_name.to_string()));
        }

        self.update_file(entry.id, json!({ "name": new_name })).await
    }
}
