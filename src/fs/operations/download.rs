//! Download operations.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use log::{debug, info, warn};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;

use crate::client::DisboxClient;
use crate::error::{DisboxError, Result};
use crate::fs::node::{FileEntry, FileRef};
use crate::pacer::Pacer;
use crate::progress::TransferProgress;
use crate::size::format_size;
use super::utils::{folder_segments, target_path};

/// What a download call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was fetched and written.
    Downloaded { path: PathBuf, size: u64 },
    /// The target path already existed and was left untouched.
    AlreadyExists { path: PathBuf },
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DownloadOutcome::Downloaded { path, .. } => path,
            DownloadOutcome::AlreadyExists { path } => path,
        }
    }

    pub fn was_downloaded(&self) -> bool {
        matches!(self, DownloadOutcome::Downloaded { .. })
    }
}

impl DisboxClient {
    /// Download a file by id or name.
    ///
    /// # Arguments
    /// * `file` - File id or name
    /// * `from_folder` - Remote folder holding the file
    /// * `to_folder` - Local folder to write into (created if missing); current dir if `None`
    /// * `force` - Delete and re-download when the target already exists
    ///
    /// # Example
    /// ```no_run
    /// # use disbox::DisboxClient;
    /// # use std::path::Path;
    /// # async fn example() -> disbox::Result<()> {
    /// let client = DisboxClient::new("https://discord.com/api/webhooks/1/token")?;
    /// client
    ///     .download_file(10704, Some("test folder"), Some(Path::new("simple folder")), false)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download_file(
        &self,
        file: impl Into<FileRef>,
        from_folder: Option<&str>,
        to_folder: Option<&Path>,
        force: bool,
    ) -> Result<DownloadOutcome> {
        let entry = self.get_file_info(file, from_folder).await?;
        self.download_entry(&entry, to_folder, force).await
    }

    /// Reassemble an already resolved file on disk.
    ///
    /// Chunks are fetched one after another and appended in their stored order.
    /// If the target exists and `force` is false, nothing is fetched and the file is left
    /// as is. A failure midway leaves the partially written file behind.
    pub async fn download_entry(
        &self,
        file: &FileEntry,
        to_folder: Option<&Path>,
        force: bool,
    ) -> Result<DownloadOutcome> {
        let path = target_path(to_folder, &file.name)?;

        if let Some(folder) = to_folder {
            fs::create_dir_all(folder).await?;
        }

        if force && fs::try_exists(&path).await? {
            debug!("removing {} before re-download", path.display());
            fs::remove_file(&path).await?;
        }

        if fs::try_exists(&path).await? {
            info!("{} already exists", path.display());
            return Ok(DownloadOutcome::AlreadyExists { path });
        }

        let mut out = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&path)
            .await?;

        let mut written = 0u64;
        for reference in &file.content {
            let response = self.webhook().open_attachment(reference).await?;
            let mut stream = response.bytes_stream();

            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                out.write_all(&chunk).await?;
                written += chunk.len() as u64;

                let progress = TransferProgress::new(written, file.size, &file.name);
                if !self.report_progress(&progress) {
                    out.flush().await?;
                    return Err(DisboxError::Cancelled(format!(
                        "download of {} cancelled by callback",
                        file.name
                    )));
                }
            }
        }
        out.flush().await?;

        info!(
            "{} downloaded ({})",
            file.name,
            format_size(file.size)
        );
        Ok(DownloadOutcome::Downloaded {
            path,
            size: written,
        })
    }

    /// Download every file of a remote folder into a local folder of the same path.
    ///
    /// One task per file is started, spaced by the configured task interval and capped by
    /// `max_concurrent_downloads` when set. A failing file does not stop the others; once all
    /// tasks finish, the first error is returned. Outcomes come back in listing order.
    ///
    /// Dropping the returned future aborts downloads still in flight.
    ///
    /// # Example
    /// ```no_run
    /// # use disbox::DisboxClient;
    /// # async fn example() -> disbox::Result<()> {
    /// let client = DisboxClient::new("https://discord.com/api/webhooks/1/token")?;
    /// let outcomes = client.download_folder("test folder", true).await?;
    /// println!("{} files", outcomes.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download_folder(&self, folder: &str, force: bool) -> Result<Vec<DownloadOutcome>> {
        self.download_folder_to(folder, Path::new(folder), force)
            .await
    }

    /// Same as [`download_folder`](Self::download_folder), writing into `to_folder`.
    pub async fn download_folder_to(
        &self,
        folder: &str,
        to_folder: &Path,
        force: bool,
    ) -> Result<Vec<DownloadOutcome>> {
        if folder_segments(folder).is_empty() {
            return Err(DisboxError::InvalidArgument(
                "folder must name a remote folder".to_string(),
            ));
        }

        let local = to_folder.to_path_buf();
        fs::create_dir_all(&local).await?;

        let files = self.list_files(Some(folder)).await?;
        let total = files.len();
        debug!("downloading {} files from {}", total, folder);

        let mut pacer = Pacer::new(
            self.config().task_interval,
            self.config().max_concurrent_downloads,
        );
        let mut tasks = JoinSet::new();

        for (index, file) in files.into_iter().enumerate() {
            let permit = pacer.ready().await;
            let client = self.clone();
            let local = local.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let result = client.download_entry(&file, Some(local.as_path()), force).await;
                (index, file.name, result)
            });
        }

        let mut outcomes: Vec<Option<DownloadOutcome>> = vec![None; total];
        let mut first_error = None;
        let mut failed = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(outcome))) => outcomes[index] = Some(outcome),
                Ok((_, name, Err(err))) => {
                    warn!("{} failed: {}", name, err);
                    failed += 1;
                    first_error.get_or_insert(err);
                }
                Err(err) => {
                    warn!("download task failed: {}", err);
                    failed += 1;
                    first_error.get_or_insert(DisboxError::TaskFailed(err.to_string()));
                }
            }
        }

        if let Some(err) = first_error {
            warn!("{} of {} downloads from {} failed", failed, total, folder);
            return Err(err);
        }

        Ok(outcomes.into_iter().flatten().collect())
    }
}
