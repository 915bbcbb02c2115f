//! # disbox
//!
//! Async client library for DisBox storage, where file content lives as attachments on a
//! messaging webhook channel and a metadata server keeps the directory index.
//!
//! ## Features
//!
//! - **Browsing**: fetch the directory index, walk folder paths, look files up by id or name,
//!   list a folder's files or pick a random one.
//! - **Downloads**: reassemble a file from its chunk attachments in order, skipping files
//!   that already exist unless a re-download is forced.
//! - **Folder downloads**: download every file of a folder concurrently, with task starts
//!   spaced by a configurable interval and an optional concurrency cap.
//! - **Metadata updates**: rename files or merge arbitrary fields.
//! - **Progress tracking** with custom callbacks.
//!
//! Every call re-fetches the tree; nothing is cached between calls.
//!
//! ## Example
//!
//! ```no_run
//! use disbox::DisboxClient;
//!
//! # async fn example() -> disbox::Result<()> {
//! let client = DisboxClient::new("https://discord.com/api/webhooks/123/token")?;
//!
//! for file in client.list_files(Some("test folder")).await? {
//!     println!("{} ({})", file.name, disbox::format_size(file.size));
//! }
//!
//! client.download_folder("test folder", false).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod pacer;
pub mod progress;
pub mod size;

// Re-export commonly used types
pub use client::DisboxClient;
pub use config::ClientConfig;
pub use error::{DisboxError, Result};
pub use fs::{DirectoryNode, DownloadOutcome, FileEntry, FileRef, Node, NodeType};
pub use progress::{ProgressCallback, TransferProgress};
pub use size::format_size;
