//! Error types for the disbox library.

use thiserror::Error;

/// Main error type for disbox operations.
#[derive(Error, Debug)]
pub enum DisboxError {
    /// Caller passed a value of the wrong shape.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Folder segment, file name or file id absent in the remote tree.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A name resolved to a directory where a file was expected.
    #[error("{0} is not a file")]
    NotAFile(String),

    /// Network request error.
    #[error("Transfer error: {0}")]
    TransferError(#[from] reqwest::Error),

    /// HTTP request failed with status code.
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Response was missing fields or had an unexpected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Metadata server rejected an update.
    #[error("Metadata update rejected with status {0}")]
    RemoteUpdate(u16),

    /// Target name is already taken.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Transfer stopped by the progress callback.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// A spawned download task did not run to completion.
    #[error("Download task failed: {0}")]
    TaskFailed(String),
}

impl DisboxError {
    /// True for errors caused by an absent folder, file name or id.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DisboxError::NotFound(_))
    }

    /// True for errors raised while talking to the metadata server or webhook.
    pub fn is_transfer(&self) -> bool {
        matches!(self, DisboxError::TransferError(_) | DisboxError::HttpError(_))
    }

    /// True when a server answered with something that could not be understood,
    /// whether it failed to parse as JSON or parsed but had the wrong shape.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            DisboxError::MalformedResponse(_) | DisboxError::JsonError(_)
        )
    }
}

/// Result type alias for disbox operations.
pub type Result<T> = std::result::Result<T, DisboxError>;
