//! Progress reporting for file downloads.

use std::sync::Arc;

/// Progress information for a download.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    /// Bytes written so far
    pub done: u64,
    /// Size reported by the metadata server
    pub total: u64,
    /// Name of the file being downloaded
    pub filename: String,
}

impl TransferProgress {
    /// Create a new progress report.
    pub fn new(done: u64, total: u64, filename: impl Into<String>) -> Self {
        Self {
            done,
            total,
            filename: filename.into(),
        }
    }

    /// Get progress as a percentage (0.0 to 100.0).
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.done as f64 / self.total as f64 * 100.0).min(100.0)
    }

    /// Check if transfer is complete.
    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }
}

/// Callback invoked after every chunk written to disk.
///
/// Folder downloads call it from several tasks at once. Return `false` to cancel that download.
pub type ProgressCallback = Arc<dyn Fn(&TransferProgress) -> bool + Send + Sync>;
