//! Task start pacing and concurrency limiting for batch downloads.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{Instant, sleep_until};

/// Spaces out task starts by a fixed interval and optionally caps how many run at once.
///
/// The first `ready` call returns immediately; each later call waits until `interval`
/// has passed since the previous one returned.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    next_start: Option<Instant>,
    limit: Option<Arc<Semaphore>>,
}

impl Pacer {
    pub fn new(interval: Duration, max_concurrent: Option<usize>) -> Self {
        Self {
            interval,
            next_start: None,
            limit: max_concurrent.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Wait for the next start slot.
    ///
    /// Returns a permit to hold for the lifetime of the task when a cap is configured.
    pub async fn ready(&mut self) -> Option<OwnedSemaphorePermit> {
        if let Some(next_start) = self.next_start {
            sleep_until(next_start).await;
        }

        let permit = match &self.limit {
            // The semaphore is never closed.
            Some(limit) => limit.clone().acquire_owned().await.ok(),
            None => None,
        };

        self.next_start = Some(Instant::now() + self.interval);
        permit
    }
}
