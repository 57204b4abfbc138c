//! Fixed-interval retry budgets.

use std::time::Duration;

/// A fixed-interval polling budget: one initial try plus `attempts` retries,
/// sleeping `interval` before each retry. No backoff, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    /// Waiting for the locally run container to accept connections.
    pub const LOCAL_CONTAINER: Self = Self::new(10, Duration::from_secs(1));
    /// Waiting for `/status` to report the status token.
    pub const STATUS_ENDPOINT: Self = Self::new(60, Duration::from_secs(5));
    /// Waiting for the deployed container-image API to accept connections.
    pub const IMAGE_ENDPOINT: Self = Self::new(30, Duration::from_secs(1));

    #[must_use]
    pub const fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Total number of calls made before giving up.
    #[must_use]
    pub const fn total_calls(&self) -> u32 {
        self.attempts.saturating_add(1)
    }
}
