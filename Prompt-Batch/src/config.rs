use std::time::Duration;

use crate::submit::RetryPolicy;

/// Default number of concurrent submit calls.
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Configuration for a [`BatchRunner`](crate::runner::BatchRunner).
///
/// Use [`BatchConfig::builder()`] for ergonomic construction, or
/// [`BatchConfig::default()`] for five workers with no retries and no
/// per-call deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum submit calls in flight at once. Must be at least 1.
    pub max_workers: usize,

    /// Retry policy applied around every submit call. `None` = single attempt.
    pub retry: Option<RetryPolicy>,

    /// Upper bound for a single submit attempt. `None` = wait indefinitely.
    pub submit_timeout: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            retry: None,
            submit_timeout: None,
        }
    }
}

impl BatchConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }
}

/// Builder for [`BatchConfig`].
#[derive(Default)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    /// Set the worker cap.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.config.max_workers = workers;
        self
    }

    /// Retry failed submit calls according to `policy`.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = Some(policy);
        self
    }

    /// Fail any single submit attempt that runs longer than `timeout`.
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.config.submit_timeout = Some(timeout);
        self
    }

    /// Build the final [`BatchConfig`].
    pub fn build(self) -> BatchConfig {
        self.config
    }
}
