//! Retry policy for fetch failures
//!
//! Only transport-level failures are retried. Extraction drops (thin
//! content, malformed URLs) never reach this module.

use crate::config::RetryConfig;
use crate::crawler::FetchError;
use crate::state::CrawlTask;
use std::time::Duration;

/// A task to run again after waiting `backoff`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryDecision {
    pub task: CrawlTask,
    pub backoff: Duration,
}

/// Decides whether a failed fetch is attempted again
///
/// | Attempt so far | Action |
/// |----------------|--------|
/// | < max_retries  | Same task, attempt + 1, exponential backoff |
/// | ≥ max_retries  | Terminal, no task |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the retry for `task`, or None once its attempts are used up
    ///
    /// The retried task re-enters the same stage and bypasses the visited
    /// set, since its URL is already marked.
    pub fn on_failure(&self, task: &CrawlTask, _error: &FetchError) -> Option<RetryDecision> {
        (task.attempt < self.max_retries).then(|| RetryDecision {
            task: task.next_attempt(),
            backoff: self.backoff_for(task.attempt),
        })
    }

    /// Backoff before retry number `attempt + 1`: initial × 2^attempt, capped
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
