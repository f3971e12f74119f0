// SPDX-FileCopyrightText: 2026 Officiant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded retry-with-backoff for the UI layer.
//!
//! Stale element references and intercepted clicks are short-lived: the
//! same operation usually succeeds a moment later. [`RetryPolicy`] retries
//! an operation while its error satisfies a predicate, sleeping a fixed
//! backoff between attempts, and gives up after a fixed number of attempts
//! by returning the last error.

use std::future::Future;
use std::time::Duration;

use officiant_config::RetryConfig;
use officiant_core::error::OfficiantError;
use tracing::{debug, warn};

/// A fixed-count, fixed-backoff retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    /// A policy that runs the operation exactly once.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Policy for log reads and command submission.
    pub fn transient(config: &RetryConfig) -> Self {
        Self::new(
            config.transient_attempts,
            Duration::from_millis(config.transient_backoff_ms),
        )
    }

    /// Policy for button presses and emoji reactions.
    pub fn click(config: &RetryConfig) -> Self {
        Self::new(
            config.click_attempts,
            Duration::from_millis(config.click_backoff_ms),
        )
    }

    /// Runs `op`, retrying on [`OfficiantError::is_transient`] failures.
    pub async fn run<T, F, Fut>(&self, what: &str, op: F) -> Result<T, OfficiantError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OfficiantError>>,
    {
        self.run_while(what, OfficiantError::is_transient, op).await
    }

    /// Runs `op`, retrying while the failure satisfies `retryable`.
    ///
    /// Errors that do not satisfy `retryable` are returned immediately.
    pub async fn run_while<T, F, Fut, P>(
        &self,
        what: &str,
        retryable: P,
        mut op: F,
    ) -> Result<T, OfficiantError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OfficiantError>>,
        P: Fn(&OfficiantError) -> bool,
    {
        let attempts = self.attempts.max(1);

        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(what, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if attempt < attempts && retryable(&err) => {
                    warn!(what, attempt, error = %err, "retrying after failure");
                    tokio::time::sleep(self.backoff).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(OfficiantError::Internal(format!(
            "retry loop for {what} ended without a result"
        )))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::transient(&RetryConfig::default())
    }
}
