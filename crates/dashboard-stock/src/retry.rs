//! Retry logic with exponential backoff
//!
//! Every failed attempt waits out its delay before the next attempt is
//! counted, including the final one, so a policy of 3 attempts starting at
//! 10 s spends 10 + 20 + 40 s before reporting exhaustion.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,

    /// Delay after the first failure
    pub initial_backoff: Duration,

    /// Backoff multiplier (2.0 doubles the delay after each failure)
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, initial_backoff: Duration, backoff_multiplier: f64) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            backoff_multiplier,
        }
    }

    /// Create a policy with no retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Delay that follows the given failed attempt (1-based)
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        self.initial_backoff
            .mul_f64(self.backoff_multiplier.powi(exponent))
    }

    /// Sum of every delay an always-failing operation incurs
    pub fn worst_case_delay(&self) -> Duration {
        (1..=self.max_attempts).map(|a| self.backoff_duration(a)).sum()
    }

    /// Execute an async operation with retry logic
    ///
    /// # Arguments
    ///
    /// * `operation_name` - Name of the operation (for logging)
    /// * `operation` - Async operation to execute
    ///
    /// # Returns
    ///
    /// Result of the operation, or the last error if all attempts fail.
    /// `None` is only returned for a policy with zero attempts.
    pub async fn execute<F, Fut, T, E>(
        &self,
        operation_name: &str,
        mut operation: F,
    ) -> Option<Result<T, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            debug!(
                "Attempt {}/{} for operation: {}",
                attempt, self.max_attempts, operation_name
            );

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(
                            "Operation '{}' succeeded after {} retries",
                            operation_name,
                            attempt - 1
                        );
                    }
                    return Some(Ok(result));
                }
                Err(e) => {
                    let backoff = self.backoff_duration(attempt);
                    warn!(
                        "Operation '{}' failed (attempt {}/{}): {}. Retrying after {:?}",
                        operation_name, attempt, self.max_attempts, e, backoff
                    );
                    last_error = Some(e);
                    sleep(backoff).await;
                }
            }
        }

        last_error.map(Err)
    }
}
