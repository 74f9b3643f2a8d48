use std::time::Duration;

use configs::RetryConfig;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::UpstreamError;
use crate::observability::UPSTREAM_RETRIES_TOTAL;

/// Backoff policy for upstream calls. Disabled by default: one attempt per
/// call, no backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
    backoff_max: Duration,
    enabled: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        backoff_base: Duration,
        backoff_max: Duration,
        enabled: bool,
    ) -> Self {
        Self {
            max_attempts,
            backoff_base,
            backoff_max,
            enabled,
        }
    }

    pub fn disabled() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, false)
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(cfg.max_attempts, cfg.backoff_base(), cfg.backoff_max(), cfg.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    /// Delay before attempt `attempt + 1`: `base * 2^(attempt-1)`, capped.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if !self.enabled || attempt == 0 {
            return Duration::ZERO;
        }
        let base_ms = self.backoff_base.as_millis() as u64;
        let backoff_ms = base_ms.saturating_mul(2_u64.saturating_pow(attempt - 1));
        Duration::from_millis(backoff_ms.min(self.backoff_max.as_millis() as u64))
    }

    pub async fn wait_before_retry(&self, attempt: u32) {
        let backoff = self.backoff_for(attempt);
        if backoff.is_zero() {
            return;
        }
        debug!("Retrying in {:?} (attempt {})", backoff, attempt);
        sleep(backoff).await;
    }

    pub fn should_retry(&self, attempt: u32, error: &UpstreamError) -> bool {
        if !self.enabled {
            return false;
        }

        if attempt >= self.max_attempts() {
            debug!("Max retry attempts ({}) reached", self.max_attempts);
            return false;
        }

        if error.is_retryable() {
            debug!("Error is retryable: {}", error);
            true
        } else {
            warn!("Error is not retryable: {}", error);
            false
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy runs out of attempts. The last error is returned unchanged.
pub async fn retry_with_policy<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, UpstreamError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("Operation succeeded after {} retries", attempt - 1);
                }
                return Ok(result);
            }
            Err(error) => {
                if policy.should_retry(attempt, &error) {
                    warn!("Operation failed on attempt {}: {}", attempt, error);
                    UPSTREAM_RETRIES_TOTAL.inc();
                    policy.wait_before_retry(attempt).await;
                    continue;
                }
                return Err(error);
            }
        }
    }
}
