//! Retry with exponential backoff

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use shiplog_core::config::AiConfig;

use crate::error::ProviderError;

/// How a call site retries a backend
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempt ceiling, including the first call
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Backoff cap
    pub max_delay: Duration,
    /// Bound on each attempt
    pub attempt_timeout: Duration,
    /// Which errors are worth another attempt
    pub retryable: fn(&ProviderError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&AiConfig::default())
    }
}

impl RetryPolicy {
    /// Policy from the `ai` settings
    pub fn from_config(config: &AiConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            attempt_timeout: Duration::from_secs(config.timeout_secs.max(1)),
            retryable: ProviderError::is_retryable,
        }
    }

    /// Delay after the given failed attempt (1-based): `base * 2^(n-1)`, capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `call` until it succeeds, fails for good or runs out of attempts
    pub async fn run<F, Fut, T>(&self, label: &str, call: F) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match tokio::time::timeout(self.attempt_timeout, call()).await {
                Ok(Ok(value)) => {
                    debug!(label, attempt, "call succeeded");
                    return Ok(value);
                }
                Ok(Err(e)) => e,
                Err(_) => ProviderError::Timeout(format!(
                    "no answer within {}s",
                    self.attempt_timeout.as_secs_f32()
                )),
            };

            if !(self.retryable)(&error) || attempt >= self.max_attempts {
                return Err(error);
            }

            let mut delay = self.delay_for(attempt);
            if let ProviderError::RateLimited {
                retry_after: Some(secs),
            } = &error
            {
                delay = delay.max(Duration::from_secs(*secs)).min(self.max_delay);
            }
            warn!(
                label,
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
