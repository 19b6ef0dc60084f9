use serde::{Serialize, Deserialize};
use std::future::Future;
use std::time::Duration;
use rand::Rng;
use tracing::warn;

use crate::{LiteError, Result};

/// Retry configuration for wrapping public client calls.
///
/// Nothing in the client retries on its own; callers opt in by wrapping a
/// whole operation with [`with_retry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(LiteError::Config("Max attempts cannot be 0".into()));
        }
        if self.backoff_factor < 1.0 {
            return Err(LiteError::Config("Backoff factor must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.jitter_factor) {
            return Err(LiteError::Config("Jitter factor must be in [0, 1)".into()));
        }
        Ok(())
    }

    /// Delay before the retry following `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay.as_secs_f64();
        let max_delay = self.max_delay.as_secs_f64();
        let backoff = (base_delay * self.backoff_factor.powi(attempt.saturating_sub(1) as i32))
            .min(max_delay);

        let jitter_range = backoff * self.jitter_factor;
        let jitter = if jitter_range > 0.0 {
            rand::rng().random_range(-jitter_range..jitter_range)
        } else {
            0.0
        };

        Duration::from_secs_f64((backoff + jitter).clamp(0.0, max_delay))
    }
}

/// Retry an operation while it fails with a retryable error
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    config.validate()?;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) if error.is_retryable() && attempt < config.max_attempts => {
                let delay = config.delay_for(attempt);
                warn!(%error, attempt, ?delay, "retrying lite query");
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
