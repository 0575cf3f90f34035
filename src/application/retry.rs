/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/
use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_SECS};
use crate::error::AppResult;
use crate::utils::config::get_env_or_default;
use pretty_simple_display::{DebugPretty, DisplaySimple};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry policy for runs that could not start a browser
#[derive(DebugPretty, DisplaySimple, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, the first one included; zero is treated as one
    pub max_retry_count: u32,
    /// Fixed delay between attempts, in seconds
    pub retry_delay_secs: u64,
}

impl RetryConfig {
    /// Reads `MAX_RETRY_COUNT` and `RETRY_DELAY_SECS`
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_retry_count: get_env_or_default("MAX_RETRY_COUNT", DEFAULT_MAX_RETRIES),
            retry_delay_secs: get_env_or_default("RETRY_DELAY_SECS", DEFAULT_RETRY_DELAY_SECS),
        }
    }

    /// Creates a policy with both values set
    #[must_use]
    pub fn with_max_retries_and_delay(max_retries: u32, delay_secs: u64) -> Self {
        Self {
            max_retry_count: max_retries,
            retry_delay_secs: delay_secs,
        }
    }

    /// A single attempt, no retries
    #[must_use]
    pub fn none() -> Self {
        Self::with_max_retries_and_delay(1, 0)
    }

    /// Number of attempts, at least one
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_retry_count.max(1)
    }

    /// Delay between attempts
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::with_max_retries_and_delay(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_SECS)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error or
/// runs out of attempts
///
/// Only errors that abort a whole run are retried; everything below that
/// level is already absorbed by the scrape itself.
///
/// # Errors
/// The last error returned by `operation`.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, label: &str, mut operation: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let attempts = config.attempts();
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_fatal_to_run() && attempt < attempts => {
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    label,
                    attempt,
                    attempts,
                    e,
                    config.delay()
                );
                tokio::time::sleep(config.delay()).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
