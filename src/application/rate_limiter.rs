/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Navigation throttle
//!
//! Page loads go through a `governor` token bucket so a long instrument list
//! cannot hit the bank's site faster than the configured rate.

use crate::application::config::RateLimiterConfig;
use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Token bucket shared by every navigation of an agent
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<GovernorRateLimiter<NotKeyed, InMemoryState, QuantaClock>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_requests` per `period_seconds`, with
    /// up to `burst_size` navigations back to back
    ///
    /// Zero values fall back to one request per minute.
    #[must_use]
    pub fn new(config: &RateLimiterConfig) -> Self {
        let limiter = GovernorRateLimiter::direct(quota_for(config));
        Self {
            limiter: Arc::new(limiter),
        }
    }

    /// Waits until the next navigation is allowed
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Whether a navigation is allowed right now; consumes a token if so
    #[must_use]
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

fn quota_for(config: &RateLimiterConfig) -> Quota {
    let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);
    let replenish = match config.max_requests {
        0 => None,
        n => Some(Duration::from_secs(config.period_seconds) / n),
    };

    match replenish.and_then(Quota::with_period) {
        Some(quota) => quota.allow_burst(burst),
        None => {
            warn!(
                "Invalid navigation rate {}/{}s, using 1 per minute",
                config.max_requests, config.period_seconds
            );
            Quota::per_minute(NonZeroU32::MIN).allow_burst(burst)
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limiter", &"GovernorRateLimiter")
            .finish()
    }
}
