/// Capture time source
pub mod clock;
/// Application configuration module
pub mod config;
/// Navigation throttle
pub mod rate_limiter;
/// Retry policy for runs that cannot start
pub mod retry;
/// Fixed-interval price updater
pub mod scheduler;

pub use clock::{Clock, SystemClock};
pub use config::{Config, RateLimiterConfig, SchedulerConfig};
pub use rate_limiter::RateLimiter;
pub use retry::{RetryConfig, with_retry};
pub use scheduler::{JitterRange, PriceUpdater};
