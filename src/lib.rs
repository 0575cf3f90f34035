//! # bank-agent
//!
//! Periodically scrapes buy/sell quotes for currencies and precious metals from a
//! bank's public quote pages, turns them into exact-decimal price observations and
//! keeps an append-only history that only grows when a price actually changes.
//!
//! The pipeline is:
//!
//! ```text
//! PriceUpdater (scheduler + jitter)
//!   -> Agent::scrape (batches of 5 instruments per page)
//!        -> BrowserSession (one WebDriver session per run)
//!        -> FieldExtractor (primary locator, fallback locator, decimal parsing)
//!        -> assemble (buy + sell -> PriceObservation)
//!   -> PriceService::upsert_if_changed (latest record vs. new observation)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bank_agent::prelude::*;
//!
//! setup_logger();
//! let config = Config::new();
//! let pool = config.pg_pool().await?;
//! let repository = PgPriceRepository::new(pool);
//! repository.initialize_tables().await?;
//!
//! let updater = PriceUpdater::from_config(&config, Arc::new(repository))?;
//! let report = updater.run_once().await?;
//! ```

/// Scraping agents: bank profiles, batch planning, field extraction and orchestration
pub mod agent;
/// Scheduling, configuration and cross-cutting runtime services
pub mod application;
/// Headless browser session management
pub mod browser;
/// Crate-wide constants
pub mod constants;
/// Error types
pub mod error;
/// Convenient re-exports of the most used types
pub mod prelude;
/// Domain models: instruments, observations and reports
pub mod presentation;
/// Price history persistence
pub mod storage;
/// Environment, logging and id helpers
pub mod utils;

/// Crate version as declared in `Cargo.toml`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version
#[must_use]
pub fn version() -> &'static str {
    VERSION
}
