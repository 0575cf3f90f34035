/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # Bank Agent Prelude
//!
//! The types needed to configure and run the agent, in one import.
//!
//! ```rust,ignore
//! use bank_agent::prelude::*;
//!
//! let config = Config::new();
//! let updater = PriceUpdater::from_config(&config, repository)?;
//! ```

/// Library version information
pub use crate::{VERSION, version};

pub use crate::error::{AppError, AppResult};

pub use crate::application::clock::{Clock, SystemClock};
pub use crate::application::config::{Config, RateLimiterConfig, SchedulerConfig};
pub use crate::application::rate_limiter::RateLimiter;
pub use crate::application::retry::{RetryConfig, with_retry};
pub use crate::application::scheduler::{JitterRange, PriceUpdater};

pub use crate::agent::batch::{Batch, Slot, batch_count, plan_batches};
pub use crate::agent::extractor::{FieldExtractor, LocatorKind, parse_price};
pub use crate::agent::profile::{BankProfile, profile_for};
pub use crate::agent::{Agent, ScrapeOutcome, Scraper};

pub use crate::browser::{
    BrowserConfig, BrowserSession, DriverFactory, Located, PageDriver, SessionState,
    WebDriverFactory,
};

pub use crate::presentation::instrument::{
    Bank, Instrument, PriceType, find_by_code, find_by_display_name, instruments_for,
    instruments_for_type,
};
pub use crate::presentation::price::{PriceObservation, PriceSide, assemble};
pub use crate::presentation::report::{RunReport, StageReport, observations_table};

pub use crate::storage::change_detection::{PriceService, StorageStats};
pub use crate::storage::config::DatabaseConfig;
pub use crate::storage::postgres::PgPriceRepository;
pub use crate::storage::records::{NewPriceRecord, PersistedPriceRecord, PriceRepository};

pub use crate::utils::config::get_env_or_default;
pub use crate::utils::id::new_run_id;
pub use crate::utils::logger::setup_logger;

pub use std::sync::Arc;
