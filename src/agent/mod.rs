/// Batch planning
pub mod batch;
/// Price text cleaning and the two-stage field lookup
pub mod extractor;
/// Scrape of one price type, batch by batch
pub mod orchestrator;
/// Bank page profiles
pub mod profile;

pub use orchestrator::{Agent, ScrapeOutcome};

use crate::error::AppResult;
use crate::presentation::instrument::PriceType;
use async_trait::async_trait;

/// Something that can scrape one price type
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Price type produced by [`scrape`](Scraper::scrape)
    fn price_type(&self) -> PriceType;

    /// Runs one complete scrape
    async fn scrape(&self) -> AppResult<ScrapeOutcome>;
}

#[async_trait]
impl Scraper for Agent {
    fn price_type(&self) -> PriceType {
        Agent::price_type(self)
    }

    async fn scrape(&self) -> AppResult<ScrapeOutcome> {
        Agent::scrape(self).await
    }
}
