use crate::agent::batch::{Batch, plan_batches};
use crate::agent::extractor::FieldExtractor;
use crate::agent::profile::{BankProfile, profile_for};
use crate::application::clock::Clock;
use crate::application::rate_limiter::RateLimiter;
use crate::browser::config::BrowserConfig;
use crate::browser::interface::DriverFactory;
use crate::browser::session::BrowserSession;
use crate::constants::BATCH_SIZE;
use crate::error::{AppError, AppResult};
use crate::presentation::instrument::{Bank, Instrument, PriceType, instruments_for_type};
use crate::presentation::price::{PriceObservation, PriceSide, assemble};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of one scrape of a price type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeOutcome {
    /// Fully priced instruments keyed by instrument code
    pub observations: HashMap<String, PriceObservation>,
    /// Batches attempted
    pub batches: usize,
    /// Batches whose page could not be loaded
    pub failed_batches: usize,
    /// Codes of instruments left out of `observations`, in catalog order
    pub omitted: Vec<String>,
}

/// Scrapes one price type of one bank
///
/// Each call to [`scrape`](Agent::scrape) opens its own browser session and
/// closes it before returning. When the scrape panics or its future is
/// dropped, the session quits the browser from its `Drop`.
pub struct Agent {
    bank: Bank,
    price_type: PriceType,
    profile: &'static BankProfile,
    instruments: Vec<&'static Instrument>,
    factory: Arc<dyn DriverFactory>,
    browser: BrowserConfig,
    clock: Arc<dyn Clock>,
    throttle: Option<RateLimiter>,
    batch_size: usize,
}

impl Agent {
    /// Creates an agent for `(bank, price_type)`
    ///
    /// # Errors
    /// [`AppError::Config`] when the bank does not publish this price type or
    /// its profile is malformed.
    pub fn new(
        bank: Bank,
        price_type: PriceType,
        factory: Arc<dyn DriverFactory>,
        browser: BrowserConfig,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let profile = profile_for(bank, price_type).ok_or_else(|| {
            AppError::Config(format!("{bank} does not publish {price_type} prices"))
        })?;
        profile.validate()?;

        Ok(Self {
            bank,
            price_type,
            profile,
            instruments: instruments_for_type(bank, price_type),
            factory,
            browser,
            clock,
            throttle: None,
            batch_size: BATCH_SIZE,
        })
    }

    /// Routes every navigation through `throttle`
    #[must_use]
    pub fn with_throttle(mut self, throttle: RateLimiter) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Restricts the scrape to `instruments`, kept in the given order
    #[must_use]
    pub fn with_instruments(mut self, instruments: Vec<&'static Instrument>) -> Self {
        self.instruments = instruments;
        self
    }

    /// Instruments scraped, in page order
    #[must_use]
    pub fn instruments(&self) -> &[&'static Instrument] {
        &self.instruments
    }

    /// Bank being scraped
    #[must_use]
    pub fn bank(&self) -> Bank {
        self.bank
    }

    /// Price type being scraped
    #[must_use]
    pub fn price_type(&self) -> PriceType {
        self.price_type
    }

    /// Scrapes every instrument of the price type, a batch per page
    ///
    /// Instruments missing a side, and every instrument of a batch whose page
    /// failed to load, are left out of the result.
    ///
    /// # Errors
    /// [`AppError::SessionStartup`] when no browser can be started; nothing is
    /// scraped in that case.
    pub async fn scrape(&self) -> AppResult<ScrapeOutcome> {
        let instruments = &self.instruments;
        if instruments.is_empty() {
            info!("No {} instruments for {}, nothing to scrape", self.price_type, self.bank);
            return Ok(ScrapeOutcome::default());
        }

        let batches = plan_batches(instruments, self.batch_size);
        info!(
            "Scraping {} {} instruments of {} in {} batches",
            instruments.len(),
            self.price_type,
            self.bank,
            batches.len()
        );

        let mut session = BrowserSession::new(self.factory.clone(), self.browser.clone());
        if let Err(e) = session.create().await {
            session.close().await;
            return Err(e);
        }

        let mut outcome = ScrapeOutcome {
            batches: batches.len(),
            ..ScrapeOutcome::default()
        };
        for batch in &batches {
            self.scrape_batch(&mut session, batch, &mut outcome).await;
        }
        session.close().await;

        info!(
            "{} {}: {} priced, {} omitted, {}/{} batches failed",
            self.bank,
            self.price_type,
            outcome.observations.len(),
            outcome.omitted.len(),
            outcome.failed_batches,
            outcome.batches
        );
        Ok(outcome)
    }

    /// Scrapes and returns only the observations, keyed by instrument code
    ///
    /// # Errors
    /// Same as [`scrape`](Agent::scrape).
    pub async fn run_scrape(&self) -> AppResult<HashMap<String, PriceObservation>> {
        Ok(self.scrape().await?.observations)
    }

    async fn scrape_batch(
        &self,
        session: &mut BrowserSession,
        batch: &Batch<'_>,
        outcome: &mut ScrapeOutcome,
    ) {
        if let Some(throttle) = &self.throttle {
            throttle.wait().await;
        }

        let loaded = match self.profile.build_url(&batch.codes()) {
            Ok(url) => session.navigate(&url).await,
            Err(e) => Err(e),
        };
        if let Err(e) = loaded {
            error!("Batch {} of {} failed: {}", batch.index, self.price_type, e);
            outcome.failed_batches += 1;
            outcome
                .omitted
                .extend(batch.instruments().map(|i| i.code.to_string()));
            return;
        }

        let extractor = FieldExtractor::new(self.profile);
        for instrument in batch.instruments() {
            match self.price_instrument(&extractor, session, instrument).await {
                Some(observation) => {
                    outcome
                        .observations
                        .insert(instrument.code.to_string(), observation);
                }
                None => outcome.omitted.push(instrument.code.to_string()),
            }
        }
        debug!("Batch {} of {} done", batch.index, self.price_type);
    }

    async fn price_instrument(
        &self,
        extractor: &FieldExtractor<'_>,
        session: &BrowserSession,
        instrument: &Instrument,
    ) -> Option<PriceObservation> {
        let buy = extractor.extract(session, instrument, PriceSide::Buy).await;
        let sell = extractor.extract(session, instrument, PriceSide::Sell).await;
        assemble(self.bank, instrument, buy, sell, self.clock.now_millis())
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("bank", &self.bank)
            .field("price_type", &self.price_type)
            .field("instruments", &self.instruments.len())
            .field("batch_size", &self.batch_size)
            .field("throttled", &self.throttle.is_some())
            .finish()
    }
}
