//! Fixed-interval driver of the scrape-and-persist cycle
//!
//! Each firing runs the metal scrape then the currency scrape, each preceded
//! by a random pause. Firings never overlap: a run is awaited before the
//! next tick is taken and ticks missed meanwhile are dropped.

use crate::agent::{Agent, Scraper};
use crate::application::clock::{Clock, SystemClock};
use crate::application::config::{Config, SchedulerConfig};
use crate::application::rate_limiter::RateLimiter;
use crate::application::retry::{RetryConfig, with_retry};
use crate::browser::interface::DriverFactory;
use crate::browser::webdriver::WebDriverFactory;
use crate::error::{AppError, AppResult};
use crate::presentation::instrument::PriceType;
use crate::presentation::report::{RunReport, StageReport};
use crate::storage::change_detection::PriceService;
use crate::storage::records::PriceRepository;
use crate::utils::id::new_run_id;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, error, info, info_span, warn};

/// Half-open range `[min, max)` a pause is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterRange {
    min: Duration,
    max: Duration,
}

impl JitterRange {
    /// Creates a range; an empty range always yields `min`
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// `[0, max)`
    #[must_use]
    pub fn up_to(max: Duration) -> Self {
        Self::new(Duration::ZERO, max)
    }

    /// Lower bound
    #[must_use]
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Upper bound, exclusive
    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws a pause, with millisecond resolution
    #[must_use]
    pub fn sample(&self) -> Duration {
        let min = duration_millis(self.min);
        let max = duration_millis(self.max);
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rand::rng().random_range(min..max))
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl SchedulerConfig {
    /// Pause drawn before scraping `price_type`
    #[must_use]
    pub fn jitter_for(&self, price_type: PriceType) -> JitterRange {
        match price_type {
            PriceType::Metal => JitterRange::up_to(Duration::from_secs(self.metal_jitter_max_secs)),
            PriceType::Currency => JitterRange::new(
                Duration::from_secs(self.currency_jitter_min_secs),
                Duration::from_secs(self.currency_jitter_max_secs),
            ),
        }
    }
}

/// Clears the running flag however the run ends
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs the scrape-and-persist cycle, once or on a fixed interval
pub struct PriceUpdater {
    scrapers: Vec<Arc<dyn Scraper>>,
    service: PriceService,
    scheduler: SchedulerConfig,
    retry: RetryConfig,
    clock: Arc<dyn Clock>,
    running: AtomicBool,
}

impl PriceUpdater {
    /// Creates an updater; scrapers run in [`PriceType::SCRAPE_ORDER`]
    /// whatever order they are given in
    pub fn new(
        scrapers: Vec<Arc<dyn Scraper>>,
        service: PriceService,
        scheduler: SchedulerConfig,
        retry: RetryConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut scrapers = scrapers;
        scrapers.sort_by_key(|scraper| {
            PriceType::SCRAPE_ORDER
                .iter()
                .position(|pt| *pt == scraper.price_type())
                .unwrap_or(usize::MAX)
        });

        Self {
            scrapers,
            service,
            scheduler: scheduler.sanitized(),
            retry,
            clock,
            running: AtomicBool::new(false),
        }
    }

    /// Wires WebDriver agents for every price type the configured bank
    /// publishes, sharing one navigation throttle
    ///
    /// # Errors
    /// [`AppError::Config`] when the bank publishes nothing.
    pub fn from_config(config: &Config, repository: Arc<dyn PriceRepository>) -> AppResult<Self> {
        let factory: Arc<dyn DriverFactory> = Arc::new(WebDriverFactory);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::with_factory(config, repository, factory, clock)
    }

    /// Same as [`from_config`](Self::from_config) with an explicit driver
    /// factory and clock
    ///
    /// # Errors
    /// [`AppError::Config`] when the bank publishes nothing.
    pub fn with_factory(
        config: &Config,
        repository: Arc<dyn PriceRepository>,
        factory: Arc<dyn DriverFactory>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let throttle = RateLimiter::new(&config.rate_limiter);
        let mut scrapers: Vec<Arc<dyn Scraper>> = Vec::new();

        for price_type in PriceType::SCRAPE_ORDER {
            match Agent::new(
                config.bank,
                price_type,
                factory.clone(),
                config.browser.clone(),
                clock.clone(),
            ) {
                Ok(agent) => scrapers.push(Arc::new(agent.with_throttle(throttle.clone()))),
                Err(e) => warn!("Skipping {} {}: {}", config.bank, price_type, e),
            }
        }

        if scrapers.is_empty() {
            return Err(AppError::Config(format!(
                "{} publishes no supported price type",
                config.bank
            )));
        }

        Ok(Self::new(
            scrapers,
            PriceService::new(repository),
            config.scheduler.clone(),
            config.retry.clone(),
            clock,
        ))
    }

    /// Schedule in effect
    #[must_use]
    pub fn scheduler(&self) -> &SchedulerConfig {
        &self.scheduler
    }

    /// Whether a cycle is in progress
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs one full cycle: for each price type, a random pause, the scrape
    /// and the change-detecting save
    ///
    /// A stage that fails is recorded in the report and the next stage still
    /// runs.
    ///
    /// # Errors
    /// [`AppError::InvalidState`] when another cycle is already running.
    pub async fn run_once(&self) -> AppResult<RunReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::InvalidState(
                "a price update is already running".to_string(),
            ));
        }
        let _guard = RunGuard(&self.running);

        let run_id = new_run_id();
        let span = info_span!("run", run_id = %run_id);
        async {
            let started_at_millis = self.clock.now_millis();
            info!("Price update started");

            let mut stages = Vec::with_capacity(self.scrapers.len());
            for scraper in &self.scrapers {
                stages.push(self.run_stage(scraper.as_ref()).await);
            }

            let report = RunReport {
                run_id: run_id.clone(),
                started_at_millis,
                finished_at_millis: self.clock.now_millis(),
                stages,
            };
            info!(
                "Price update finished: {} records inserted, success = {}",
                report.total_inserted(),
                report.is_success()
            );
            Ok::<RunReport, AppError>(report)
        }
        .instrument(span)
        .await
    }

    async fn run_stage(&self, scraper: &dyn Scraper) -> StageReport {
        let price_type = scraper.price_type();
        let pause = self.scheduler.jitter_for(price_type).sample();
        info!("Waiting {:?} before the {} scrape", pause, price_type);
        tokio::time::sleep(pause).await;

        let label = format!("{price_type} scrape");
        match with_retry(&self.retry, &label, move || scraper.scrape()).await {
            Ok(outcome) => {
                let stats = self
                    .service
                    .upsert_if_changed(price_type, &outcome.observations)
                    .await;
                StageReport::completed(price_type, outcome.observations.len(), stats)
            }
            Err(e) => {
                error!("{} failed: {}", label, e);
                StageReport::failed(price_type, e.to_string())
            }
        }
    }

    /// Fires [`run_once`](Self::run_once) every interval until `shutdown`
    /// completes
    ///
    /// The first firing happens immediately. Each run is spawned so that a
    /// panic inside it is caught and logged; the loop keeps going either way.
    pub async fn run_forever<S>(self: Arc<Self>, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.scheduler.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            "Scheduler started, firing every {:?}",
            self.scheduler.interval()
        );
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let updater = Arc::clone(&self);
                    let run = tokio::spawn(async move { updater.run_once().await });
                    match run.await {
                        Ok(Ok(report)) => info!("Run {} done\n{}", report.run_id, report),
                        Ok(Err(e)) => error!("Run skipped: {}", e),
                        Err(e) => error!("Run aborted: {}", e),
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for PriceUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceUpdater")
            .field("scrapers", &self.scrapers.len())
            .field("scheduler", &self.scheduler)
            .field("running", &self.is_running())
            .finish()
    }
}
