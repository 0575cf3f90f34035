#![allow(dead_code)]

use async_trait::async_trait;
use bank_agent::agent::profile::profile_for;
use bank_agent::agent::{ScrapeOutcome, Scraper};
use bank_agent::application::clock::Clock;
use bank_agent::browser::config::BrowserConfig;
use bank_agent::browser::interface::{DriverFactory, Located, PageDriver};
use bank_agent::error::{AppError, AppResult};
use bank_agent::presentation::instrument::{Bank, Instrument, PriceType, instruments_for_type};
use bank_agent::presentation::price::{PriceObservation, PriceSide};
use bank_agent::storage::records::{NewPriceRecord, PersistedPriceRecord, PriceRepository};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const NOW: i64 = 1_718_000_000_000;

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(NOW))
}

/// Shared script and call log of every page the factory opens
#[derive(Debug, Default)]
pub struct BrowserScript {
    texts: Mutex<HashMap<String, String>>,
    failing_urls: Mutex<Vec<String>>,
    startup_error: Mutex<Option<String>>,
    panic_on_query: AtomicBool,
    hang_on_query: AtomicBool,
    pub navigations: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<String>>,
    pub opens: AtomicUsize,
    pub quits: AtomicUsize,
}

impl BrowserScript {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Element text returned for `locator`
    pub fn set_text(&self, locator: impl Into<String>, text: impl Into<String>) {
        self.texts.lock().unwrap().insert(locator.into(), text.into());
    }

    /// Navigations to any url containing `fragment` fail
    pub fn fail_urls_containing(&self, fragment: impl Into<String>) {
        self.failing_urls.lock().unwrap().push(fragment.into());
    }

    pub fn fail_startup(&self, reason: impl Into<String>) {
        *self.startup_error.lock().unwrap() = Some(reason.into());
    }

    /// Every element query panics
    pub fn panic_on_query(&self) {
        self.panic_on_query.store(true, Ordering::SeqCst);
    }

    /// Every element query waits forever
    pub fn hang_on_query(&self) {
        self.hang_on_query.store(true, Ordering::SeqCst);
    }

    /// Yields until the browser has been quit `expected` times or gives up
    pub async fn wait_for_quits(&self, expected: usize) -> usize {
        for _ in 0..100 {
            if self.quits() >= expected {
                break;
            }
            tokio::task::yield_now().await;
        }
        self.quits()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    /// Scripts the primary locator of one side
    pub fn set_primary(
        &self,
        price_type: PriceType,
        instrument: &Instrument,
        side: PriceSide,
        text: &str,
    ) {
        let profile = profile_for(Bank::Sber, price_type).unwrap();
        self.set_text(profile.primary_locator_for(instrument, side), text);
    }

    /// Scripts the fallback locator of one side
    pub fn set_fallback(
        &self,
        price_type: PriceType,
        instrument: &Instrument,
        side: PriceSide,
        text: &str,
    ) {
        let profile = profile_for(Bank::Sber, price_type).unwrap();
        self.set_text(profile.fallback_locator_for(instrument, side), text);
    }

    /// Scripts both sides of every Sber instrument of `price_type`
    pub fn price_everything(&self, price_type: PriceType, buy: &str, sell: &str) {
        for instrument in instruments_for_type(Bank::Sber, price_type) {
            self.set_primary(price_type, instrument, PriceSide::Buy, buy);
            self.set_primary(price_type, instrument, PriceSide::Sell, sell);
        }
    }
}

pub struct ScriptedPage {
    script: Arc<BrowserScript>,
}

#[async_trait]
impl PageDriver for ScriptedPage {
    async fn goto(&self, url: &str) -> Result<(), AppError> {
        self.script.navigations.lock().unwrap().push(url.to_string());
        let failing = self
            .script
            .failing_urls
            .lock()
            .unwrap()
            .iter()
            .any(|fragment| url.contains(fragment.as_str()));
        if failing {
            return Err(AppError::WebDriver("net::ERR_CONNECTION_RESET".to_string()));
        }
        Ok(())
    }

    async fn find_text(&self, locator: &str, _timeout: Duration) -> Result<Located, AppError> {
        self.script.queries.lock().unwrap().push(locator.to_string());
        if self.script.panic_on_query.load(Ordering::SeqCst) {
            panic!("renderer crashed while querying {locator}");
        }
        if self.script.hang_on_query.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(match self.script.texts.lock().unwrap().get(locator) {
            Some(text) => Located::Found(text.clone()),
            None => Located::NotFound,
        })
    }

    async fn quit(&self) -> Result<(), AppError> {
        self.script.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct ScriptedFactory {
    pub script: Arc<BrowserScript>,
}

impl ScriptedFactory {
    pub fn shared(script: &Arc<BrowserScript>) -> Arc<dyn DriverFactory> {
        Arc::new(Self {
            script: Arc::clone(script),
        })
    }
}

#[async_trait]
impl DriverFactory for ScriptedFactory {
    async fn open(&self, _config: &BrowserConfig) -> Result<Box<dyn PageDriver>, AppError> {
        self.script.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.script.startup_error.lock().unwrap().clone() {
            return Err(AppError::SessionStartup(reason));
        }
        Ok(Box::new(ScriptedPage {
            script: Arc::clone(&self.script),
        }))
    }
}

/// Price history kept in memory
#[derive(Debug, Default)]
pub struct InMemoryPriceRepository {
    rows: Mutex<Vec<(PriceType, PersistedPriceRecord)>>,
    next_id: AtomicI64,
    failing_saves: Mutex<HashSet<String>>,
    failing_lookups: Mutex<HashSet<String>>,
}

impl InMemoryPriceRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, price_type: PriceType, name: &str, buy: Decimal, sell: Decimal, ts: i64) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows.lock().unwrap().push((
            price_type,
            PersistedPriceRecord {
                id,
                name: name.to_string(),
                buy_price: buy,
                sell_price: sell,
                timestamp_millis: ts,
                bank: Bank::Sber.code().to_string(),
            },
        ));
        id
    }

    pub fn fail_save_of(&self, name: &str) {
        self.failing_saves.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_lookup_of(&self, name: &str) {
        self.failing_lookups.lock().unwrap().insert(name.to_string());
    }

    pub fn rows(&self, price_type: PriceType, name: &str) -> Vec<PersistedPriceRecord> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(pt, row)| *pt == price_type && row.name == name)
            .map(|(_, row)| row.clone())
            .collect()
    }

    pub fn count(&self, price_type: PriceType) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(pt, _)| *pt == price_type)
            .count()
    }
}

#[async_trait]
impl PriceRepository for InMemoryPriceRepository {
    async fn find_latest_by_name(
        &self,
        price_type: PriceType,
        name: &str,
    ) -> AppResult<Option<PersistedPriceRecord>> {
        if self.failing_lookups.lock().unwrap().contains(name) {
            return Err(AppError::Persistence("connection refused".to_string()));
        }
        Ok(self
            .rows(price_type, name)
            .into_iter()
            .max_by_key(|row| (row.timestamp_millis, row.id)))
    }

    async fn save(
        &self,
        price_type: PriceType,
        record: &NewPriceRecord,
    ) -> AppResult<PersistedPriceRecord> {
        if self.failing_saves.lock().unwrap().contains(&record.name) {
            return Err(AppError::Persistence("disk full".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = PersistedPriceRecord {
            id,
            name: record.name.clone(),
            buy_price: record.buy_price,
            sell_price: record.sell_price,
            timestamp_millis: record.timestamp_millis,
            bank: record.bank.clone(),
        };
        self.rows.lock().unwrap().push((price_type, row.clone()));
        Ok(row)
    }

    async fn find_latest_per_name(
        &self,
        price_type: PriceType,
    ) -> AppResult<Vec<PersistedPriceRecord>> {
        let mut latest: HashMap<String, PersistedPriceRecord> = HashMap::new();
        for (pt, row) in self.rows.lock().unwrap().iter() {
            if *pt != price_type {
                continue;
            }
            let newer = latest
                .get(&row.name)
                .is_none_or(|kept| (row.timestamp_millis, row.id) > (kept.timestamp_millis, kept.id));
            if newer {
                latest.insert(row.name.clone(), row.clone());
            }
        }
        let mut rows: Vec<_> = latest.into_values().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_history(
        &self,
        price_type: PriceType,
        name: &str,
        from_millis: i64,
        to_millis: i64,
    ) -> AppResult<Vec<PersistedPriceRecord>> {
        let mut rows: Vec<_> = self
            .rows(price_type, name)
            .into_iter()
            .filter(|row| row.timestamp_millis >= from_millis && row.timestamp_millis < to_millis)
            .collect();
        rows.sort_by_key(|row| (row.timestamp_millis, row.id));
        Ok(rows)
    }
}

/// Behaviour of a [`FakeScraper`] call
#[derive(Debug, Clone)]
pub enum FakeResult {
    Prices(Vec<(&'static str, Decimal, Decimal)>),
    StartupFailure,
    Panic,
}

/// Scraper returning canned results, optionally after a delay
pub struct FakeScraper {
    pub price_type: PriceType,
    pub result: FakeResult,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl FakeScraper {
    pub fn new(price_type: PriceType, result: FakeResult) -> Arc<Self> {
        Arc::new(Self {
            price_type,
            result,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(price_type: PriceType, result: FakeResult, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            price_type,
            result,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scraper for FakeScraper {
    fn price_type(&self) -> PriceType {
        self.price_type
    }

    async fn scrape(&self) -> AppResult<ScrapeOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.result {
            FakeResult::Prices(prices) => {
                let observations = prices
                    .iter()
                    .map(|(code, buy, sell)| {
                        let observation =
                            PriceObservation::new(Bank::Sber, *code, *code, *buy, *sell, NOW)
                                .unwrap();
                        (code.to_string(), observation)
                    })
                    .collect();
                Ok(ScrapeOutcome {
                    observations,
                    batches: 1,
                    ..ScrapeOutcome::default()
                })
            }
            FakeResult::StartupFailure => {
                Err(AppError::SessionStartup("chromedriver not found".to_string()))
            }
            FakeResult::Panic => panic!("scraper blew up"),
        }
    }
}
