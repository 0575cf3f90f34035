use crate::error::{AppError, AppResult};
use crate::presentation::instrument::PriceType;
use crate::presentation::price::PriceObservation;
use crate::storage::records::{NewPriceRecord, PriceRepository};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counters of one persistence pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    /// New records written
    pub inserted: usize,
    /// Observations equal to the latest record
    pub unchanged: usize,
    /// Observations whose lookup or save failed
    pub failed: usize,
    /// Observations looked at
    pub total_processed: usize,
}

impl StorageStats {
    /// Observations that did not produce a record, unchanged and failed alike
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.unchanged + self.failed
    }
}

/// What happened to a single observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Inserted,
    Unchanged,
}

/// Appends observations to the price history when they carry new information
#[derive(Clone)]
pub struct PriceService {
    repository: Arc<dyn PriceRepository>,
}

impl PriceService {
    /// Creates a service writing through `repository`
    pub fn new(repository: Arc<dyn PriceRepository>) -> Self {
        Self { repository }
    }

    /// The underlying repository, for reads
    pub fn repository(&self) -> &Arc<dyn PriceRepository> {
        &self.repository
    }

    /// Writes each observation whose buy or sell price differs from the
    /// latest record of the same instrument
    ///
    /// Prices are rounded to the table's scale before comparing, so a value
    /// with more decimals than the column keeps is compared as stored.
    ///
    /// Instruments are handled independently and in code order: a failed
    /// lookup or save is logged, counted and does not affect the others.
    pub async fn upsert_if_changed(
        &self,
        price_type: PriceType,
        observations: &HashMap<String, PriceObservation>,
    ) -> StorageStats {
        let mut stats = StorageStats::default();
        let mut names: Vec<&String> = observations.keys().collect();
        names.sort();

        for name in names {
            let observation = &observations[name];
            stats.total_processed += 1;

            match self.upsert_one(price_type, name, observation).await {
                Ok(Outcome::Inserted) => stats.inserted += 1,
                Ok(Outcome::Unchanged) => stats.unchanged += 1,
                Err(e) => {
                    warn!("Skipping {} {}: {}", price_type, name, e);
                    stats.failed += 1;
                }
            }
        }

        info!(
            "{} prices: {} inserted, {} unchanged, {} failed",
            price_type, stats.inserted, stats.unchanged, stats.failed
        );
        stats
    }

    async fn upsert_one(
        &self,
        price_type: PriceType,
        name: &str,
        observation: &PriceObservation,
    ) -> AppResult<Outcome> {
        let latest = self
            .repository
            .find_latest_by_name(price_type, name)
            .await
            .map_err(|e| AppError::Persistence(format!("lookup of {name} failed: {e}")))?;

        let mut record = NewPriceRecord::from(observation);
        record.name = name.to_string();
        record.buy_price = price_type.to_stored_scale(record.buy_price);
        record.sell_price = price_type.to_stored_scale(record.sell_price);

        if let Some(latest) = latest
            && record.same_prices(&latest)
        {
            debug!("{} {} unchanged at {}/{}", price_type, name, latest.buy_price, latest.sell_price);
            return Ok(Outcome::Unchanged);
        }

        self.repository
            .save(price_type, &record)
            .await
            .map_err(|e| AppError::Persistence(format!("save of {name} failed: {e}")))?;
        debug!(
            "{} {} saved {}/{}",
            price_type, name, record.buy_price, record.sell_price
        );
        Ok(Outcome::Inserted)
    }
}

impl std::fmt::Debug for PriceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceService").finish_non_exhaustive()
    }
}
