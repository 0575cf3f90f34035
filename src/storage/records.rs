use crate::error::{AppError, AppResult};
use crate::presentation::instrument::{Bank, PriceType, find_by_code};
use crate::presentation::price::PriceObservation;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a price history table
///
/// Rows are append-only: each one marks a change of price, not a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersistedPriceRecord {
    /// Surrogate key
    pub id: i64,
    /// Instrument code
    pub name: String,
    /// Buy side price
    pub buy_price: Decimal,
    /// Sell side price
    pub sell_price: Decimal,
    /// Capture time of the observation that produced the row
    pub timestamp_millis: i64,
    /// Bank code
    pub bank: String,
}

impl PersistedPriceRecord {
    /// Converts the row back into the wire shape
    ///
    /// The display name comes from the catalog when the code is known and
    /// falls back to the stored name otherwise.
    ///
    /// # Errors
    /// [`AppError::InvalidInput`] when the stored bank is unknown or the row
    /// does not form a valid observation.
    pub fn to_observation(&self, price_type: PriceType) -> AppResult<PriceObservation> {
        let bank = Bank::from_code(&self.bank)
            .or_else(|| Bank::from_display_name(&self.bank))
            .ok_or_else(|| AppError::InvalidInput(format!("unknown bank '{}'", self.bank)))?;

        let display_name = find_by_code(price_type, &self.name)
            .map(|instrument| instrument.display_name.to_string())
            .unwrap_or_else(|| self.name.clone());

        PriceObservation::new(
            bank,
            self.name.clone(),
            display_name,
            self.buy_price,
            self.sell_price,
            self.timestamp_millis,
        )
    }
}

/// A row about to be inserted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPriceRecord {
    /// Instrument code
    pub name: String,
    /// Buy side price
    pub buy_price: Decimal,
    /// Sell side price
    pub sell_price: Decimal,
    /// Capture time
    pub timestamp_millis: i64,
    /// Bank code
    pub bank: String,
}

impl From<&PriceObservation> for NewPriceRecord {
    fn from(observation: &PriceObservation) -> Self {
        Self {
            name: observation.code.clone(),
            buy_price: observation.buy_price,
            sell_price: observation.sell_price,
            timestamp_millis: observation.captured_at_millis,
            bank: observation.bank.code().to_string(),
        }
    }
}

impl NewPriceRecord {
    /// Whether both prices are numerically equal to those of `latest`
    ///
    /// Comparison is by value, so `90.00` equals `90.0000`.
    #[must_use]
    pub fn same_prices(&self, latest: &PersistedPriceRecord) -> bool {
        self.buy_price == latest.buy_price && self.sell_price == latest.sell_price
    }
}

/// Storage of price history, one table per price type
#[async_trait]
pub trait PriceRepository: Send + Sync {
    /// Most recent record of `name`, by timestamp
    async fn find_latest_by_name(
        &self,
        price_type: PriceType,
        name: &str,
    ) -> AppResult<Option<PersistedPriceRecord>>;

    /// Appends a record and returns it with its id
    async fn save(
        &self,
        price_type: PriceType,
        record: &NewPriceRecord,
    ) -> AppResult<PersistedPriceRecord>;

    /// Most recent record of every instrument, ordered by name
    async fn find_latest_per_name(&self, price_type: PriceType)
    -> AppResult<Vec<PersistedPriceRecord>>;

    /// Records of `name` with `from_millis <= timestamp < to_millis`, oldest first
    async fn find_history(
        &self,
        price_type: PriceType,
        name: &str,
        from_millis: i64,
        to_millis: i64,
    ) -> AppResult<Vec<PersistedPriceRecord>>;
}
