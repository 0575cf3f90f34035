use crate::error::{AppError, AppResult};
use crate::presentation::instrument::{Bank, Instrument};
use pretty_simple_display::DisplaySimple;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Side of a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSide {
    /// Price at which the bank buys from the customer
    Buy,
    /// Price at which the bank sells to the customer
    Sell,
}

impl PriceSide {
    /// Lowercase value
    #[must_use]
    pub fn value(&self) -> &'static str {
        match self {
            PriceSide::Buy => "buy",
            PriceSide::Sell => "sell",
        }
    }
}

impl fmt::Display for PriceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// One buy/sell reading of an instrument taken during a scrape
///
/// Serializes to the wire shape
/// `{"bank", "name", "buyPrice", "sellPrice", "timestamp"}` with prices as
/// decimal strings. The instrument code is kept for keying and persistence
/// but is not part of the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, DisplaySimple)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    /// Bank that published the quote
    pub bank: Bank,
    /// Instrument code (`USD`, `GOLD`, ...)
    #[serde(skip_serializing, default)]
    pub code: String,
    /// Instrument name as printed on the bank's page
    pub name: String,
    /// Buy side price
    pub buy_price: Decimal,
    /// Sell side price
    pub sell_price: Decimal,
    /// Capture time, milliseconds since the Unix epoch
    #[serde(rename = "timestamp")]
    pub captured_at_millis: i64,
}

impl PriceObservation {
    /// Creates a validated observation
    ///
    /// # Errors
    /// [`AppError::InvalidInput`] when the name is blank, a price is negative
    /// or the timestamp is not positive.
    pub fn new(
        bank: Bank,
        code: impl Into<String>,
        name: impl Into<String>,
        buy_price: Decimal,
        sell_price: Decimal,
        captured_at_millis: i64,
    ) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput("name cannot be empty".to_string()));
        }
        if buy_price.is_sign_negative() && !buy_price.is_zero() {
            return Err(AppError::InvalidInput(format!(
                "buy price must be non-negative, got {buy_price}"
            )));
        }
        if sell_price.is_sign_negative() && !sell_price.is_zero() {
            return Err(AppError::InvalidInput(format!(
                "sell price must be non-negative, got {sell_price}"
            )));
        }
        if captured_at_millis <= 0 {
            return Err(AppError::InvalidInput(format!(
                "timestamp must be positive, got {captured_at_millis}"
            )));
        }
        Ok(Self {
            bank,
            code: code.into(),
            name,
            buy_price,
            sell_price,
            captured_at_millis,
        })
    }
}

/// Combines both sides of an instrument into an observation
///
/// Returns `None` when either side is absent or the values do not form a
/// valid observation; such instruments are left out of the scrape result
/// entirely.
#[must_use]
pub fn assemble(
    bank: Bank,
    instrument: &Instrument,
    buy: Option<Decimal>,
    sell: Option<Decimal>,
    now_millis: i64,
) -> Option<PriceObservation> {
    let (Some(buy), Some(sell)) = (buy, sell) else {
        warn!(
            "Omitting {}: buy present = {}, sell present = {}",
            instrument.code,
            buy.is_some(),
            sell.is_some()
        );
        return None;
    };

    match PriceObservation::new(
        bank,
        instrument.code,
        instrument.display_name,
        buy,
        sell,
        now_millis,
    ) {
        Ok(observation) => Some(observation),
        Err(e) => {
            warn!("Omitting {}: {}", instrument.code, e);
            None
        }
    }
}
