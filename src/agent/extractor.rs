use crate::agent::profile::BankProfile;
use crate::browser::interface::Located;
use crate::browser::session::BrowserSession;
use crate::error::{AppError, AppResult};
use crate::presentation::instrument::Instrument;
use crate::presentation::price::PriceSide;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

/// Everything that is not an ASCII digit or a separator
static PRICE_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9,.]").expect("price noise pattern is valid"));

/// Which locator produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    /// The bank profile's tight locator
    Primary,
    /// The looser class based locator
    Fallback,
}

/// Strips currency signs, spaces and other noise from a price text and
/// normalizes the decimal separator to a period
///
/// Returns `None` when nothing numeric is left.
#[must_use]
pub fn clean_price_text(raw: &str) -> Option<String> {
    let cleaned = PRICE_NOISE.replace_all(raw, "").replace(',', ".");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Parses a price text into an exact decimal, reporting why it is not one
///
/// # Errors
/// [`AppError::ElementParse`] when nothing numeric is left after cleaning and
/// [`AppError::Decimal`] when the cleaned text is not a single decimal number.
pub fn try_parse_price(raw: &str) -> AppResult<Decimal> {
    let cleaned = clean_price_text(raw)
        .ok_or_else(|| AppError::ElementParse(format!("no digits in '{raw}'")))?;
    Ok(Decimal::from_str(&cleaned)?)
}

/// Parses a price text into an exact decimal
///
/// `"90,50 ₽"` becomes `90.50`; blank text, dashes and anything that is not
/// a single decimal number yield `None`.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    match try_parse_price(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Cannot parse price '{}': {}", raw, e);
            None
        }
    }
}

/// Reads one price side of one instrument from the loaded page
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor<'a> {
    profile: &'a BankProfile,
}

impl<'a> FieldExtractor<'a> {
    /// Creates an extractor for the pages described by `profile`
    #[must_use]
    pub fn new(profile: &'a BankProfile) -> Self {
        Self { profile }
    }

    /// Queries one locator with the page wait bound
    ///
    /// Driver failures are reported as `NotFound`: a broken query must not
    /// abort the rest of the batch.
    pub async fn try_locate(&self, session: &BrowserSession, locator: &str) -> Located {
        match session.query(locator, session.page_wait()).await {
            Ok(located) => located,
            Err(e) => {
                warn!("Query failed, treating as not found: {}", e);
                Located::NotFound
            }
        }
    }

    /// Locates and parses one price, with the locator that produced it
    ///
    /// # Errors
    /// [`AppError::ElementNotFound`] when neither locator matched and
    /// [`AppError::ElementParse`] when the matched text is not a price.
    pub async fn extract_with_source(
        &self,
        session: &BrowserSession,
        instrument: &Instrument,
        side: PriceSide,
    ) -> AppResult<(Decimal, LocatorKind)> {
        let primary = self.profile.primary_locator_for(instrument, side);
        let (text, kind) = match self.try_locate(session, &primary).await {
            Located::Found(text) => (text, LocatorKind::Primary),
            Located::NotFound => {
                debug!(
                    "Primary locator timed out for {} {}, trying fallback",
                    instrument.code, side
                );
                let fallback = self.profile.fallback_locator_for(instrument, side);
                match self.try_locate(session, &fallback).await {
                    Located::Found(text) => (text, LocatorKind::Fallback),
                    Located::NotFound => {
                        return Err(AppError::ElementNotFound(format!(
                            "{} {}",
                            instrument.code, side
                        )));
                    }
                }
            }
        };

        let value = try_parse_price(&text).map_err(|e| {
            AppError::ElementParse(format!(
                "{} {} text '{}' ({:?}): {}",
                instrument.code, side, text, kind, e
            ))
        })?;
        debug!("{} {} = {} ({:?})", instrument.code, side, value, kind);
        Ok((value, kind))
    }

    /// Locates and parses one price; `None` means the side is absent
    pub async fn extract(
        &self,
        session: &BrowserSession,
        instrument: &Instrument,
        side: PriceSide,
    ) -> Option<Decimal> {
        match self.extract_with_source(session, instrument, side).await {
            Ok((value, _)) => Some(value),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}
