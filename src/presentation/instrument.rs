use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Banks whose quote pages can be scraped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    /// Sberbank
    #[serde(rename = "SBER")]
    Sber,
}

impl Bank {
    /// Every known bank
    pub const ALL: [Bank; 1] = [Bank::Sber];

    /// Stable identifier, used in persisted rows and on the wire
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Bank::Sber => "SBER",
        }
    }

    /// Human readable bank name
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Bank::Sber => "Сбербанк",
        }
    }

    /// Looks a bank up by its code, ignoring case
    pub fn from_code(code: &str) -> Option<Bank> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|bank| bank.code().eq_ignore_ascii_case(code))
    }

    /// Looks a bank up by its human readable name
    pub fn from_display_name(name: &str) -> Option<Bank> {
        Self::ALL
            .into_iter()
            .find(|bank| bank.display_name() == name)
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Kind of quote, which is also the kind of instrument it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriceType {
    /// Foreign currency exchange rates
    Currency,
    /// Precious metal prices
    Metal,
}

impl PriceType {
    /// Both price types, in the order the scheduler scrapes them
    pub const SCRAPE_ORDER: [PriceType; 2] = [PriceType::Metal, PriceType::Currency];

    /// Lowercase value used in configuration and routes
    #[must_use]
    pub fn value(&self) -> &'static str {
        match self {
            PriceType::Currency => "currency",
            PriceType::Metal => "metal",
        }
    }

    /// Parses the lowercase value
    pub fn from_value(value: &str) -> Option<PriceType> {
        match value.trim().to_ascii_lowercase().as_str() {
            "currency" => Some(PriceType::Currency),
            "metal" => Some(PriceType::Metal),
            _ => None,
        }
    }

    /// Table holding the persisted history for this price type
    #[must_use]
    pub fn table_name(&self) -> &'static str {
        match self {
            PriceType::Currency => "currency_prices",
            PriceType::Metal => "metal_prices",
        }
    }

    /// Decimal places kept by the price columns of the history table
    #[must_use]
    pub fn numeric_scale(&self) -> u32 {
        match self {
            PriceType::Currency => 4,
            PriceType::Metal => 2,
        }
    }

    /// Rounds `price` the way the history table stores it
    ///
    /// PostgreSQL rounds half away from zero when a value is cast to
    /// `NUMERIC(p, s)`.
    #[must_use]
    pub fn to_stored_scale(&self, price: Decimal) -> Decimal {
        price.round_dp_with_strategy(self.numeric_scale(), RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// A scrapeable currency or metal
///
/// Instruments are static data. Their order inside the catalog is significant:
/// quote page URLs encode up to five codes positionally, so a batch is always
/// built from a contiguous run of the catalog in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instrument {
    /// Code unique within its price type (`USD`, `GOLD`, ...)
    pub code: &'static str,
    /// Name as printed on the bank's page
    pub display_name: &'static str,
    /// Currency or metal
    pub price_type: PriceType,
    /// Banks that publish a quote for this instrument
    pub banks: &'static [Bank],
}

impl Instrument {
    /// Whether `bank` publishes a quote for this instrument
    #[must_use]
    pub fn is_supported_by(&self, bank: Bank) -> bool {
        self.banks.contains(&bank)
    }
}

const SBER_ONLY: &[Bank] = &[Bank::Sber];
const NO_BANKS: &[Bank] = &[];

const fn currency(code: &'static str, display_name: &'static str, banks: &'static [Bank]) -> Instrument {
    Instrument {
        code,
        display_name,
        price_type: PriceType::Currency,
        banks,
    }
}

const fn metal(code: &'static str, display_name: &'static str, banks: &'static [Bank]) -> Instrument {
    Instrument {
        code,
        display_name,
        price_type: PriceType::Metal,
        banks,
    }
}

static CURRENCIES: [Instrument; 21] = [
    currency("USD", "Доллар США", SBER_ONLY),
    currency("EUR", "Евро", SBER_ONLY),
    currency("JPY", "Японская иена", SBER_ONLY),
    currency("CNY", "Китайский юань", SBER_ONLY),
    currency("AED", "Дирхам ОАЭ", SBER_ONLY),
    currency("BYN", "Белорусский рубль", SBER_ONLY),
    currency("KZT", "Казахстанский тенге", SBER_ONLY),
    currency("GBP", "Фунт стерлингов Соединенного Королевства", SBER_ONLY),
    currency("SGD", "Сингапурский доллар", SBER_ONLY),
    currency("CHF", "Швейцарский франк", SBER_ONLY),
    currency("HKD", "Гонконгский доллар", SBER_ONLY),
    currency("CZK", "Чешская крона", SBER_ONLY),
    currency("AUD", "Австралийский доллар", SBER_ONLY),
    currency("KRW", "Вона Республики Корея", SBER_ONLY),
    currency("TRY", "Турецкая лира", NO_BANKS),
    currency("PLN", "Польский злотый", NO_BANKS),
    currency("THB", "Таиландский бат", NO_BANKS),
    currency("SEK", "Шведская крона", NO_BANKS),
    currency("NOK", "Норвежская крона", NO_BANKS),
    currency("CAD", "Канадский доллар", NO_BANKS),
    currency("DKK", "Датская крона", NO_BANKS),
];

static METALS: [Instrument; 4] = [
    metal("GOLD", "Золото", SBER_ONLY),
    metal("SILVER", "Серебро", SBER_ONLY),
    metal("PLATINUM", "Платина", SBER_ONLY),
    metal("PALLADIUM", "Палладий", SBER_ONLY),
];

/// Every instrument of a price type, in declaration order
#[must_use]
pub fn catalog(price_type: PriceType) -> &'static [Instrument] {
    match price_type {
        PriceType::Currency => &CURRENCIES,
        PriceType::Metal => &METALS,
    }
}

/// Instruments of `price_type` published by `bank`, in declaration order
#[must_use]
pub fn instruments_for_type(bank: Bank, price_type: PriceType) -> Vec<&'static Instrument> {
    catalog(price_type)
        .iter()
        .filter(|instrument| instrument.is_supported_by(bank))
        .collect()
}

/// Every instrument published by `bank`: currencies first, then metals
#[must_use]
pub fn instruments_for(bank: Bank) -> Vec<&'static Instrument> {
    [PriceType::Currency, PriceType::Metal]
        .into_iter()
        .flat_map(|price_type| instruments_for_type(bank, price_type))
        .collect()
}

/// Finds an instrument by code, ignoring case
pub fn find_by_code(price_type: PriceType, code: &str) -> Option<&'static Instrument> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    catalog(price_type)
        .iter()
        .find(|instrument| instrument.code.eq_ignore_ascii_case(code))
}

/// Finds an instrument by the name printed on the bank's page
pub fn find_by_display_name(price_type: PriceType, name: &str) -> Option<&'static Instrument> {
    if name.trim().is_empty() {
        return None;
    }
    catalog(price_type)
        .iter()
        .find(|instrument| instrument.display_name == name)
}
