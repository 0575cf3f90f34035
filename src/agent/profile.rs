use crate::constants::BATCH_SIZE;
use crate::error::{AppError, AppResult};
use crate::presentation::instrument::{Bank, Instrument, PriceType};
use crate::presentation::price::PriceSide;

/// Placeholder for one positional URL slot
const URL_SLOT: &str = "{}";

/// Where and how a bank publishes one price type
///
/// Locator templates are XPath expressions with three named placeholders:
/// `{display_name}`, `{code}` and `{index}` (the column of the requested side).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankProfile {
    /// Bank publishing the quotes
    pub bank: Bank,
    /// Price type served by the page
    pub price_type: PriceType,
    /// Page URL with either zero or [`BATCH_SIZE`] positional `{}` slots
    pub url_template: &'static str,
    /// Tight locator, tried first
    pub primary_locator: &'static str,
    /// Looser class based locator, tried once when the primary one times out.
    /// It may match a neighbouring element if the page layout drifts.
    pub fallback_locator: &'static str,
    /// Column holding the buy price
    pub buy_index: u32,
    /// Column holding the sell price
    pub sell_index: u32,
}

static SBER_CURRENCY: BankProfile = BankProfile {
    bank: Bank::Sber,
    price_type: PriceType::Currency,
    url_template: "https://www.sberbank.ru/ru/quotes/currencies?tab=sbol\
        &currency={}&currency={}&currency={}&currency={}&currency={}&package=ERNP-2",
    primary_locator: "//div[starts-with(@class, 'TabContainer') and not(contains(substring-after(@class, 'TabContainer'), ' '))]\
        //div[contains(@class, 'rates-form-new-table-row')][contains(., '{display_name}') or contains(., '{code}')]\
        //div[contains(@class, 'rates-form-new-table-row__col-wrap')]//div[{index}]\
        //div[contains(@class, 'dk-sbol-text') and contains(text(), '₽')]",
    fallback_locator: "//div[contains(@class, 'rates-form-new-table-row')][contains(., '{code}')]\
        //div[contains(@class, 'rates-form-new-table-row__col')][{index}]",
    buy_index: 1,
    sell_index: 2,
};

static SBER_METAL: BankProfile = BankProfile {
    bank: Bank::Sber,
    price_type: PriceType::Metal,
    url_template: "https://www.sberbank.ru/retail/ru/quotes/metalbeznal?tab=online",
    primary_locator: "//div[contains(@class, 'rfn-table-currency__iso') and text()='{display_name}']\
        /ancestor::div[contains(@class, 'rfn-table-row')]\
        //div[contains(@class, 'rfn-table-row__price_main')]\
        //div[contains(@class, 'rfn-table-row__col')][{index}]",
    fallback_locator: "//div[contains(@class, 'rfn-table-row')][contains(., '{code}') or contains(., '{display_name}')]\
        //div[contains(@class, 'rfn-table-row__col')][{index}]",
    buy_index: 3,
    sell_index: 2,
};

/// Profile of `bank` for `price_type`, if the bank publishes that price type
#[must_use]
pub fn profile_for(bank: Bank, price_type: PriceType) -> Option<&'static BankProfile> {
    match (bank, price_type) {
        (Bank::Sber, PriceType::Currency) => Some(&SBER_CURRENCY),
        (Bank::Sber, PriceType::Metal) => Some(&SBER_METAL),
    }
}

impl BankProfile {
    /// Column of the requested side
    #[must_use]
    pub fn index(&self, side: PriceSide) -> u32 {
        match side {
            PriceSide::Buy => self.buy_index,
            PriceSide::Sell => self.sell_index,
        }
    }

    /// Number of positional slots in the URL template
    #[must_use]
    pub fn url_slots(&self) -> usize {
        self.url_template.matches(URL_SLOT).count()
    }

    /// Checks that the templates can be filled
    ///
    /// # Errors
    /// [`AppError::Config`] when the URL template has a slot count other than
    /// zero or the batch size, or a column index is zero.
    pub fn validate(&self) -> AppResult<()> {
        let slots = self.url_slots();
        if slots != 0 && slots != BATCH_SIZE {
            return Err(AppError::Config(format!(
                "{} {} url template has {slots} slots, expected 0 or {BATCH_SIZE}",
                self.bank, self.price_type
            )));
        }
        if self.buy_index == 0 || self.sell_index == 0 {
            return Err(AppError::Config(format!(
                "{} {} column indices are 1-based",
                self.bank, self.price_type
            )));
        }
        Ok(())
    }

    /// Substitutes `codes` into the URL template, in slot order
    ///
    /// A template without slots is a fixed page and is returned unchanged.
    ///
    /// # Errors
    /// [`AppError::InvalidInput`] when the number of codes differs from the
    /// number of slots.
    pub fn build_url(&self, codes: &[&str]) -> AppResult<String> {
        let slots = self.url_slots();
        if slots == 0 {
            return Ok(self.url_template.to_string());
        }
        if codes.len() != slots {
            return Err(AppError::InvalidInput(format!(
                "url template expects {slots} codes, got {}",
                codes.len()
            )));
        }
        let url = codes
            .iter()
            .fold(self.url_template.to_string(), |url, code| {
                url.replacen(URL_SLOT, code, 1)
            });
        Ok(url)
    }

    /// Primary locator for one side of an instrument
    #[must_use]
    pub fn primary_locator_for(&self, instrument: &Instrument, side: PriceSide) -> String {
        fill_locator(self.primary_locator, instrument, self.index(side))
    }

    /// Fallback locator for one side of an instrument
    #[must_use]
    pub fn fallback_locator_for(&self, instrument: &Instrument, side: PriceSide) -> String {
        fill_locator(self.fallback_locator, instrument, self.index(side))
    }
}

fn fill_locator(template: &str, instrument: &Instrument, index: u32) -> String {
    template
        .replace("{display_name}", instrument.display_name)
        .replace("{code}", instrument.code)
        .replace("{index}", &index.to_string())
}
