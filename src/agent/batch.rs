use crate::constants::PLACEHOLDER_TOKEN;
use crate::presentation::instrument::Instrument;

/// One position of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    /// A real instrument
    Filled(&'a Instrument),
    /// Padding in the last, partial batch
    Placeholder,
}

impl<'a> Slot<'a> {
    /// Token substituted into the page URL for this slot
    #[must_use]
    pub fn code(&self) -> &'a str {
        match self {
            Slot::Filled(instrument) => instrument.code,
            Slot::Placeholder => PLACEHOLDER_TOKEN,
        }
    }
}

/// A page worth of instruments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<'a> {
    /// Zero-based position of the batch within the run
    pub index: usize,
    /// Exactly `batch_size` slots
    pub slots: Vec<Slot<'a>>,
}

impl<'a> Batch<'a> {
    /// URL tokens in slot order, placeholders included
    #[must_use]
    pub fn codes(&self) -> Vec<&'a str> {
        self.slots.iter().map(Slot::code).collect()
    }

    /// Real instruments in slot order
    pub fn instruments(&self) -> impl Iterator<Item = &'a Instrument> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Filled(instrument) => Some(*instrument),
            Slot::Placeholder => None,
        })
    }

    /// Number of padding slots
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Placeholder))
            .count()
    }
}

/// `ceil(instrument_count / batch_size)`
#[must_use]
pub fn batch_count(instrument_count: usize, batch_size: usize) -> usize {
    instrument_count.div_ceil(batch_size.max(1))
}

/// Splits `instruments` into consecutive batches of `batch_size`
///
/// Order is preserved and the last batch is padded with placeholders so every
/// batch has exactly `batch_size` slots.
#[must_use]
pub fn plan_batches<'a>(instruments: &[&'a Instrument], batch_size: usize) -> Vec<Batch<'a>> {
    let batch_size = batch_size.max(1);
    instruments
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| {
            let mut slots: Vec<Slot<'a>> = chunk.iter().map(|i| Slot::Filled(*i)).collect();
            slots.resize(batch_size, Slot::Placeholder);
            Batch { index, slots }
        })
        .collect()
}
