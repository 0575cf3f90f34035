use crate::presentation::instrument::PriceType;
use crate::presentation::price::PriceObservation;
use crate::storage::change_detection::StorageStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one price type within a scheduled cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Price type scraped in this stage
    pub price_type: PriceType,
    /// Number of instruments priced by the scrape
    pub observed: usize,
    /// Persistence counters, `None` when the scrape itself failed
    pub stats: Option<StorageStats>,
    /// Error that aborted the stage, if any
    pub error: Option<String>,
}

impl StageReport {
    /// Stage that scraped and persisted
    #[must_use]
    pub fn completed(price_type: PriceType, observed: usize, stats: StorageStats) -> Self {
        Self {
            price_type,
            observed,
            stats: Some(stats),
            error: None,
        }
    }

    /// Stage that could not scrape at all
    #[must_use]
    pub fn failed(price_type: PriceType, error: impl Into<String>) -> Self {
        Self {
            price_type,
            observed: 0,
            stats: None,
            error: Some(error.into()),
        }
    }

    /// Whether the stage finished without a fatal error
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one scheduled cycle
///
/// Returned to the caller instead of being recorded in shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier attached to every log line of the cycle
    pub run_id: String,
    /// Cycle start, milliseconds since the Unix epoch
    pub started_at_millis: i64,
    /// Cycle end, milliseconds since the Unix epoch
    pub finished_at_millis: i64,
    /// One entry per price type, in scrape order
    pub stages: Vec<StageReport>,
}

impl RunReport {
    /// Stage report for a price type
    #[must_use]
    pub fn stage(&self, price_type: PriceType) -> Option<&StageReport> {
        self.stages.iter().find(|stage| stage.price_type == price_type)
    }

    /// Total number of records written across all stages
    #[must_use]
    pub fn total_inserted(&self) -> usize {
        self.stages
            .iter()
            .filter_map(|stage| stage.stats.as_ref())
            .map(|stats| stats.inserted)
            .sum()
    }

    /// Whether every stage finished without a fatal error
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.stages.iter().all(StageReport::is_success)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use prettytable::format;
        use prettytable::{Cell, Row, Table};

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.add_row(Row::new(vec![
            Cell::new("TYPE"),
            Cell::new("OBSERVED"),
            Cell::new("INSERTED"),
            Cell::new("UNCHANGED"),
            Cell::new("FAILED"),
            Cell::new("ERROR"),
        ]));

        for stage in &self.stages {
            let (inserted, unchanged, failed) = stage
                .stats
                .as_ref()
                .map(|s| {
                    (
                        s.inserted.to_string(),
                        s.unchanged.to_string(),
                        s.failed.to_string(),
                    )
                })
                .unwrap_or_else(|| ("-".to_string(), "-".to_string(), "-".to_string()));

            table.add_row(Row::new(vec![
                Cell::new(stage.price_type.value()),
                Cell::new(&stage.observed.to_string()),
                Cell::new(&inserted),
                Cell::new(&unchanged),
                Cell::new(&failed),
                Cell::new(stage.error.as_deref().unwrap_or("-")),
            ]));
        }

        writeln!(
            f,
            "run {} ({} ms)",
            self.run_id,
            self.finished_at_millis - self.started_at_millis
        )?;
        write!(f, "{table}")
    }
}

/// Renders observations as a table sorted by instrument code
#[must_use]
pub fn observations_table(observations: &[PriceObservation]) -> String {
    use prettytable::format;
    use prettytable::{Cell, Row, Table};

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.add_row(Row::new(vec![
        Cell::new("CODE"),
        Cell::new("NAME"),
        Cell::new("BUY"),
        Cell::new("SELL"),
        Cell::new("BANK"),
    ]));

    let mut sorted: Vec<&PriceObservation> = observations.iter().collect();
    sorted.sort_by(|a, b| a.code.cmp(&b.code));

    for observation in sorted {
        table.add_row(Row::new(vec![
            Cell::new(&observation.code),
            Cell::new(&observation.name),
            Cell::new(&observation.buy_price.to_string()),
            Cell::new(&observation.sell_price.to_string()),
            Cell::new(observation.bank.code()),
        ]));
    }

    table.to_string()
}
