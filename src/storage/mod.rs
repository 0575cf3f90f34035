/// Change detection on top of the price repository
pub mod change_detection;
/// Module containing database configuration structures
pub mod config;
/// PostgreSQL repository
pub mod postgres;
/// Persisted rows and the repository trait
pub mod records;

pub use change_detection::{PriceService, StorageStats};
pub use postgres::PgPriceRepository;
pub use records::{NewPriceRecord, PersistedPriceRecord, PriceRepository};
