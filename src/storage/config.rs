use pretty_simple_display::DisplaySimple;
use serde::{Deserialize, Serialize};

/// Connection settings of the price history database
#[derive(Debug, DisplaySimple, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Pool size; the agent writes sequentially so a handful is plenty
    pub max_connections: u32,
}
