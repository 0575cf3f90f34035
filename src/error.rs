use thiserror::Error;

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Errors produced by the scraping pipeline and its collaborators
///
/// Only [`AppError::SessionStartup`] is ever surfaced by a scrape run; the
/// remaining scraping variants are handled locally (logged and skipped) by the
/// orchestrator and the extractor.
#[derive(Debug, Error)]
pub enum AppError {
    /// The browser session could not be opened; fatal to the run
    #[error("session startup failure: {0}")]
    SessionStartup(String),
    /// A page could not be loaded; fatal to the current batch only
    #[error("navigation failure for {url}: {reason}")]
    Navigation {
        /// Page that failed to load
        url: String,
        /// Driver supplied reason
        reason: String,
    },
    /// No element matched a locator within its wait bound
    #[error("element not found: {0}")]
    ElementNotFound(String),
    /// An element was found but its text is not a price
    #[error("element parse failure: {0}")]
    ElementParse(String),
    /// Saving or loading a single record failed
    #[error("persistence failure: {0}")]
    Persistence(String),
    /// Underlying database error
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    /// Any other WebDriver command failure
    #[error("webdriver error: {0}")]
    WebDriver(String),
    /// Operation invoked in a state that does not allow it
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Invalid argument or malformed value
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
    /// Text that is not a single decimal number
    #[error("decimal error: {0}")]
    Decimal(#[from] rust_decimal::Error),
}

impl From<fantoccini::error::NewSessionError> for AppError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        AppError::SessionStartup(err.to_string())
    }
}

impl From<fantoccini::error::CmdError> for AppError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        AppError::WebDriver(err.to_string())
    }
}

impl AppError {
    /// Whether the error prevents a scrape run from producing any result
    #[must_use]
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(self, AppError::SessionStartup(_))
    }
}
