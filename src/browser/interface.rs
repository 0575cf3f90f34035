use crate::browser::config::BrowserConfig;
use crate::error::AppError;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of waiting for an element
///
/// Not finding an element within the wait bound is an expected outcome, not
/// an error: callers branch on it to try a different locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// An element matched; carries its visible text
    Found(String),
    /// Nothing matched before the wait bound elapsed
    NotFound,
}

impl Located {
    /// Whether an element matched
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Located::Found(_))
    }
}

/// A live browser that drives one page at a time
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Loads `url` in the current window
    async fn goto(&self, url: &str) -> Result<(), AppError>;

    /// Waits up to `timeout` for an element matching the XPath `locator`
    async fn find_text(&self, locator: &str, timeout: Duration) -> Result<Located, AppError>;

    /// Ends the WebDriver session and releases the browser process
    async fn quit(&self) -> Result<(), AppError>;
}

/// Opens browser sessions
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Starts a browser configured from `config`
    async fn open(&self, config: &BrowserConfig) -> Result<Box<dyn PageDriver>, AppError>;
}
