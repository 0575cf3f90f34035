use crate::browser::config::BrowserConfig;
use crate::browser::interface::{DriverFactory, Located, PageDriver};
use crate::error::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Lifecycle of a [`BrowserSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No browser has been started yet
    Uninitialized,
    /// A browser is running but no page is loaded
    Active,
    /// A page is loaded and can be queried
    PageLoaded,
    /// The browser has been released; terminal
    Closed,
}

/// Owns the one browser used by a scrape run
///
/// ```text
/// Uninitialized --create--> Active --navigate--> PageLoaded --navigate--> PageLoaded
///       any state --close--> Closed
/// ```
///
/// The session is not shareable: it is owned by the run that created it and
/// every query runs against whatever page that run navigated to last.
pub struct BrowserSession {
    factory: Arc<dyn DriverFactory>,
    config: BrowserConfig,
    driver: Option<Box<dyn PageDriver>>,
    state: SessionState,
    page_wait: Duration,
    current_url: Option<String>,
}

impl BrowserSession {
    /// Creates an uninitialized session; no browser is started until [`create`](Self::create)
    #[must_use]
    pub fn new(factory: Arc<dyn DriverFactory>, config: BrowserConfig) -> Self {
        let page_wait = config.page_wait();
        Self {
            factory,
            config,
            driver: None,
            state: SessionState::Uninitialized,
            page_wait,
            current_url: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Wait bound for queries against the current page
    #[must_use]
    pub fn page_wait(&self) -> Duration {
        self.page_wait
    }

    /// Page loaded by the last successful navigation
    #[must_use]
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Starts the browser
    ///
    /// Does nothing when the browser is already running.
    ///
    /// # Errors
    /// [`AppError::SessionStartup`] when the browser cannot be started, and
    /// [`AppError::InvalidState`] when the session was already closed.
    pub async fn create(&mut self) -> AppResult<()> {
        match self.state {
            SessionState::Active | SessionState::PageLoaded => {
                debug!("Browser session already active");
                return Ok(());
            }
            SessionState::Closed => {
                return Err(AppError::InvalidState(
                    "cannot create a closed browser session".to_string(),
                ));
            }
            SessionState::Uninitialized => {}
        }

        info!("Starting browser session at {}", self.config.webdriver_url);
        let driver = self.factory.open(&self.config).await.map_err(|e| match e {
            AppError::SessionStartup(reason) => AppError::SessionStartup(reason),
            other => AppError::SessionStartup(other.to_string()),
        })?;

        self.driver = Some(driver);
        self.state = SessionState::Active;
        Ok(())
    }

    /// Loads `url` and resets the page wait bound
    ///
    /// On failure the session falls back to `Active`: no page can be queried
    /// until a later navigation succeeds, but the browser can still be closed.
    ///
    /// # Errors
    /// [`AppError::Navigation`] when the page cannot be loaded and
    /// [`AppError::InvalidState`] when no browser is running.
    pub async fn navigate(&mut self, url: &str) -> AppResult<()> {
        let driver = match (self.state, self.driver.as_ref()) {
            (SessionState::Active | SessionState::PageLoaded, Some(driver)) => driver,
            (state, _) => {
                return Err(AppError::InvalidState(format!(
                    "cannot navigate in state {state:?}"
                )));
            }
        };

        debug!("Navigating to {}", url);
        match driver.goto(url).await {
            Ok(()) => {
                self.page_wait = self.config.page_wait();
                self.current_url = Some(url.to_string());
                self.state = SessionState::PageLoaded;
                Ok(())
            }
            Err(e) => {
                self.current_url = None;
                self.state = SessionState::Active;
                Err(AppError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Waits up to `timeout` for an element matching `locator` on the current page
    ///
    /// # Errors
    /// [`AppError::InvalidState`] when no page is loaded; driver failures other
    /// than the wait elapsing are passed through.
    pub async fn query(&self, locator: &str, timeout: Duration) -> AppResult<Located> {
        match (self.state, self.driver.as_ref()) {
            (SessionState::PageLoaded, Some(driver)) => driver.find_text(locator, timeout).await,
            (state, _) => Err(AppError::InvalidState(format!(
                "cannot query in state {state:?}"
            ))),
        }
    }

    /// Releases the browser
    ///
    /// Safe to call in any state and more than once. A failure to quit is
    /// logged; the session is considered closed regardless.
    pub async fn close(&mut self) {
        if let Some(driver) = self.driver.take() {
            match driver.quit().await {
                Ok(()) => info!("Browser session closed"),
                Err(e) => warn!("Failed to quit browser cleanly: {}", e),
            }
        }
        self.current_url = None;
        self.state = SessionState::Closed;
    }
}

impl Drop for BrowserSession {
    /// Quits a browser still open when the owning run panicked or was cancelled
    ///
    /// The quit is spawned onto the current runtime; outside a runtime the
    /// browser cannot be reached any more and is only reported.
    fn drop(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("Browser session dropped without close(), quitting it in the background");
                handle.spawn(async move {
                    if let Err(e) = driver.quit().await {
                        warn!("Failed to quit dropped browser session: {}", e);
                    }
                });
            }
            Err(_) => {
                error!("Browser session dropped outside a runtime; the browser process may leak");
            }
        }
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("state", &self.state)
            .field("page_wait", &self.page_wait)
            .field("current_url", &self.current_url)
            .finish()
    }
}
