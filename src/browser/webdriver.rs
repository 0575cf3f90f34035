//! WebDriver backed browser built on `fantoccini`
//!
//! Requires a running chromedriver (or any W3C WebDriver server that accepts
//! `goog:chromeOptions`) at [`BrowserConfig::webdriver_url`].

use crate::browser::config::BrowserConfig;
use crate::browser::interface::{DriverFactory, Located, PageDriver};
use crate::error::AppError;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use tracing::{debug, warn};

/// A page driven through a WebDriver session
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    /// Wraps an already configured WebDriver client
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageDriver for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<(), AppError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn find_text(&self, locator: &str, timeout: Duration) -> Result<Located, AppError> {
        let found = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::XPath(locator))
            .await;

        match found {
            Ok(element) => {
                let text = element.text().await?;
                Ok(Located::Found(text))
            }
            Err(CmdError::WaitTimeout) => Ok(Located::NotFound),
            Err(e) if e.is_no_such_element() => Ok(Located::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn quit(&self) -> Result<(), AppError> {
        self.client.clone().close().await?;
        Ok(())
    }
}

/// Opens Chrome sessions through a WebDriver server
#[derive(Debug, Default, Clone)]
pub struct WebDriverFactory;

#[async_trait]
impl DriverFactory for WebDriverFactory {
    async fn open(&self, config: &BrowserConfig) -> Result<Box<dyn PageDriver>, AppError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(config.capabilities());
        let client = builder
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| AppError::SessionStartup(e.to_string()))?;

        let timeouts = TimeoutConfiguration::new(
            None,
            Some(config.page_load_timeout()),
            Some(config.implicit_wait()),
        );

        let configured = async {
            client.update_timeouts(timeouts).await?;
            client
                .set_window_size(config.window_width, config.window_height)
                .await?;
            Ok::<(), CmdError>(())
        }
        .await;

        if let Err(e) = configured {
            if let Err(close_err) = client.clone().close().await {
                warn!("Failed to close half-configured session: {}", close_err);
            }
            return Err(AppError::SessionStartup(e.to_string()));
        }

        debug!(
            "WebDriver session ready ({}x{}, implicit wait {:?})",
            config.window_width,
            config.window_height,
            config.implicit_wait()
        );
        Ok(Box::new(WebDriverPage::new(client)))
    }
}
