use crate::constants::{
    BROWSER_USER_AGENT, DEFAULT_WEBDRIVER_URL, IMPLICIT_WAIT_SECS, PAGE_LOAD_TIMEOUT_SECS,
    PAGE_WAIT_SECS, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::utils::config::{get_env_list, get_env_or_default};
use pretty_simple_display::{DebugPretty, DisplaySimple};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Everything needed to open a browser session
///
/// A plain value: building the WebDriver capabilities from it has no side
/// effects, so the same configuration can be inspected, logged and reused by
/// every session the factory opens.
#[derive(DebugPretty, DisplaySimple, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// WebDriver server endpoint (chromedriver)
    pub webdriver_url: String,
    /// Run Chrome without a visible window
    pub headless: bool,
    /// Viewport width in pixels
    pub window_width: u32,
    /// Viewport height in pixels
    pub window_height: u32,
    /// User agent presented to the bank's site
    pub user_agent: String,
    /// Implicit element wait applied to the whole session, in seconds
    pub implicit_wait_secs: u64,
    /// Explicit wait bound for queries against a loaded page, in seconds
    pub page_wait_secs: u64,
    /// Page load timeout, in seconds
    pub page_load_timeout_secs: u64,
    /// Additional Chrome command line switches
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            user_agent: BROWSER_USER_AGENT.to_string(),
            implicit_wait_secs: IMPLICIT_WAIT_SECS,
            page_wait_secs: PAGE_WAIT_SECS,
            page_load_timeout_secs: PAGE_LOAD_TIMEOUT_SECS,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Reads the browser section from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            webdriver_url: get_env_or_default("WEBDRIVER_URL", defaults.webdriver_url),
            headless: get_env_or_default("BROWSER_HEADLESS", defaults.headless),
            window_width: get_env_or_default("BROWSER_WINDOW_WIDTH", defaults.window_width),
            window_height: get_env_or_default("BROWSER_WINDOW_HEIGHT", defaults.window_height),
            user_agent: get_env_or_default("BROWSER_USER_AGENT", defaults.user_agent),
            implicit_wait_secs: get_env_or_default(
                "BROWSER_IMPLICIT_WAIT_SECS",
                defaults.implicit_wait_secs,
            ),
            page_wait_secs: get_env_or_default("BROWSER_PAGE_WAIT_SECS", defaults.page_wait_secs),
            page_load_timeout_secs: get_env_or_default(
                "BROWSER_PAGE_LOAD_TIMEOUT_SECS",
                defaults.page_load_timeout_secs,
            ),
            extra_args: get_env_list("BROWSER_EXTRA_ARGS"),
        }
    }

    /// Implicit element wait
    #[must_use]
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_secs(self.implicit_wait_secs)
    }

    /// Explicit wait bound for page queries
    #[must_use]
    pub fn page_wait(&self) -> Duration {
        Duration::from_secs(self.page_wait_secs)
    }

    /// Page load timeout
    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    /// Chrome command line switches: fixed viewport, masked fingerprint
    #[must_use]
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(8 + self.extra_args.len());
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args.push("--no-sandbox".to_string());
        args.push("--disable-dev-shm-usage".to_string());
        args.push("--disable-gpu".to_string());
        args.push("--disable-blink-features=AutomationControlled".to_string());
        args.push(format!(
            "--window-size={},{}",
            self.window_width, self.window_height
        ));
        args.push(format!("--user-agent={}", self.user_agent));
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// W3C capabilities sent when opening a session
    #[must_use]
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": self.chrome_args(),
                "excludeSwitches": ["enable-automation"],
                "useAutomationExtension": false,
            }),
        );
        caps
    }
}
