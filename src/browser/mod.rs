/// Pure browser configuration and WebDriver capabilities
pub mod config;
/// Driver traits and the located-element result
pub mod interface;
/// Browser session state machine
pub mod session;
/// fantoccini implementation of the driver traits
pub mod webdriver;

pub use config::BrowserConfig;
pub use interface::{DriverFactory, Located, PageDriver};
pub use session::{BrowserSession, SessionState};
pub use webdriver::{WebDriverFactory, WebDriverPage};
