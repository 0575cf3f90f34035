/// Number of instruments rendered on one quote page
pub const BATCH_SIZE: usize = 5;
/// Token substituted into empty URL slots of the last, partial batch
pub const PLACEHOLDER_TOKEN: &str = "";
/// Implicit element wait configured on a fresh browser session, in seconds
pub const IMPLICIT_WAIT_SECS: u64 = 5;
/// Explicit wait bound used by element queries against a loaded page, in seconds
pub const PAGE_WAIT_SECS: u64 = 10;
/// Page load timeout configured on a fresh browser session, in seconds
pub const PAGE_LOAD_TIMEOUT_SECS: u64 = 60;
/// Default browser viewport width
pub const WINDOW_WIDTH: u32 = 1920;
/// Default browser viewport height
pub const WINDOW_HEIGHT: u32 = 1080;
/// User agent presented by the headless browser instead of the automation default
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
/// Default WebDriver endpoint (chromedriver's default port)
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
/// Interval between scheduled scrape cycles, in seconds (15 minutes)
pub const SCHEDULE_INTERVAL_SECS: u64 = 900;
/// Upper bound of the random pause before the metal scrape, in seconds
pub const METAL_JITTER_MAX_SECS: u64 = 120;
/// Lower bound of the random pause before the currency scrape, in seconds
pub const CURRENCY_JITTER_MIN_SECS: u64 = 80;
/// Upper bound (exclusive) of the random pause before the currency scrape, in seconds
pub const CURRENCY_JITTER_MAX_SECS: u64 = 300;
/// Attempts made by the scheduler for a stage that fails to open a session
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Delay between scheduler retry attempts, in seconds
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 10;
/// Length of the generated run identifiers
pub const RUN_ID_LENGTH: usize = 30;
