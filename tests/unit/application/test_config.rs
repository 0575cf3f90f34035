use bank_agent::application::config::{RateLimiterConfig, SchedulerConfig};
use bank_agent::application::retry::RetryConfig;
use bank_agent::browser::config::BrowserConfig;
use std::time::Duration;

#[test]
fn test_capabilities_mask_automation() {
    let config = BrowserConfig {
        extra_args: vec!["--lang=ru".to_string()],
        ..BrowserConfig::default()
    };
    let capabilities = config.capabilities();

    assert_eq!(capabilities["browserName"], "chrome");
    let options = &capabilities["goog:chromeOptions"];
    assert_eq!(options["excludeSwitches"][0], "enable-automation");
    assert_eq!(options["useAutomationExtension"], false);

    let args: Vec<&str> = options["args"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|arg| arg.as_str())
        .collect();
    assert!(args.contains(&"--headless=new"));
    assert!(args.contains(&"--window-size=1920,1080"));
    assert_eq!(args.last(), Some(&"--lang=ru"));
}

#[test]
fn test_retry_defaults() {
    let retry = RetryConfig::default();
    assert_eq!(retry.attempts(), 3);
    assert_eq!(retry.delay(), Duration::from_secs(10));
    assert_eq!(RetryConfig::none().attempts(), 1);
}

#[test]
fn test_scheduler_never_collapses_jitter() {
    let config = SchedulerConfig {
        interval_secs: 900,
        metal_jitter_max_secs: 0,
        currency_jitter_min_secs: 80,
        currency_jitter_max_secs: 300,
    }
    .sanitized();
    assert_eq!(config.metal_jitter_max_secs, 120);
    assert_eq!(config.interval(), Duration::from_secs(900));
}

#[test]
fn test_config_serialization() {
    let config = RateLimiterConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: RateLimiterConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
