#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

const KEYS: [&str; 6] = [
    "EXPENSES_LISTEN_ADDR",
    "EXPENSES_DB_PATH",
    "EXPENSES_CORS_ALLOW_ORIGINS",
    "EXPENSES_REQUEST_TIMEOUT_MS",
    "EXPENSES_WARNING_PERCENT",
    "EXPENSES_LOG_FORMAT",
];

fn cleanup_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

#[test]
fn test_new_uses_defaults() {
    let config = Config::new("/tmp/x.db");
    assert_eq!(config.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
    assert_eq!(config.cors_allow, vec!["*"]);
    assert_eq!(config.request_timeout, Duration::from_millis(30_000));
    assert_eq!(config.thresholds, AlertThresholds::default());
    assert_eq!(config.log_format, LogFormat::Text);
}

// Env vars are process-wide, so every from_env case lives in this one test.
#[test]
fn test_from_env() {
    cleanup_env();
    std::env::set_var("EXPENSES_DB_PATH", "/tmp/expenses-test.db");
    std::env::set_var("EXPENSES_LISTEN_ADDR", "0.0.0.0:9000");
    std::env::set_var("EXPENSES_CORS_ALLOW_ORIGINS", "http://a.test, http://b.test,");
    std::env::set_var("EXPENSES_REQUEST_TIMEOUT_MS", "1500");
    std::env::set_var("EXPENSES_WARNING_PERCENT", "90");
    std::env::set_var("EXPENSES_LOG_FORMAT", "JSON");

    let config = Config::from_env().unwrap();
    assert_eq!(config.db_path, PathBuf::from("/tmp/expenses-test.db"));
    assert_eq!(config.listen_addr.port(), 9000);
    assert_eq!(config.cors_allow, vec!["http://a.test", "http://b.test"]);
    assert_eq!(config.request_timeout, Duration::from_millis(1500));
    assert_eq!(config.thresholds.warning_ratio, dec!(0.90));
    assert_eq!(config.log_format, LogFormat::Json);

    for (key, bad) in [
        ("EXPENSES_WARNING_PERCENT", "0"),
        ("EXPENSES_WARNING_PERCENT", "abc"),
        ("EXPENSES_LISTEN_ADDR", "not-an-addr"),
        ("EXPENSES_REQUEST_TIMEOUT_MS", "-1"),
        ("EXPENSES_LOG_FORMAT", "xml"),
    ] {
        let previous = std::env::var(key).unwrap();
        std::env::set_var(key, bad);
        assert!(Config::from_env().is_err(), "{key}={bad}");
        std::env::set_var(key, previous);
    }

    cleanup_env();
}
