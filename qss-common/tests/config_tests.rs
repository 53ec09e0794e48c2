//! Configuration resolution tests
//!
//! Covers the CLI → ENV → TOML → default priority order and graceful handling
//! of missing or broken TOML files.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that read or write QSS_* variables are marked with #[serial].

use qss_common::config::{
    CliOverrides, ConfigResolver, RetrySettings, TomlConfig, DEFAULT_CHATBOT_URL,
    DEFAULT_LISTEN_ADDR, DEFAULT_MAX_RETRIES,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

const QSS_VARS: &[&str] = &[
    "QSS_CONFIG",
    "QSS_LISTEN_ADDR",
    "QSS_DATABASE_PATH",
    "QSS_VISIT_SOURCE_BASE",
    "QSS_CHATBOT_URL",
    "QSS_MAX_RETRIES",
    "QSS_BASE_DELAY_MS",
    "QSS_TIMEOUT_MS",
    "QSS_MAX_JITTER_MS",
    "QSS_LOG_LEVEL",
];

fn clear_env() {
    for var in QSS_VARS {
        env::remove_var(var);
    }
}

fn toml_fixture() -> TomlConfig {
    TomlConfig {
        listen_addr: Some("0.0.0.0:7000".to_string()),
        database_path: Some(PathBuf::from("/tmp/qss-toml.db")),
        visit_source_base: Some("http://toml-host:9000/".to_string()),
        chatbot_url: Some("http://toml-host:9001/chat".to_string()),
        retry: RetrySettings {
            max_retries: Some(7),
            base_delay_ms: Some(250),
            timeout_ms: Some(3_000),
            max_jitter_ms: Some(0),
        },
        logging: Default::default(),
    }
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let config = ConfigResolver::with_toml(CliOverrides::default(), TomlConfig::default())
        .resolve()
        .unwrap();

    assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
    assert_eq!(config.chatbot_url, DEFAULT_CHATBOT_URL);
    assert!(config.database_path.is_none());
    assert_eq!(config.retry.max_retries, DEFAULT_MAX_RETRIES);
    assert_eq!(config.retry.base_delay, Duration::from_secs(1));
    assert_eq!(config.retry.timeout, Duration::from_secs(10));
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_toml_overrides_defaults() {
    clear_env();

    let config = ConfigResolver::with_toml(CliOverrides::default(), toml_fixture())
        .resolve()
        .unwrap();

    assert_eq!(config.listen_addr, "0.0.0.0:7000");
    assert_eq!(config.database_path, Some(PathBuf::from("/tmp/qss-toml.db")));
    // Trailing slash stripped so URLs join cleanly
    assert_eq!(config.visit_source_base, "http://toml-host:9000");
    assert_eq!(config.retry.max_retries, 7);
    assert_eq!(config.retry.base_delay, Duration::from_millis(250));
    assert_eq!(config.retry.max_jitter, Duration::ZERO);
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var("QSS_LISTEN_ADDR", "127.0.0.1:8111");
    env::set_var("QSS_MAX_RETRIES", "2");
    env::set_var("QSS_DATABASE_PATH", "/tmp/qss-env.db");

    let config = ConfigResolver::with_toml(CliOverrides::default(), toml_fixture())
        .resolve()
        .unwrap();

    assert_eq!(config.listen_addr, "127.0.0.1:8111");
    assert_eq!(config.retry.max_retries, 2);
    assert_eq!(config.database_path, Some(PathBuf::from("/tmp/qss-env.db")));
    // Untouched settings still come from TOML
    assert_eq!(config.chatbot_url, "http://toml-host:9001/chat");

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var("QSS_LISTEN_ADDR", "127.0.0.1:8111");
    env::set_var("QSS_MAX_RETRIES", "2");

    let cli = CliOverrides {
        listen_addr: Some("127.0.0.1:9999".to_string()),
        max_retries: Some(1),
        ..Default::default()
    };
    let config = ConfigResolver::with_toml(cli, toml_fixture()).resolve().unwrap();

    assert_eq!(config.listen_addr, "127.0.0.1:9999");
    assert_eq!(config.retry.max_retries, 1);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_value_is_config_error() {
    clear_env();
    env::set_var("QSS_MAX_RETRIES", "many");

    let result = ConfigResolver::with_toml(CliOverrides::default(), TomlConfig::default()).resolve();

    let err = result.unwrap_err().to_string();
    assert!(err.contains("QSS_MAX_RETRIES"), "unexpected error: {}", err);

    clear_env();
}

#[test]
#[serial]
fn test_zero_timeout_rejected() {
    clear_env();
    env::set_var("QSS_TIMEOUT_MS", "0");

    let result = ConfigResolver::with_toml(CliOverrides::default(), TomlConfig::default()).resolve();
    assert!(result.is_err());

    clear_env();
}

#[test]
#[serial]
fn test_config_file_loaded_from_cli_path() {
    clear_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
listen_addr = "127.0.0.1:6100"
chatbot_url = "http://bot.local/send"

[retry]
max_retries = 3
timeout_ms = 500

[logging]
level = "debug"
"#
    )
    .unwrap();

    let cli = CliOverrides {
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = ConfigResolver::new(cli).resolve().unwrap();

    assert_eq!(config.listen_addr, "127.0.0.1:6100");
    assert_eq!(config.chatbot_url, "http://bot.local/send");
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.timeout, Duration::from_millis(500));
    assert_eq!(config.log_level, "debug");
}

#[test]
#[serial]
fn test_broken_config_file_falls_back_to_defaults() {
    clear_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "listen_addr = [this is not toml").unwrap();

    let cli = CliOverrides {
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = ConfigResolver::new(cli).resolve().unwrap();

    assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
}

#[test]
#[serial]
fn test_missing_config_file_is_not_fatal() {
    clear_env();

    let cli = CliOverrides {
        config_file: Some(PathBuf::from("/nonexistent/qss/config.toml")),
        ..Default::default()
    };
    assert!(ConfigResolver::new(cli).resolve().is_ok());
}
