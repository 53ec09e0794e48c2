//! Configuration loading and resolution
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is not fatal: a warning is logged and
//! resolution continues with the remaining tiers.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";

/// Default base address visit records are fetched from
pub const DEFAULT_VISIT_SOURCE_BASE: &str = "http://127.0.0.1:5000";

/// Default chatbot dispatch endpoint
pub const DEFAULT_CHATBOT_URL: &str = "http://127.0.0.1:5005/chatbot";

/// Default log filter directive
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_JITTER_MS: u64 = 1_000;

/// Environment variable naming an explicit TOML config file
pub const ENV_CONFIG_FILE: &str = "QSS_CONFIG";

const ENV_LISTEN_ADDR: &str = "QSS_LISTEN_ADDR";
const ENV_DATABASE_PATH: &str = "QSS_DATABASE_PATH";
const ENV_VISIT_SOURCE_BASE: &str = "QSS_VISIT_SOURCE_BASE";
const ENV_CHATBOT_URL: &str = "QSS_CHATBOT_URL";
const ENV_MAX_RETRIES: &str = "QSS_MAX_RETRIES";
const ENV_BASE_DELAY_MS: &str = "QSS_BASE_DELAY_MS";
const ENV_TIMEOUT_MS: &str = "QSS_TIMEOUT_MS";
const ENV_MAX_JITTER_MS: &str = "QSS_MAX_JITTER_MS";
const ENV_LOG_LEVEL: &str = "QSS_LOG_LEVEL";

/// On-disk TOML configuration. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub listen_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    pub visit_source_base: Option<String>,
    pub chatbot_url: Option<String>,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[retry]` table of the TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub max_jitter_ms: Option<u64>,
}

/// `[logging]` table of the TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub listen_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    pub visit_source_base: Option<String>,
    pub chatbot_url: Option<String>,
    pub max_retries: Option<u32>,
    pub log_level: Option<String>,
}

/// Outbound retry behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_jitter: Duration::from_millis(DEFAULT_MAX_JITTER_MS),
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub listen_addr: String,
    /// `None` selects the in-memory record store
    pub database_path: Option<PathBuf>,
    /// Base URL without trailing slash
    pub visit_source_base: String,
    pub chatbot_url: String,
    pub retry: RetryConfig,
    pub log_level: String,
}

/// Resolves [`ServiceConfig`] from CLI, environment, TOML and defaults
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    cli: CliOverrides,
    toml: TomlConfig,
}

impl ConfigResolver {
    /// Build a resolver, loading the TOML file named by the CLI, by
    /// `QSS_CONFIG`, or found at the platform default location.
    pub fn new(cli: CliOverrides) -> Self {
        let toml = match locate_config_file(cli.config_file.as_deref()) {
            Some(path) => match TomlConfig::load(&path) {
                Ok(config) => {
                    debug!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    TomlConfig::default()
                }
            },
            None => {
                debug!("No config file found, using environment and defaults");
                TomlConfig::default()
            }
        };
        Self { cli, toml }
    }

    /// Build a resolver from an already parsed TOML config
    pub fn with_toml(cli: CliOverrides, toml: TomlConfig) -> Self {
        Self { cli, toml }
    }

    pub fn resolve(&self) -> Result<ServiceConfig> {
        let cli = &self.cli;
        let toml = &self.toml;

        let listen_addr = pick(
            cli.listen_addr.clone(),
            ENV_LISTEN_ADDR,
            toml.listen_addr.clone(),
            DEFAULT_LISTEN_ADDR.to_string(),
        )?;

        let database_path = match &cli.database_path {
            Some(path) => Some(path.clone()),
            None => match std::env::var(ENV_DATABASE_PATH) {
                Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
                _ => toml.database_path.clone(),
            },
        };

        let visit_source_base = pick(
            cli.visit_source_base.clone(),
            ENV_VISIT_SOURCE_BASE,
            toml.visit_source_base.clone(),
            DEFAULT_VISIT_SOURCE_BASE.to_string(),
        )?
        .trim_end_matches('/')
        .to_string();

        let chatbot_url = pick(
            cli.chatbot_url.clone(),
            ENV_CHATBOT_URL,
            toml.chatbot_url.clone(),
            DEFAULT_CHATBOT_URL.to_string(),
        )?;

        let retry = RetryConfig {
            max_retries: pick(
                cli.max_retries,
                ENV_MAX_RETRIES,
                toml.retry.max_retries,
                DEFAULT_MAX_RETRIES,
            )?,
            base_delay: Duration::from_millis(pick(
                None,
                ENV_BASE_DELAY_MS,
                toml.retry.base_delay_ms,
                DEFAULT_BASE_DELAY_MS,
            )?),
            timeout: Duration::from_millis(pick(
                None,
                ENV_TIMEOUT_MS,
                toml.retry.timeout_ms,
                DEFAULT_TIMEOUT_MS,
            )?),
            max_jitter: Duration::from_millis(pick(
                None,
                ENV_MAX_JITTER_MS,
                toml.retry.max_jitter_ms,
                DEFAULT_MAX_JITTER_MS,
            )?),
        };

        if retry.timeout.is_zero() {
            return Err(Error::Config("Retry timeout must be greater than zero".to_string()));
        }

        let log_level = pick(
            cli.log_level.clone(),
            ENV_LOG_LEVEL,
            toml.logging.level.clone(),
            DEFAULT_LOG_LEVEL.to_string(),
        )?;

        Ok(ServiceConfig {
            listen_addr,
            database_path,
            visit_source_base,
            chatbot_url,
            retry,
            log_level,
        })
    }
}

/// Pick the first available tier for one setting
fn pick<T>(cli: Option<T>, env_var_name: &str, toml: Option<T>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = cli {
        return Ok(value);
    }

    if let Ok(raw) = std::env::var(env_var_name) {
        let raw = raw.trim();
        if !raw.is_empty() {
            return raw
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Invalid {}={:?}: {}", env_var_name, raw, e)));
        }
    }

    Ok(toml.unwrap_or(default))
}

/// Find the TOML file to load, if any
fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|path| path.exists())
}

/// Platform config location: `<config_dir>/qss/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("qss").join("config.toml"))
}
