use std::path::Path;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use config::FileFormat;
use fapi_http::HttpClientConfig;
use fapi_http::types::KlineInterval;
use serde::Deserialize;
use tracing::Level;

/// Environment variables prefixed `FAPI_` override file values, nested keys
/// use `__`, e.g. `FAPI_HTTP__REQUEST_TIMEOUT_MS=5000`
const ENV_PREFIX: &str = "FAPI";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub app_name: String,
    pub log_dir: String,
    /// `trace`, `debug`, `info`, `warn` or `error`; `RUST_LOG` still wins
    pub level: String,
    /// Mirror log lines to stdout as well as the log file
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { app_name: "fapi_monitor".to_string(), log_dir: "./logs".to_string(), level: "info".to_string(), stdout: true }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub symbol: String,
    pub testnet: bool,
    /// Takes precedence over `testnet` when set
    pub base_url: Option<String>,
    pub poll_interval_ms: u64,
    pub kline_interval: KlineInterval,
    /// Re-read declared ceilings every N polls, 0 disables
    pub refresh_limits_every: u32,
    /// Warn once any window crosses this fraction of its ceiling
    pub warn_utilisation: f64,
    pub http: HttpClientConfig,
    pub logging: LoggingConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            testnet: false,
            base_url: None,
            poll_interval_ms: 5_000,
            kline_interval: KlineInterval::OneMinute,
            refresh_limits_every: 720,
            warn_utilisation: 0.8,
            http: HttpClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX).prefix_separator("_").separator("__").try_parsing(true)
}

pub fn load_monitor_config<P: AsRef<Path>>(path: P) -> Result<MonitorConfig, ConfigError> {
    let config = Config::builder().add_source(File::from(path.as_ref())).add_source(env_source()).build()?;

    config.try_deserialize()
}

/// Parse a TOML document, without environment overrides
pub fn parse_monitor_config(toml: &str) -> Result<MonitorConfig, ConfigError> {
    let config = Config::builder().add_source(File::from_str(toml, FileFormat::Toml)).build()?;

    config.try_deserialize()
}

/// Load monitor config with fallback to default
pub fn load_monitor_config_or_default(path: &str) -> MonitorConfig {
    match load_monitor_config(path) {
        Ok(config) => {
            tracing::info!("Loaded monitor config from {path}");
            config
        }
        Err(err) => {
            tracing::warn!("Failed to load monitor config from {}: {}. Using defaults.", path, err);
            MonitorConfig::default()
        }
    }
}
