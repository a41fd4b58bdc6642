//! Download tuning knobs, loaded from defaults, environment and TOML.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::DownloadError;

pub const ENV_BATCH_SIZE: &str = "EQUITYFEED_BATCH_SIZE";
pub const ENV_MAX_RETRIES: &str = "EQUITYFEED_MAX_RETRIES";
pub const ENV_RETRY_BACKOFF: &str = "EQUITYFEED_RETRY_BACKOFF_SECS";
pub const ENV_NO_DATA_CONFIRMATIONS: &str = "EQUITYFEED_NO_DATA_CONFIRMATIONS";
pub const ENV_DELAY: &str = "EQUITYFEED_DELAY_SECS";

/// Parameters of the bulk download loop.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadConfig {
    /// Tickers per provider call.
    pub batch_size: usize,
    /// Extra attempts a ticker gets after its first failure.
    pub max_retries_per_ticker: u32,
    /// Base of the exponential backoff; zero disables backoff.
    pub retry_backoff_seconds: f64,
    /// Consecutive empty responses needed to accept "no data".
    pub no_data_confirmations: u32,
    /// Flat pause between batches that needed no backoff.
    pub delay_seconds: f64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_retries_per_ticker: 4,
            retry_backoff_seconds: 1.5,
            no_data_confirmations: 2,
            delay_seconds: 0.0,
        }
    }
}

/// Optional overrides, as read from a TOML file or CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub batch_size: Option<usize>,
    pub max_retries_per_ticker: Option<u32>,
    pub retry_backoff_seconds: Option<f64>,
    pub no_data_confirmations: Option<u32>,
    pub delay_seconds: Option<f64>,
}

impl ConfigOverrides {
    /// Parses a TOML document; absent keys stay `None`.
    pub fn from_toml_str(content: &str) -> Result<Self, DownloadError> {
        toml::from_str(content)
            .map_err(|e| DownloadError::Configuration(format!("Invalid config file: {}", e)))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, DownloadError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DownloadError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Returns `base` with every set field replaced.
    pub fn apply(&self, base: DownloadConfig) -> DownloadConfig {
        DownloadConfig {
            batch_size: self.batch_size.unwrap_or(base.batch_size),
            max_retries_per_ticker: self
                .max_retries_per_ticker
                .unwrap_or(base.max_retries_per_ticker),
            retry_backoff_seconds: self
                .retry_backoff_seconds
                .unwrap_or(base.retry_backoff_seconds),
            no_data_confirmations: self
                .no_data_confirmations
                .unwrap_or(base.no_data_confirmations),
            delay_seconds: self.delay_seconds.unwrap_or(base.delay_seconds),
        }
    }
}

impl DownloadConfig {
    /// Defaults overlaid with any `EQUITYFEED_*` variables that parse.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            batch_size: env_parse(ENV_BATCH_SIZE, d.batch_size),
            max_retries_per_ticker: env_parse(ENV_MAX_RETRIES, d.max_retries_per_ticker),
            retry_backoff_seconds: env_parse(ENV_RETRY_BACKOFF, d.retry_backoff_seconds),
            no_data_confirmations: env_parse(ENV_NO_DATA_CONFIRMATIONS, d.no_data_confirmations),
            delay_seconds: env_parse(ENV_DELAY, d.delay_seconds),
        }
    }

    /// Defaults overlaid with a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, DownloadError> {
        Ok(ConfigOverrides::from_toml_str(content)?.apply(Self::default()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, DownloadError> {
        Ok(ConfigOverrides::from_toml_file(path)?.apply(Self::default()))
    }

    /// Environment first, then the optional file on top.
    pub fn layered(file: Option<&Path>) -> Result<Self, DownloadError> {
        let base = Self::from_env();
        match file {
            Some(path) => Ok(ConfigOverrides::from_toml_file(path)?.apply(base)),
            None => Ok(base),
        }
    }

    /// Rejects values the download loop cannot work with.
    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.batch_size < 1 {
            return Err(invalid("batch_size must be >= 1"));
        }
        if !self.retry_backoff_seconds.is_finite() || self.retry_backoff_seconds < 0.0 {
            return Err(invalid("retry_backoff_seconds must be >= 0"));
        }
        if self.no_data_confirmations < 1 {
            return Err(invalid("no_data_confirmations must be >= 1"));
        }
        if !self.delay_seconds.is_finite() || self.delay_seconds < 0.0 {
            return Err(invalid("delay_seconds must be >= 0"));
        }
        if Duration::try_from_secs_f64(self.delay_seconds).is_err() {
            return Err(invalid("delay_seconds is too large"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> DownloadError {
    DownloadError::Configuration(msg.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}
