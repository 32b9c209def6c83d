//! # Configuration
//!
//! Stockroom configuration lives in `<home>/config.json`. Every field has a
//! compiled default, so a missing file (or a missing key) is never an error.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `storage-key` | `inventory` | Storage key of the default inventory |
//! | `quota-bytes` | `5242880` | Assumed capacity ceiling of the store (5 MiB) |
//! | `warn-threshold` | `85` | Usage percentage above which a warning is shown |
//! | `sync-endpoint` | unset | URL the inventory is POSTed to by `stockroom sync` |
//! | `sync-max-attempts` | `3` | Attempts before a sync gives up |
//! | `retry-base-delay-ms` | `100` | Backoff before the second attempt; doubles each retry |
//! | `retry-max-delay-ms` | `2000` | Upper bound on a single backoff |

use crate::capacity::{DEFAULT_QUOTA_BYTES, DEFAULT_WARN_THRESHOLD_PERCENT};
use crate::error::{Result, StockroomError};
use crate::fetch::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_STORAGE_KEY: &str = "inventory";

/// Keys accepted by `stockroom config`, in display order.
pub const CONFIG_KEYS: &[&str] = &[
    "storage-key",
    "quota-bytes",
    "warn-threshold",
    "sync-endpoint",
    "sync-max-attempts",
    "retry-base-delay-ms",
    "retry-max-delay-ms",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockroomConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,

    #[serde(default = "default_warn_threshold")]
    pub warn_threshold_percent: f64,

    #[serde(default)]
    pub sync_endpoint: Option<String>,

    #[serde(default = "default_max_attempts")]
    pub sync_max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_quota_bytes() -> u64 {
    DEFAULT_QUOTA_BYTES
}

fn default_warn_threshold() -> f64 {
    DEFAULT_WARN_THRESHOLD_PERCENT
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    2000
}

impl Default for StockroomConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            quota_bytes: default_quota_bytes(),
            warn_threshold_percent: default_warn_threshold(),
            sync_endpoint: None,
            sync_max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_base_delay_ms(),
            retry_max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl StockroomConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: StockroomConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.sync_max_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
            Duration::from_millis(self.retry_max_delay_ms),
        )
    }

    /// Current value of a setting, rendered for display. `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "storage-key" => self.storage_key.clone(),
            "quota-bytes" => self.quota_bytes.to_string(),
            "warn-threshold" => self.warn_threshold_percent.to_string(),
            "sync-endpoint" => self.sync_endpoint.clone().unwrap_or_default(),
            "sync-max-attempts" => self.sync_max_attempts.to_string(),
            "retry-base-delay-ms" => self.retry_base_delay_ms.to_string(),
            "retry-max-delay-ms" => self.retry_max_delay_ms.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Parse and apply a setting. An empty `sync-endpoint` unsets it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "storage-key" => {
                if value.trim().is_empty() {
                    return Err(StockroomError::Config("storage-key cannot be empty".into()));
                }
                self.storage_key = value.trim().to_string();
            }
            "quota-bytes" => self.quota_bytes = parse_number(key, value)?,
            "warn-threshold" => {
                let threshold: f64 = parse_number(key, value)?;
                if !(0.0..=100.0).contains(&threshold) {
                    return Err(StockroomError::Config(
                        "warn-threshold must be between 0 and 100".into(),
                    ));
                }
                self.warn_threshold_percent = threshold;
            }
            "sync-endpoint" => {
                let trimmed = value.trim();
                self.sync_endpoint = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            "sync-max-attempts" => {
                let attempts: u32 = parse_number(key, value)?;
                if attempts == 0 {
                    return Err(StockroomError::Config(
                        "sync-max-attempts must be at least 1".into(),
                    ));
                }
                self.sync_max_attempts = attempts;
            }
            "retry-base-delay-ms" => self.retry_base_delay_ms = parse_number(key, value)?,
            "retry-max-delay-ms" => self.retry_max_delay_ms = parse_number(key, value)?,
            other => {
                return Err(StockroomError::Config(format!(
                    "Unknown config key: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| StockroomError::Config(format!("Invalid value for {}: {}", key, value)))
}
