#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::poller::PollerConfig;
use crate::utils::error::{Result, WatchError};
use crate::utils::validation::{
    validate_base_url, validate_non_empty_string, validate_range, validate_required_field, Validate,
};
use serde::Serialize;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_BASE_URL: &str = "https://retail-pz.cdn-apple.com/product-zone-prod";
pub const DEFAULT_STORES_FILE: &str = "stores.conf";
pub const DEFAULT_STORE_ADDRESS: &str =
    "https://www.apple.com/de/retail/instore-shopping-session/?anchorStore=rosenstrasse";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Values supplied on the command line or through the environment. These win
/// over the TOML file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bot_token: Option<String>,
    pub chat_id: Option<i64>,
    pub base_url: Option<String>,
    pub stores_file: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub interval_seconds: Option<u64>,
    pub store_address: Option<String>,
}

/// Fully resolved process configuration, built once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct WatchConfig {
    #[serde(skip_serializing)]
    pub bot_token: String,
    pub chat_id: i64,
    pub base_url: String,
    pub stores_file: String,
    pub timeout_seconds: u64,
    pub interval_seconds: u64,
    pub store_address: String,
}

impl WatchConfig {
    pub fn resolve(file: TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        let bot_token = overrides.bot_token.or(file.telegram.bot_token);
        let chat_id = overrides.chat_id.or(file.telegram.chat_id);

        let config = Self {
            bot_token: validate_required_field("telegram.bot_token", &bot_token)?.clone(),
            chat_id: *validate_required_field("telegram.chat_id", &chat_id)?,
            base_url: overrides
                .base_url
                .or(file.source.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            stores_file: overrides
                .stores_file
                .or(file.source.stores_file)
                .unwrap_or_else(|| DEFAULT_STORES_FILE.to_string()),
            timeout_seconds: overrides
                .timeout_seconds
                .or(file.source.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            interval_seconds: overrides
                .interval_seconds
                .or(file.poller.interval_seconds)
                .unwrap_or(DEFAULT_INTERVAL_SECS),
            store_address: overrides
                .store_address
                .or(file.poller.store_address)
                .unwrap_or_else(|| DEFAULT_STORE_ADDRESS.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            chat_id: self.chat_id,
            interval: self.interval(),
            store_address: self.store_address.clone(),
        }
    }
}

impl Validate for WatchConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("telegram.bot_token", &self.bot_token)?;
        if self.chat_id == 0 {
            return Err(WatchError::InvalidConfigValueError {
                field: "telegram.chat_id".to_string(),
                value: "0".to_string(),
                reason: "Chat id must be non-zero".to_string(),
            });
        }
        validate_base_url("source.base_url", &self.base_url)?;
        validate_non_empty_string("source.stores_file", &self.stores_file)?;
        validate_range("poller.interval_seconds", self.interval_seconds, 1, 86_400)?;
        // A fetch must finish before the next tick is due.
        validate_range(
            "source.timeout_seconds",
            self.timeout_seconds,
            1,
            self.interval_seconds,
        )?;
        Ok(())
    }
}
