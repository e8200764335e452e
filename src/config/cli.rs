use super::toml_config::TomlConfig;
use super::{ConfigOverrides, WatchConfig};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "appt-watch")]
#[command(about = "Watch store appointment availability and notify a Telegram chat")]
pub struct CliConfig {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Telegram bot token
    #[arg(long, env = "TG_BOTTOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Telegram chat to notify
    #[arg(long, env = "TG_CHATID", allow_negative_numbers = true)]
    pub chat_id: Option<i64>,

    /// File with one store number per line
    #[arg(long)]
    pub stores_file: Option<String>,

    /// Base URL of the availability feed
    #[arg(long)]
    pub base_url: Option<String>,

    /// Seconds between checks
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Address included in the notification
    #[arg(long)]
    pub store_address: Option<String>,

    /// Run a single check and exit
    #[arg(long)]
    pub once: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl CliConfig {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bot_token: self.bot_token.clone(),
            chat_id: self.chat_id,
            base_url: self.base_url.clone(),
            stores_file: self.stores_file.clone(),
            timeout_seconds: self.timeout_secs,
            interval_seconds: self.interval_secs,
            store_address: self.store_address.clone(),
        }
    }

    /// Merge the optional config file with flags and environment.
    pub fn load(&self) -> Result<WatchConfig> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        WatchConfig::resolve(file, self.overrides())
    }
}
