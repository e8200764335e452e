// Application layer: startup wiring from resolved configuration to a running poller.

use crate::adapters::clock::SystemClock;
use crate::adapters::telegram::TelegramNotifier;
use crate::config::WatchConfig;
use crate::core::checker::Checker;
use crate::core::poller::Poller;
use crate::core::{Clock, Notifier, WatchSet};
use crate::utils::error::{Result, WatchError};
use std::sync::Arc;

/// Read the watch list, refusing one that could never match.
pub fn load_watch_set(config: &WatchConfig) -> Result<WatchSet> {
    let watch = WatchSet::from_file(&config.stores_file)?;
    if watch.is_empty() {
        return Err(WatchError::ConfigError {
            message: format!("no store numbers found in {}", config.stores_file),
        });
    }

    tracing::info!("Watching stores: {:?}", watch.as_slice());
    Ok(watch)
}

pub fn build_poller(
    config: &WatchConfig,
    watch: WatchSet,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
) -> Result<Poller> {
    let checker = Checker::new(
        config.base_url.clone(),
        Arc::new(watch),
        clock,
        config.timeout(),
    )?;
    Ok(Poller::new(checker, notifier, config.poller_config()))
}

/// Everything fatal happens here, before the first tick.
pub async fn bootstrap(config: &WatchConfig) -> Result<Poller> {
    let watch = load_watch_set(config)?;
    let notifier = TelegramNotifier::connect(&config.bot_token).await?;
    build_poller(config, watch, Arc::new(SystemClock), Arc::new(notifier))
}
