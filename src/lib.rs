pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::WatchConfig;
pub use crate::core::{checker::Checker, poller::Poller};
pub use utils::error::{Result, WatchError};
