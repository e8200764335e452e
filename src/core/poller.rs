use crate::core::checker::Checker;
use crate::core::Notifier;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// RFC 822 with a numeric zone, e.g. `14 Nov 23 22:13 +0000`.
const TIME_FORMAT: &str = "%d %b %y %H:%M %z";

pub fn format_message<Tz>(at: &DateTime<Tz>, address: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "Appointment available!\ntime: {}\naddr: {}\n",
        at.format(TIME_FORMAT),
        address
    )
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub chat_id: i64,
    pub interval: Duration,
    pub store_address: String,
}

pub struct Poller {
    checker: Checker,
    notifier: Arc<dyn Notifier>,
    config: PollerConfig,
}

impl Poller {
    pub fn new(checker: Checker, notifier: Arc<dyn Notifier>, config: PollerConfig) -> Self {
        Self {
            checker,
            notifier,
            config,
        }
    }

    /// One check cycle. Returns whether a notification went out.
    pub async fn tick(&self) -> bool {
        let at = match self.checker.try_check().await {
            Ok(Some(at)) => at,
            Ok(None) => {
                tracing::info!("No appointment found");
                return false;
            }
            Err(e) => {
                tracing::warn!("Availability check failed: {}", e);
                return false;
            }
        };

        let text = format_message(&at.with_timezone(&Local), &self.config.store_address);
        self.notifier.send(self.config.chat_id, &text).await;
        true
    }

    pub async fn run_once(&self) -> bool {
        tracing::info!("Running a single availability check");
        self.tick().await
    }

    /// Check once per interval forever. The first check happens one full
    /// interval after start. Cycles run back to back on this task, so a slow
    /// check delays the next one and any ticks it overran are dropped.
    pub async fn run(&self) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await;

        tracing::info!(
            stores = self.checker.watch_set().len(),
            interval_secs = self.config.interval.as_secs(),
            "Start checking..."
        );

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_message_template() {
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let text = format_message(&at, "https://example.com/store");

        assert_eq!(
            text,
            "Appointment available!\ntime: 14 Nov 23 22:13 +0000\naddr: https://example.com/store\n"
        );
    }

    #[test]
    fn test_format_message_keeps_offset() {
        let berlin = FixedOffset::east_opt(3600).unwrap();
        let at = Utc
            .timestamp_opt(1_700_000_000, 0)
            .unwrap()
            .with_timezone(&berlin);

        assert!(format_message(&at, "addr").contains("time: 14 Nov 23 23:13 +0100\n"));
    }
}
