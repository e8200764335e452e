use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of the current time, injected so URL templating and "available now"
/// decisions can be tested without the wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Outbound message delivery. Best effort: implementations log their own
/// failures and never report them back to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str);
}
