pub mod checker;
pub mod poller;

pub use crate::domain::model::{CheckResult, Entry, ErrorCode, Slot, SlotReason, WatchSet};
pub use crate::domain::ports::{Clock, Notifier};
pub use crate::utils::error::Result;
