use crate::core::{CheckResult, Clock, Entry, ErrorCode, Slot, SlotReason, WatchSet};
use crate::utils::error::{Result, WatchError};
use chrono::{DateTime, Datelike, Timelike, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Hourly availability document URL for the given instant.
pub fn build_url(base_url: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/availability/{}-{}-{}/{:02}/availability.json",
        base_url.trim_end_matches('/'),
        now.year(),
        now.month(),
        now.day(),
        now.hour()
    )
}

/// First watched entry with a positive signal, scanning entries in feed order
/// and the watch set in configured order for each entry.
pub fn find_slot(entries: &[Entry], watch: &WatchSet, now: DateTime<Utc>) -> Option<Slot> {
    for entry in entries {
        for store in watch.iter() {
            if entry.store_number != store {
                continue;
            }

            tracing::info!(
                store = %entry.store_number,
                available = entry.appointments_available,
                first_available = entry.first_available_appointment,
                error_code = ?entry.error_code,
                "Watched store found in feed"
            );

            if entry.error_code == Some(ErrorCode::AppointmentNotNeeded) {
                return Some(Slot {
                    store_number: entry.store_number.clone(),
                    at: now,
                    reason: SlotReason::NotNeeded,
                });
            }

            if entry.appointments_available {
                match DateTime::from_timestamp(entry.first_available_appointment, 0) {
                    Some(at) => {
                        return Some(Slot {
                            store_number: entry.store_number.clone(),
                            at,
                            reason: SlotReason::FirstAvailable,
                        })
                    }
                    None => tracing::warn!(
                        store = %entry.store_number,
                        "Ignoring out-of-range appointment timestamp {}",
                        entry.first_available_appointment
                    ),
                }
            }
        }
    }

    None
}

pub struct Checker {
    base_url: String,
    watch: Arc<WatchSet>,
    clock: Arc<dyn Clock>,
    client: Client,
}

impl Checker {
    pub fn new(
        base_url: String,
        watch: Arc<WatchSet>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            watch,
            clock,
            client,
        })
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch
    }

    /// Fetch and decode the feed for the hour containing `now`.
    pub async fn fetch_entries(&self, now: DateTime<Utc>) -> Result<Vec<Entry>> {
        let url = build_url(&self.base_url, now);
        tracing::debug!("Checking availability: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(WatchError::BadStatus { status });
        }

        let body = response.bytes().await?;
        let entries: Vec<Entry> = serde_json::from_slice(&body)?;
        tracing::debug!("Decoded {} availability entries", entries.len());

        Ok(entries)
    }

    /// Run one check, keeping a failed fetch apart from "nothing available".
    pub async fn try_check(&self) -> Result<CheckResult> {
        let now = self.clock.now();
        let entries = self.fetch_entries(now).await?;

        Ok(find_slot(&entries, &self.watch, now).map(|slot| {
            tracing::info!(
                store = %slot.store_number,
                reason = ?slot.reason,
                "Appointment available at {}",
                slot.at
            );
            slot.at
        }))
    }

    /// Run one check. Fetch failures are logged and reported as no availability.
    pub async fn check(&self) -> CheckResult {
        self.try_check().await.unwrap_or_else(|e| {
            tracing::warn!("Availability check failed: {}", e);
            None
        })
    }
}
