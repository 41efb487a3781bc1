//! Freshness-driven refresh scheduling.
//!
//! A recurring time-boundary check: given the last-refresh timestamp, the
//! configured period, and dataset-file presence, decide whether to invoke the
//! refresh capability, and persist the new timestamp on success.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::TICK_INTERVAL_SECS;
use crate::error::GeoPulseError;
use crate::service::GeoPulse;
use crate::store::{self, RefreshMetadata};

/// Whether a refresh is due.
///
/// A missing primary data file always forces an immediate refresh regardless
/// of period; an existing file only triggers once the period has expired.
/// Absent or unparseable metadata counts as "never refreshed".
pub fn refresh_due(
    now: DateTime<Utc>,
    last_run: Option<DateTime<Utc>>,
    period_minutes: i64,
    data_file_exists: bool,
) -> bool {
    if !data_file_exists {
        return true;
    }
    match last_run {
        None => true,
        Some(last_run) => now - last_run >= Duration::minutes(period_minutes),
    }
}

/// Periodic refresh driver for a [`GeoPulse`] service.
///
/// Ticks are cooperative: the loop waits for a tick's work to finish before
/// scheduling the next, so refreshes never overlap. Stopping the scheduler
/// stops further ticks; an in-flight refresh is allowed to complete.
pub struct FreshnessScheduler {
    service: Arc<GeoPulse>,
    period_minutes: i64,
    tick_interval: StdDuration,
}

impl FreshnessScheduler {
    /// Creates a scheduler for the service.
    ///
    /// Fails fast with [`GeoPulseError::InvalidConfiguration`] if the refresh
    /// period is below one minute, before any timer starts.
    pub fn new(service: Arc<GeoPulse>) -> Result<Self, GeoPulseError> {
        service.config().validate()?;
        Ok(FreshnessScheduler {
            period_minutes: service.config().refresh_period_minutes,
            tick_interval: StdDuration::from_secs(TICK_INTERVAL_SECS),
            service,
        })
    }

    /// Overrides the fixed tick interval (tests use short intervals).
    pub fn with_tick_interval(mut self, tick_interval: StdDuration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Runs one due-check, refreshing if needed.
    ///
    /// Returns `Ok(true)` when a refresh ran. On refresh failure the metadata
    /// timestamp is left untouched so the next tick retries, and the
    /// in-memory snapshot keeps serving the last loaded dataset.
    pub async fn tick(&self) -> Result<bool, GeoPulseError> {
        let config = self.service.config();
        let ranges_present = config.ranges_path().exists();
        let rates_present = config.rates_path().exists();

        let last_run = match store::load_metadata(&config.metadata_path()).await {
            Ok(metadata) => Some(metadata.last_run),
            Err(e) => {
                log::debug!("no usable refresh metadata: {e:#}");
                None
            }
        };

        let now = Utc::now();
        let period_expired = refresh_due(now, last_run, self.period_minutes, true);
        if ranges_present && rates_present && !period_expired {
            log::debug!("refresh not due");
            return Ok(false);
        }

        // Primary file intact and period still fresh: only an auxiliary file
        // is missing, so hint the refresher to fetch just the absent subset.
        let only_missing = ranges_present && !period_expired;
        log::info!("refresh due (only_missing={only_missing})");

        self.service.refresh(only_missing).await?;

        let metadata = RefreshMetadata {
            last_run: Utc::now(),
        };
        store::save_metadata(&metadata, &config.metadata_path())
            .await
            .map_err(GeoPulseError::RefreshFailed)?;
        self.service.invalidate().await;
        log::info!("refresh completed");
        Ok(true)
    }

    /// Drives ticks until cancelled.
    ///
    /// The first tick fires immediately (initial check at startup). A refresh
    /// in flight when the token is cancelled completes before the loop exits.
    pub async fn run(&self, cancel: CancellationToken) {
        if !self.service.config().auto_refresh {
            log::info!("auto-refresh disabled, scheduler not running");
            return;
        }
        log::info!(
            "freshness scheduler started (period {} min)",
            self.period_minutes
        );
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("freshness scheduler stopped");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        log::error!("scheduled refresh failed: {e:#}");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn minutes_ago(now: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
        Some(now - Duration::minutes(minutes))
    }

    #[test]
    fn test_due_when_file_missing() {
        let now = Utc::now();
        assert!(refresh_due(now, minutes_ago(now, 0), 60, false));
        assert!(refresh_due(now, None, 60, false));
    }

    #[test]
    fn test_not_due_before_period_expires() {
        let now = Utc::now();
        assert!(!refresh_due(now, minutes_ago(now, 59), 60, true));
    }

    #[test]
    fn test_due_after_period_expires() {
        let now = Utc::now();
        assert!(refresh_due(now, minutes_ago(now, 61), 60, true));
        // Boundary: exactly at the period is due
        assert!(refresh_due(now, minutes_ago(now, 60), 60, true));
    }

    #[test]
    fn test_due_without_metadata() {
        assert!(refresh_due(Utc::now(), None, 60, true));
    }

    #[test]
    fn test_epoch_zero_last_run_is_due() {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert!(refresh_due(Utc::now(), Some(epoch), 60, true));
    }
}
