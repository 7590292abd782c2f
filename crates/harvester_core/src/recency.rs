use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Rolling recency horizon. The cutoff is derived from `now` on every call so
/// long runs age records out as they go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyWindow {
    window: Duration,
}

impl RecencyWindow {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Saturates instead of overflowing on absurd hour counts.
    pub fn from_hours(hours: u64) -> Self {
        Self::new(Duration::from_secs(hours.saturating_mul(3600)))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let delta = TimeDelta::from_std(self.window).unwrap_or(TimeDelta::MAX);
        now.checked_sub_signed(delta)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self::from_hours(24)
    }
}

/// `Fresh` iff `timestamp >= cutoff`.
pub fn classify(timestamp: DateTime<Utc>, cutoff: DateTime<Utc>) -> Freshness {
    if timestamp >= cutoff {
        Freshness::Fresh
    } else {
        Freshness::Stale
    }
}
