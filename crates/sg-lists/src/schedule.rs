//! Refresh frequency policy.
//!
//! A periodic timer tick asks the schedule whether a refresh is due; the
//! threshold comparison, not the tick period, decides. The timestamp
//! advances after every attempted refresh - including partial failures -
//! so a failing source is retried on the next tick, not in a tight loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Update Frequency
// =============================================================================

/// User-configurable refresh cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl UpdateFrequency {
    /// Hours that must elapse before a scheduled refresh runs.
    pub fn threshold_hours(&self) -> i64 {
        match self {
            Self::Daily => 24,
            Self::Weekly => 168,
            Self::Monthly => 720,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

// =============================================================================
// Refresh Schedule
// =============================================================================

/// Tracks when the lists were last refreshed and whether another refresh
/// is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSchedule {
    pub frequency: UpdateFrequency,
    pub last_refresh_at: Option<DateTime<Utc>>,
}

impl RefreshSchedule {
    pub fn new(frequency: UpdateFrequency) -> Self {
        Self {
            frequency,
            last_refresh_at: None,
        }
    }

    /// True when enough time has elapsed for a scheduled refresh. A
    /// never-refreshed schedule is always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_refresh_at {
            None => true,
            Some(last) => {
                let elapsed_hours = now.signed_duration_since(last).num_hours();
                elapsed_hours >= self.frequency.threshold_hours()
            }
        }
    }

    /// Record that a refresh was attempted, successful or not.
    pub fn mark_attempted(&mut self, now: DateTime<Utc>) {
        self.last_refresh_at = Some(now);
    }
}
