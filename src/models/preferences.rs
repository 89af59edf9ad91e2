//! Per-user retake scheduling preferences.

use serde::{Deserialize, Serialize};

pub const DEFAULT_RETAKE_INTERVAL_DAYS: i64 = 15;
pub const DEFAULT_SCORE_THRESHOLD_PERCENT: f64 = 90.0;

/// Bounds enforced when the user changes the interval.
pub const MIN_RETAKE_INTERVAL_DAYS: i64 = 1;
pub const MAX_RETAKE_INTERVAL_DAYS: i64 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetakePreference {
    pub interval_days: i64,
    pub score_threshold_percent: f64,
}

impl Default for RetakePreference {
    fn default() -> Self {
        Self {
            interval_days: DEFAULT_RETAKE_INTERVAL_DAYS,
            score_threshold_percent: DEFAULT_SCORE_THRESHOLD_PERCENT,
        }
    }
}

impl RetakePreference {
    /// Builds preferences from stored columns, falling back per field when a
    /// value is missing or invalid (non-positive interval, threshold outside
    /// (0, 100]). The read path never fails.
    pub fn from_stored(interval_days: Option<i64>, score_threshold_percent: Option<f64>) -> Self {
        let defaults = Self::default();
        Self {
            interval_days: interval_days
                .filter(|&days| days > 0)
                .unwrap_or(defaults.interval_days),
            score_threshold_percent: score_threshold_percent
                .filter(|&pct| pct > 0.0 && pct <= 100.0)
                .unwrap_or(defaults.score_threshold_percent),
        }
    }

    /// Normalizes user input before persisting: interval clamped to [1, 60].
    pub fn clamped(self) -> Self {
        Self {
            interval_days: self
                .interval_days
                .clamp(MIN_RETAKE_INTERVAL_DAYS, MAX_RETAKE_INTERVAL_DAYS),
            score_threshold_percent: self.score_threshold_percent.clamp(0.0, 100.0),
        }
    }
}
