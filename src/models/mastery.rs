//! Mastery-level spaced repetition scheduling.
//!
//! Simpler than SM-2: no per-item ease factor. Each reviewable item carries a
//! mastery level 0-5, and the level alone picks the next review interval from
//! a fixed table:
//! - Success moves the level up one step (capped at 5)
//! - Failure moves it down one step (floored at 0)
//! - Intervals grow from 1 day (level 0) to 90 days (level 5)

use chrono::{DateTime, Days, Duration, Local};

/// Review interval in days for each mastery level 0..=5.
/// Single canonical table; display code reads it from here too.
pub const MASTERY_INTERVALS: [i64; 6] = [1, 3, 7, 14, 30, 90];

/// Highest reachable mastery level.
pub const MAX_MASTERY_LEVEL: u8 = 5;

/// Result of scheduling one review action.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledReview {
    pub new_level: u8,
    pub next_review_at: DateTime<Local>,
    pub interval_days: i64,
}

/// Returns the review interval for a mastery level.
/// Total over its input: out-of-range levels are clamped to the last entry.
pub fn next_interval_days(level: u8) -> i64 {
    MASTERY_INTERVALS[level.min(MAX_MASTERY_LEVEL) as usize]
}

/// Computes the next review date: `base` plus the level's interval in local
/// calendar days, keeping the time-of-day of `base` even across DST
/// transitions (no normalization to midnight). Retake scheduling deliberately
/// uses UTC day arithmetic instead.
pub fn compute_next_review_date(level: u8, base: DateTime<Local>) -> DateTime<Local> {
    let interval = next_interval_days(level);
    base.checked_add_days(Days::new(interval as u64))
        // Target wall-clock time doesn't exist locally (DST gap): exact span
        .unwrap_or_else(|| base + Duration::days(interval))
}

/// Moves the mastery level one step up (success) or down (failure),
/// clamped to 0..=5. Step size is always exactly 1.
pub fn update_mastery_level(current: u8, success: bool) -> u8 {
    let level = current.min(MAX_MASTERY_LEVEL);
    if success {
        (level + 1).min(MAX_MASTERY_LEVEL)
    } else {
        level.saturating_sub(1)
    }
}

/// Composes a full review action: new level, its interval, and the next
/// review date computed from `now`. Persisting the result and appending the
/// audit event is the caller's job (two writes, deliberately untransacted).
pub fn schedule_review(current_level: u8, success: bool, now: DateTime<Local>) -> ScheduledReview {
    let new_level = update_mastery_level(current_level, success);
    ScheduledReview {
        new_level,
        next_review_at: compute_next_review_date(new_level, now),
        interval_days: next_interval_days(new_level),
    }
}
