//! Per-item review scheduling state and due/upcoming classification.

use super::mastery::{self, ScheduledReview};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Scheduling state embedded in every reviewable item (error or notion).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewState {
    pub mastery_level: u8,
    pub review_count: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub next_review_at: Option<DateTime<Utc>>,
}

impl ReviewState {
    /// State for a freshly created item: level 0, scheduled one interval out.
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            mastery_level: 0,
            review_count: 0,
            last_reviewed_at: None,
            next_review_at: Some(mastery::compute_next_review_date(0, now).with_timezone(&Utc)),
        }
    }

    /// Applies one review outcome: steps the mastery level, reschedules, and
    /// increments the review counter. Returns the computed schedule so the
    /// caller can append the audit event.
    pub fn apply(&mut self, success: bool, now: DateTime<Local>) -> ScheduledReview {
        let scheduled = mastery::schedule_review(self.mastery_level, success, now);
        self.mastery_level = scheduled.new_level;
        self.review_count += 1;
        self.last_reviewed_at = Some(now.with_timezone(&Utc));
        self.next_review_at = Some(scheduled.next_review_at.with_timezone(&Utc));
        scheduled
    }

    pub fn is_due(&self, reference: DateTime<Utc>) -> bool {
        is_due_for_review(self.next_review_at, reference)
    }

    pub fn is_mastered(&self) -> bool {
        is_mastered(self.mastery_level)
    }
}

/// An item with no scheduled date is always due (fail-open: unscheduled items
/// surface immediately instead of being hidden). Otherwise due iff the
/// scheduled date has been reached, boundary inclusive.
pub fn is_due_for_review(next_review_at: Option<DateTime<Utc>>, reference: DateTime<Utc>) -> bool {
    match next_review_at {
        None => true,
        Some(next) => next <= reference,
    }
}

/// Mastered is level >= 4, independent of due-ness; a mastered item whose
/// date has passed is both mastered and due.
pub fn is_mastered(mastery_level: u8) -> bool {
    mastery_level >= 4
}

/// Anything carrying a [`ReviewState`]; lets listing code partition errors
/// and notions with the same helper.
pub trait Reviewable {
    fn review_state(&self) -> &ReviewState;
}

/// Splits items into (due, upcoming) buckets against `reference`. Computed at
/// read time against the wall clock; never pre-materialized.
pub fn split_due<T: Reviewable>(items: Vec<T>, reference: DateTime<Utc>) -> (Vec<T>, Vec<T>) {
    items
        .into_iter()
        .partition(|item| item.review_state().is_due(reference))
}
