//! Retake scheduling for completed practice tests.
//!
//! Two signals, evaluated in strict precedence:
//! 1. Eligibility gate: only TD tests on retake-eligible subtests (and full
//!    tests, always) are ever scheduled.
//! 2. Score signal, once the test has been retaken at least once: a latest
//!    attempt under the user's threshold is due immediately; at or above it,
//!    the test leaves the rotation for good.
//! 3. Date signal, before the first retake: due once the user's interval has
//!    elapsed since the latest known completion date, upcoming before that.
//!
//! The interval therefore only governs the first retake; after that the
//! score threshold decides everything.

use super::full_test::{FullTest, FULL_TEST_MAX_SCORE};
use super::practice_test::{PracticeTest, TestAttempt, TestKind, TD_MAX_SCORE};
use super::preferences::RetakePreference;
use chrono::{DateTime, Duration, Utc};

/// Classification of one test against the retake policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetakeStatus {
    /// Should be retaken now.
    Due,
    /// Scheduled for a future date.
    Upcoming,
    /// Out of the rotation: ineligible, passed, or undatable.
    Retired,
}

/// A test the retake policy can classify. Implemented by per-subtest
/// practice tests and by full tests; the policy itself is shared.
pub trait RetakeTarget {
    fn is_retake_eligible(&self) -> bool;
    fn max_score(&self) -> f64;
    fn latest_attempt(&self) -> Option<&TestAttempt>;
    fn latest_date(&self) -> Option<DateTime<Utc>>;
}

impl RetakeTarget for PracticeTest {
    fn is_retake_eligible(&self) -> bool {
        self.kind == TestKind::Td && self.subtest.is_retake_eligible()
    }

    fn max_score(&self) -> f64 {
        TD_MAX_SCORE
    }

    fn latest_attempt(&self) -> Option<&TestAttempt> {
        PracticeTest::latest_attempt(self)
    }

    fn latest_date(&self) -> Option<DateTime<Utc>> {
        PracticeTest::latest_date(self)
    }
}

impl RetakeTarget for FullTest {
    /// Full tests always pass the gate.
    fn is_retake_eligible(&self) -> bool {
        true
    }

    fn max_score(&self) -> f64 {
        FULL_TEST_MAX_SCORE
    }

    fn latest_attempt(&self) -> Option<&TestAttempt> {
        FullTest::latest_attempt(self)
    }

    fn latest_date(&self) -> Option<DateTime<Utc>> {
        FullTest::latest_date(self)
    }
}

/// Applies the gate, score, and date signals in precedence order.
pub fn classify_retake<T: RetakeTarget>(
    test: &T,
    prefs: &RetakePreference,
    reference: DateTime<Utc>,
) -> RetakeStatus {
    if !test.is_retake_eligible() {
        return RetakeStatus::Retired;
    }

    if let Some(attempt) = test.latest_attempt() {
        let percentage = attempt.score / test.max_score() * 100.0;
        return if percentage < prefs.score_threshold_percent {
            // A weak retake is immediately actionable, never deferred
            RetakeStatus::Due
        } else {
            RetakeStatus::Retired
        };
    }

    match compute_next_retake_date(test.latest_date(), prefs.interval_days) {
        Some(next) if next <= reference => RetakeStatus::Due,
        Some(_) => RetakeStatus::Upcoming,
        None => RetakeStatus::Retired,
    }
}

pub fn is_test_due_for_retake<T: RetakeTarget>(
    test: &T,
    prefs: &RetakePreference,
    reference: DateTime<Utc>,
) -> bool {
    classify_retake(test, prefs, reference) == RetakeStatus::Due
}

pub fn is_test_upcoming_retake<T: RetakeTarget>(
    test: &T,
    prefs: &RetakePreference,
    reference: DateTime<Utc>,
) -> bool {
    classify_retake(test, prefs, reference) == RetakeStatus::Upcoming
}

/// Base date plus the interval, in UTC day arithmetic. None on a missing
/// base date or a non-positive interval. Mastery review scheduling uses
/// local calendar days instead; the two are deliberately not unified.
pub fn compute_next_retake_date(
    base: Option<DateTime<Utc>>,
    interval_days: i64,
) -> Option<DateTime<Utc>> {
    if interval_days <= 0 {
        return None;
    }
    base.map(|date| date + Duration::days(interval_days))
}

/// Next retake date for a test, from its latest known completion date.
pub fn next_retake_date<T: RetakeTarget>(test: &T, interval_days: i64) -> Option<DateTime<Utc>> {
    compute_next_retake_date(test.latest_date(), interval_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Subtest;
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 21, 18, 0, 0).unwrap()
    }

    fn td(subtest: Subtest, kind: TestKind, days_ago: i64) -> PracticeTest {
        PracticeTest {
            id: 1,
            user_id: "u1".to_string(),
            subtest,
            kind,
            taken_at: Some(reference() - Duration::days(days_ago)),
            score: 40.0,
            attempts: Vec::new(),
        }
    }

    fn attempt(days_ago: i64, score: f64) -> TestAttempt {
        TestAttempt {
            taken_at: Some(reference() - Duration::days(days_ago)),
            score,
        }
    }

    fn prefs() -> RetakePreference {
        RetakePreference::default() // 15 days, 90%
    }

    #[test]
    fn test_eligible_td_past_interval_is_due() {
        let test = td(Subtest::Logique, TestKind::Td, 20);
        assert!(is_test_due_for_retake(&test, &prefs(), reference()));
        assert!(!is_test_upcoming_retake(&test, &prefs(), reference()));
    }

    #[test]
    fn test_eligible_td_within_interval_is_upcoming() {
        let test = td(Subtest::Calcul, TestKind::Td, 5);
        assert!(!is_test_due_for_retake(&test, &prefs(), reference()));
        assert!(is_test_upcoming_retake(&test, &prefs(), reference()));
    }

    #[test]
    fn test_interval_boundary_is_inclusive() {
        let test = td(Subtest::Logique, TestKind::Td, 15);
        assert!(is_test_due_for_retake(&test, &prefs(), reference()));
    }

    #[test]
    fn test_ineligible_subtest_never_surfaces() {
        let test = td(Subtest::Expression, TestKind::Td, 200);
        assert_eq!(classify_retake(&test, &prefs(), reference()), RetakeStatus::Retired);
    }

    #[test]
    fn test_blanc_never_surfaces_via_td_path() {
        let test = td(Subtest::Logique, TestKind::Blanc, 200);
        assert_eq!(classify_retake(&test, &prefs(), reference()), RetakeStatus::Retired);
    }

    #[test]
    fn test_weak_attempt_is_due_regardless_of_elapsed_time() {
        // 50/60 = 83% < 90% threshold; attempted yesterday
        let mut test = td(Subtest::Logique, TestKind::Td, 20);
        test.attempts.push(attempt(1, 50.0));
        assert!(is_test_due_for_retake(&test, &prefs(), reference()));
        assert!(!is_test_upcoming_retake(&test, &prefs(), reference()));
    }

    #[test]
    fn test_passing_attempt_retires_the_test() {
        // 57/60 = 95% >= 90% threshold
        let mut test = td(Subtest::Logique, TestKind::Td, 20);
        test.attempts.push(attempt(1, 57.0));
        assert_eq!(classify_retake(&test, &prefs(), reference()), RetakeStatus::Retired);
    }

    #[test]
    fn test_score_signal_uses_most_recent_attempt() {
        let mut test = td(Subtest::Logique, TestKind::Td, 30);
        test.attempts.push(attempt(10, 57.0)); // old pass
        test.attempts.push(attempt(2, 40.0)); // recent fail
        assert!(is_test_due_for_retake(&test, &prefs(), reference()));
    }

    #[test]
    fn test_dateless_test_without_attempts_is_retired() {
        let mut test = td(Subtest::Logique, TestKind::Td, 20);
        test.taken_at = None;
        assert_eq!(classify_retake(&test, &prefs(), reference()), RetakeStatus::Retired);
    }

    #[test]
    fn test_full_test_bypasses_subtest_gate() {
        let full = FullTest {
            id: 1,
            user_id: "u1".to_string(),
            taken_at: Some(reference() - Duration::days(20)),
            correct_counts: [10; 6],
            attempts: Vec::new(),
        };
        assert!(is_test_due_for_retake(&full, &prefs(), reference()));
    }

    #[test]
    fn test_full_test_within_interval_is_upcoming() {
        let full = FullTest {
            id: 1,
            user_id: "u1".to_string(),
            taken_at: Some(reference() - Duration::days(5)),
            correct_counts: [10; 6],
            attempts: Vec::new(),
        };
        assert!(!is_test_due_for_retake(&full, &prefs(), reference()));
        assert!(is_test_upcoming_retake(&full, &prefs(), reference()));
    }

    #[test]
    fn test_full_test_attempt_scored_against_600() {
        let mut full = FullTest {
            id: 1,
            user_id: "u1".to_string(),
            taken_at: Some(reference() - Duration::days(20)),
            correct_counts: [10; 6],
            attempts: Vec::new(),
        };
        // 560/600 = 93% passes the default threshold
        full.attempts.push(attempt(1, 560.0));
        assert_eq!(classify_retake(&full, &prefs(), reference()), RetakeStatus::Retired);

        // 500/600 = 83% does not
        full.attempts.push(attempt(0, 500.0));
        assert!(is_test_due_for_retake(&full, &prefs(), reference()));
    }

    #[test]
    fn test_compute_next_retake_date() {
        let base = reference();
        assert_eq!(
            compute_next_retake_date(Some(base), 15),
            Some(base + Duration::days(15))
        );
        assert_eq!(compute_next_retake_date(None, 15), None);
        assert_eq!(compute_next_retake_date(Some(base), 0), None);
        assert_eq!(compute_next_retake_date(Some(base), -3), None);
    }

    #[test]
    fn test_next_retake_date_uses_latest_known_date() {
        let mut test = td(Subtest::Logique, TestKind::Td, 20);
        test.attempts.push(attempt(4, 40.0));
        assert_eq!(
            next_retake_date(&test, 15),
            Some(reference() - Duration::days(4) + Duration::days(15))
        );
    }
}
