//! Database operations for the study tracker.
//!
//! Handles SQLite initialization and CRUD for errors, notions, practice
//! tests, full tests, review events, and retake preferences. Timestamps are
//! stored as unix seconds in INTEGER columns.

use crate::models::mastery::{self, ScheduledReview};
use crate::models::{
    ErrorEntry, FullTest, ItemKind, Notion, PracticeTest, RetakePreference, ReviewEvent,
    ReviewState, Subtest, TestAttempt, TestKind,
};
use chrono::{DateTime, Local, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

/// Opens (or creates) the database at `path` and ensures the schema exists.
pub fn open_database(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Creates all tables if they don't exist. Idempotent.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS errors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            subtest TEXT NOT NULL,
            title TEXT NOT NULL,
            explanation TEXT NOT NULL DEFAULT '',
            image_path TEXT,
            mastery_level INTEGER NOT NULL DEFAULT 0,
            review_count INTEGER NOT NULL DEFAULT 0,
            last_reviewed_at INTEGER,
            next_review_at INTEGER
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS notions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            subtest TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            mastery_level INTEGER NOT NULL DEFAULT 0,
            review_count INTEGER NOT NULL DEFAULT 0,
            last_reviewed_at INTEGER,
            next_review_at INTEGER
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_kind TEXT NOT NULL,
            item_id INTEGER NOT NULL,
            success INTEGER NOT NULL,
            new_mastery_level INTEGER NOT NULL,
            interval_days INTEGER NOT NULL,
            reviewed_at INTEGER NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS practice_tests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            subtest TEXT NOT NULL,
            kind TEXT NOT NULL,
            taken_at INTEGER,
            score REAL NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS test_attempts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            test_id INTEGER NOT NULL,
            taken_at INTEGER,
            score REAL NOT NULL,
            FOREIGN KEY (test_id) REFERENCES practice_tests(id) ON DELETE CASCADE
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS full_tests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            taken_at INTEGER,
            correct_comprehension INTEGER NOT NULL DEFAULT 0,
            correct_calcul INTEGER NOT NULL DEFAULT 0,
            correct_raisonnement INTEGER NOT NULL DEFAULT 0,
            correct_conditions INTEGER NOT NULL DEFAULT 0,
            correct_expression INTEGER NOT NULL DEFAULT 0,
            correct_logique INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS full_test_attempts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_test_id INTEGER NOT NULL,
            taken_at INTEGER,
            score REAL NOT NULL,
            FOREIGN KEY (full_test_id) REFERENCES full_tests(id) ON DELETE CASCADE
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            user_id TEXT PRIMARY KEY,
            interval_days INTEGER,
            score_threshold REAL
        )",
        (),
    )?;

    // Offline write buffer, drained by the sync module
    conn.execute(
        "CREATE TABLE IF NOT EXISTS pending_ops (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            queued_at INTEGER NOT NULL,
            payload TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn to_ts(date: DateTime<Utc>) -> i64 {
    date.timestamp()
}

fn from_ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

fn level_from_row(value: i64) -> u8 {
    value.clamp(0, mastery::MAX_MASTERY_LEVEL as i64) as u8
}

/// Inserts a new error with review state initialized at level 0
/// (first review scheduled one interval out).
pub fn add_error(
    conn: &Connection,
    user_id: &str,
    subtest: Subtest,
    title: &str,
    explanation: &str,
    image_path: Option<&str>,
    now: DateTime<Local>,
) -> Result<i64> {
    let state = ReviewState::new(now);
    conn.execute(
        "INSERT INTO errors (user_id, subtest, title, explanation, image_path,
                             mastery_level, review_count, next_review_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6)",
        params![
            user_id,
            subtest,
            title,
            explanation,
            image_path,
            state.next_review_at.map(to_ts)
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Inserts a new notion, same review-state initialization as errors.
pub fn add_notion(
    conn: &Connection,
    user_id: &str,
    subtest: Subtest,
    title: &str,
    content: &str,
    now: DateTime<Local>,
) -> Result<i64> {
    let state = ReviewState::new(now);
    conn.execute(
        "INSERT INTO notions (user_id, subtest, title, content,
                              mastery_level, review_count, next_review_at)
         VALUES (?1, ?2, ?3, ?4, 0, 0, ?5)",
        params![
            user_id,
            subtest,
            title,
            content,
            state.next_review_at.map(to_ts)
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn review_state_from_row(
    level: i64,
    count: i64,
    last: Option<i64>,
    next: Option<i64>,
) -> ReviewState {
    ReviewState {
        mastery_level: level_from_row(level),
        review_count: count.max(0) as u32,
        last_reviewed_at: last.map(from_ts),
        next_review_at: next.map(from_ts),
    }
}

/// All errors for a user, soonest review first (unscheduled rows first).
pub fn get_errors(conn: &Connection, user_id: &str) -> Result<Vec<ErrorEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, subtest, title, explanation, image_path,
                mastery_level, review_count, last_reviewed_at, next_review_at
         FROM errors WHERE user_id = ?1
         ORDER BY next_review_at IS NOT NULL, next_review_at ASC",
    )?;

    let errors = stmt
        .query_map(params![user_id], |row| {
            Ok(ErrorEntry {
                id: row.get(0)?,
                user_id: user_id.to_string(),
                subtest: row.get(1)?,
                title: row.get(2)?,
                explanation: row.get(3)?,
                image_path: row.get(4)?,
                review: review_state_from_row(
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                ),
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(errors)
}

/// All notions for a user, soonest review first.
pub fn get_notions(conn: &Connection, user_id: &str) -> Result<Vec<Notion>> {
    let mut stmt = conn.prepare(
        "SELECT id, subtest, title, content,
                mastery_level, review_count, last_reviewed_at, next_review_at
         FROM notions WHERE user_id = ?1
         ORDER BY next_review_at IS NOT NULL, next_review_at ASC",
    )?;

    let notions = stmt
        .query_map(params![user_id], |row| {
            Ok(Notion {
                id: row.get(0)?,
                user_id: user_id.to_string(),
                subtest: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                review: review_state_from_row(
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ),
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(notions)
}

pub fn record_error_review(
    conn: &Connection,
    error_id: i64,
    success: bool,
    now: DateTime<Local>,
) -> Result<ScheduledReview> {
    record_review(conn, ItemKind::Error, error_id, success, now)
}

pub fn record_notion_review(
    conn: &Connection,
    notion_id: i64,
    success: bool,
    now: DateTime<Local>,
) -> Result<ScheduledReview> {
    record_review(conn, ItemKind::Notion, notion_id, success, now)
}

/// Applies one review outcome: steps the item's mastery level, reschedules
/// it, and appends an audit event.
///
/// The item update and the event append are two separate statements with no
/// transaction around them; a crash in between leaves the audit trail one
/// event short. Accepted gap for a single-user tool.
fn record_review(
    conn: &Connection,
    kind: ItemKind,
    item_id: i64,
    success: bool,
    now: DateTime<Local>,
) -> Result<ScheduledReview> {
    let table = match kind {
        ItemKind::Error => "errors",
        ItemKind::Notion => "notions",
    };

    let current_level: i64 = conn.query_row(
        &format!("SELECT mastery_level FROM {table} WHERE id = ?1"),
        params![item_id],
        |row| row.get(0),
    )?;

    let scheduled = mastery::schedule_review(level_from_row(current_level), success, now);
    let now_utc = now.with_timezone(&Utc);

    conn.execute(
        &format!(
            "UPDATE {table}
             SET mastery_level = ?1, review_count = review_count + 1,
                 last_reviewed_at = ?2, next_review_at = ?3
             WHERE id = ?4"
        ),
        params![
            scheduled.new_level,
            to_ts(now_utc),
            to_ts(scheduled.next_review_at.with_timezone(&Utc)),
            item_id
        ],
    )?;

    conn.execute(
        "INSERT INTO review_events (item_kind, item_id, success, new_mastery_level, interval_days, reviewed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            kind.as_str(),
            item_id,
            success,
            scheduled.new_level,
            scheduled.interval_days,
            to_ts(now_utc)
        ],
    )?;

    Ok(scheduled)
}

/// Review history for one item, oldest first.
pub fn get_review_events(
    conn: &Connection,
    kind: ItemKind,
    item_id: i64,
) -> Result<Vec<ReviewEvent>> {
    let mut stmt = conn.prepare(
        "SELECT success, new_mastery_level, interval_days, reviewed_at
         FROM review_events WHERE item_kind = ?1 AND item_id = ?2
         ORDER BY reviewed_at ASC, id ASC",
    )?;

    let events = stmt
        .query_map(params![kind.as_str(), item_id], |row| {
            Ok(ReviewEvent {
                item_kind: kind,
                item_id,
                success: row.get(0)?,
                new_mastery_level: level_from_row(row.get(1)?),
                interval_days: row.get(2)?,
                reviewed_at: from_ts(row.get(3)?),
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(events)
}

pub fn add_practice_test(
    conn: &Connection,
    user_id: &str,
    subtest: Subtest,
    kind: TestKind,
    taken_at: Option<DateTime<Utc>>,
    score: f64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO practice_tests (user_id, subtest, kind, taken_at, score)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, subtest, kind, taken_at.map(to_ts), score],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn add_test_attempt(
    conn: &Connection,
    test_id: i64,
    taken_at: Option<DateTime<Utc>>,
    score: f64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO test_attempts (test_id, taken_at, score) VALUES (?1, ?2, ?3)",
        params![test_id, taken_at.map(to_ts), score],
    )?;
    Ok(())
}

fn get_attempts(conn: &Connection, table: &str, fk: &str, id: i64) -> Result<Vec<TestAttempt>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT taken_at, score FROM {table} WHERE {fk} = ?1
         ORDER BY taken_at DESC"
    ))?;

    let attempts = stmt
        .query_map(params![id], |row| {
            Ok(TestAttempt {
                taken_at: row.get::<_, Option<i64>>(0)?.map(from_ts),
                score: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(attempts)
}

/// All practice tests for a user with attempts loaded, newest test first.
pub fn get_practice_tests(conn: &Connection, user_id: &str) -> Result<Vec<PracticeTest>> {
    let mut stmt = conn.prepare(
        "SELECT id, subtest, kind, taken_at, score
         FROM practice_tests WHERE user_id = ?1
         ORDER BY taken_at DESC",
    )?;

    let mut tests = stmt
        .query_map(params![user_id], |row| {
            Ok(PracticeTest {
                id: row.get(0)?,
                user_id: user_id.to_string(),
                subtest: row.get(1)?,
                kind: row.get(2)?,
                taken_at: row.get::<_, Option<i64>>(3)?.map(from_ts),
                score: row.get(4)?,
                attempts: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    for test in &mut tests {
        test.attempts = get_attempts(conn, "test_attempts", "test_id", test.id)?;
    }

    Ok(tests)
}

pub fn add_full_test(
    conn: &Connection,
    user_id: &str,
    taken_at: Option<DateTime<Utc>>,
    correct_counts: [u32; 6],
) -> Result<i64> {
    conn.execute(
        "INSERT INTO full_tests (user_id, taken_at,
            correct_comprehension, correct_calcul, correct_raisonnement,
            correct_conditions, correct_expression, correct_logique)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user_id,
            taken_at.map(to_ts),
            correct_counts[0],
            correct_counts[1],
            correct_counts[2],
            correct_counts[3],
            correct_counts[4],
            correct_counts[5]
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn add_full_test_attempt(
    conn: &Connection,
    full_test_id: i64,
    taken_at: Option<DateTime<Utc>>,
    score: f64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO full_test_attempts (full_test_id, taken_at, score) VALUES (?1, ?2, ?3)",
        params![full_test_id, taken_at.map(to_ts), score],
    )?;
    Ok(())
}

/// All full tests for a user with attempts loaded, newest first.
pub fn get_full_tests(conn: &Connection, user_id: &str) -> Result<Vec<FullTest>> {
    let mut stmt = conn.prepare(
        "SELECT id, taken_at,
                correct_comprehension, correct_calcul, correct_raisonnement,
                correct_conditions, correct_expression, correct_logique
         FROM full_tests WHERE user_id = ?1
         ORDER BY taken_at DESC",
    )?;

    let mut tests = stmt
        .query_map(params![user_id], |row| {
            let mut correct_counts = [0u32; 6];
            for (offset, count) in correct_counts.iter_mut().enumerate() {
                *count = row.get::<_, i64>(2 + offset)?.max(0) as u32;
            }
            Ok(FullTest {
                id: row.get(0)?,
                user_id: user_id.to_string(),
                taken_at: row.get::<_, Option<i64>>(1)?.map(from_ts),
                correct_counts,
                attempts: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    for test in &mut tests {
        test.attempts = get_attempts(conn, "full_test_attempts", "full_test_id", test.id)?;
    }

    Ok(tests)
}

/// Reads a user's retake preferences. Never fails: a missing row, a storage
/// error, or invalid stored values all fall back to the defaults.
pub fn get_preferences(conn: &Connection, user_id: &str) -> RetakePreference {
    let stored = conn
        .query_row(
            "SELECT interval_days, score_threshold FROM preferences WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                ))
            },
        )
        .optional();

    match stored {
        Ok(Some((interval, threshold))) => RetakePreference::from_stored(interval, threshold),
        _ => RetakePreference::default(),
    }
}

/// Persists preferences, clamping the interval to its allowed range first.
pub fn set_preferences(conn: &Connection, user_id: &str, prefs: RetakePreference) -> Result<()> {
    let prefs = prefs.clamped();
    conn.execute(
        "INSERT OR REPLACE INTO preferences (user_id, interval_days, score_threshold)
         VALUES (?1, ?2, ?3)",
        params![user_id, prefs.interval_days, prefs.score_threshold_percent],
    )?;
    Ok(())
}
