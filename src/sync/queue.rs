//! Offline write buffer.
//!
//! Write operations made while offline are queued as JSON payloads in the
//! `pending_ops` table and replayed in insertion order once connectivity
//! resumes. Queued reviews carry the time the user actually acted, so replay
//! schedules from that moment rather than from the replay time.

use crate::database::db;
use chrono::{DateTime, Local, Utc};
use rusqlite::{params, Connection, Result};
use serde::{Deserialize, Serialize};

/// A buffered write operation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QueuedOp {
    ReviewError {
        error_id: i64,
        success: bool,
        reviewed_at: DateTime<Utc>,
    },
    ReviewNotion {
        notion_id: i64,
        success: bool,
        reviewed_at: DateTime<Utc>,
    },
    AddTestAttempt {
        test_id: i64,
        taken_at: Option<DateTime<Utc>>,
        score: f64,
    },
}

/// Appends an operation to the queue. Returns its queue row id.
pub fn enqueue(conn: &Connection, op: &QueuedOp, queued_at: DateTime<Utc>) -> Result<i64> {
    let payload = serde_json::to_string(op)
        .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
    conn.execute(
        "INSERT INTO pending_ops (queued_at, payload) VALUES (?1, ?2)",
        params![queued_at.timestamp(), payload],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn pending_count(conn: &Connection) -> Result<usize> {
    conn.query_row("SELECT COUNT(*) FROM pending_ops", [], |row| {
        row.get::<_, i64>(0).map(|count| count as usize)
    })
}

/// Replays queued operations oldest-first, deleting each one as it is
/// applied. Stops at the first failure and leaves that op and everything
/// after it queued, so a retry resumes in order. Returns the number applied.
pub fn replay(conn: &Connection) -> Result<usize> {
    let mut stmt = conn.prepare("SELECT id, payload FROM pending_ops ORDER BY id ASC")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>>>()?;
    drop(stmt);

    let mut applied = 0;
    for (row_id, payload) in rows {
        let op: QueuedOp = serde_json::from_str(&payload).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(err))
        })?;
        apply(conn, &op)?;
        conn.execute("DELETE FROM pending_ops WHERE id = ?1", params![row_id])?;
        applied += 1;
    }

    Ok(applied)
}

fn apply(conn: &Connection, op: &QueuedOp) -> Result<()> {
    match op {
        QueuedOp::ReviewError {
            error_id,
            success,
            reviewed_at,
        } => {
            db::record_error_review(conn, *error_id, *success, reviewed_at.with_timezone(&Local))?;
        }
        QueuedOp::ReviewNotion {
            notion_id,
            success,
            reviewed_at,
        } => {
            db::record_notion_review(conn, *notion_id, *success, reviewed_at.with_timezone(&Local))?;
        }
        QueuedOp::AddTestAttempt {
            test_id,
            taken_at,
            score,
        } => {
            db::add_test_attempt(conn, *test_id, *taken_at, *score)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Subtest, TestKind};
    use chrono::TimeZone;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_payload_round_trip() {
        let op = QueuedOp::ReviewError {
            error_id: 7,
            success: true,
            reviewed_at: instant(),
        };
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(serde_json::from_str::<QueuedOp>(&json).unwrap(), op);
    }

    #[test]
    fn test_replay_applies_review_and_drains_queue() {
        let conn = test_conn();
        let local_now = instant().with_timezone(&Local);
        let error_id = db::add_error(
            &conn,
            "u1",
            Subtest::Logique,
            "t",
            "",
            None,
            local_now,
        )
        .unwrap();

        enqueue(
            &conn,
            &QueuedOp::ReviewError {
                error_id,
                success: true,
                reviewed_at: instant(),
            },
            instant(),
        )
        .unwrap();
        assert_eq!(pending_count(&conn).unwrap(), 1);

        let applied = replay(&conn).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(pending_count(&conn).unwrap(), 0);

        let errors = db::get_errors(&conn, "u1").unwrap();
        assert_eq!(errors[0].review.mastery_level, 1);
        assert_eq!(errors[0].review.review_count, 1);
    }

    #[test]
    fn test_replay_preserves_queue_order() {
        let conn = test_conn();
        let local_now = instant().with_timezone(&Local);
        let notion_id = db::add_notion(&conn, "u1", Subtest::Calcul, "t", "", local_now).unwrap();

        // Two successes then a failure: level goes 0 -> 1 -> 2 -> 1
        for success in [true, true, false] {
            enqueue(
                &conn,
                &QueuedOp::ReviewNotion {
                    notion_id,
                    success,
                    reviewed_at: instant(),
                },
                instant(),
            )
            .unwrap();
        }

        assert_eq!(replay(&conn).unwrap(), 3);
        let notions = db::get_notions(&conn, "u1").unwrap();
        assert_eq!(notions[0].review.mastery_level, 1);
        assert_eq!(notions[0].review.review_count, 3);
    }

    #[test]
    fn test_failed_op_stays_queued() {
        let conn = test_conn();
        // References an item that doesn't exist, so replay must fail
        enqueue(
            &conn,
            &QueuedOp::ReviewError {
                error_id: 404,
                success: true,
                reviewed_at: instant(),
            },
            instant(),
        )
        .unwrap();

        assert!(replay(&conn).is_err());
        assert_eq!(pending_count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_queued_attempt_lands_on_test() {
        let conn = test_conn();
        let test_id = db::add_practice_test(
            &conn,
            "u1",
            Subtest::Logique,
            TestKind::Td,
            Some(instant()),
            40.0,
        )
        .unwrap();

        enqueue(
            &conn,
            &QueuedOp::AddTestAttempt {
                test_id,
                taken_at: Some(instant()),
                score: 52.0,
            },
            instant(),
        )
        .unwrap();
        replay(&conn).unwrap();

        let tests = db::get_practice_tests(&conn, "u1").unwrap();
        assert_eq!(tests[0].attempts.len(), 1);
        assert_eq!(tests[0].attempts[0].score, 52.0);
    }
}
