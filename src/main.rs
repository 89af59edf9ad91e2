use tracker_app::*;

use chrono::{Duration, Local, Utc};
use database::db;
use models::retake::{self, RetakeStatus};
use models::review_state::split_due;
use rusqlite::Connection;

const DEFAULT_USER: &str = "local";

fn main() {
    let conn = db::open_database("db.sqlite3").expect("Failed to initialize database");

    if db::get_errors(&conn, DEFAULT_USER)
        .unwrap_or_default()
        .is_empty()
    {
        seed_sample_data(&conn);
        println!("Sample data created!");
    }

    print_review_queue(&conn);
    print_retake_queue(&conn);
}

fn seed_sample_data(conn: &Connection) {
    let now = Local::now();

    let _ = db::add_error(
        conn,
        DEFAULT_USER,
        Subtest::Calcul,
        "Pourcentages successifs",
        "Applied +20% then -20% as a net zero",
        None,
        now,
    );
    let _ = db::add_notion(
        conn,
        DEFAULT_USER,
        Subtest::Logique,
        "Suites alphanumériques",
        "Read both interleaved sequences separately",
        now,
    );
    let _ = db::add_practice_test(
        conn,
        DEFAULT_USER,
        Subtest::Logique,
        TestKind::Td,
        Some(Utc::now() - Duration::days(20)),
        42.0,
    );
}

fn print_review_queue(conn: &Connection) {
    let reference = Utc::now();
    let errors = db::get_errors(conn, DEFAULT_USER).unwrap_or_default();
    let notions = db::get_notions(conn, DEFAULT_USER).unwrap_or_default();

    let mastered = errors.iter().filter(|e| e.review.is_mastered()).count()
        + notions.iter().filter(|n| n.review.is_mastered()).count();

    let (due_errors, upcoming_errors) = split_due(errors, reference);
    let (due_notions, upcoming_notions) = split_due(notions, reference);

    println!(
        "Reviews: {} due ({} errors, {} notions), {} upcoming, {} mastered",
        due_errors.len() + due_notions.len(),
        due_errors.len(),
        due_notions.len(),
        upcoming_errors.len() + upcoming_notions.len(),
        mastered
    );
    for error in &due_errors {
        println!("  - [{}] {}", error.subtest.label(), error.title);
    }
    for notion in &due_notions {
        println!("  - [{}] {}", notion.subtest.label(), notion.title);
    }
}

fn print_retake_queue(conn: &Connection) {
    let reference = Utc::now();
    let prefs = db::get_preferences(conn, DEFAULT_USER);
    let tests = db::get_practice_tests(conn, DEFAULT_USER).unwrap_or_default();
    let full_tests = db::get_full_tests(conn, DEFAULT_USER).unwrap_or_default();

    println!(
        "Retakes (every {} days, target {}%):",
        prefs.interval_days, prefs.score_threshold_percent
    );
    for test in &tests {
        match retake::classify_retake(test, &prefs, reference) {
            RetakeStatus::Due => {
                println!("  - {} TD: retake now", test.subtest.label());
            }
            RetakeStatus::Upcoming => {
                if let Some(next) = retake::next_retake_date(test, prefs.interval_days) {
                    println!(
                        "  - {} TD: retake on {}",
                        test.subtest.label(),
                        next.format("%Y-%m-%d")
                    );
                }
            }
            RetakeStatus::Retired => {}
        }
    }
    for test in &full_tests {
        match retake::classify_retake(test, &prefs, reference) {
            RetakeStatus::Due => {
                println!("  - Full test ({:.0}/600): retake now", test.total_score());
            }
            RetakeStatus::Upcoming => {
                if let Some(next) = retake::next_retake_date(test, prefs.interval_days) {
                    println!(
                        "  - Full test ({:.0}/600): retake on {}",
                        test.total_score(),
                        next.format("%Y-%m-%d")
                    );
                }
            }
            RetakeStatus::Retired => {}
        }
    }
}
