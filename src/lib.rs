pub mod database;
pub mod export;
pub mod models;
pub mod sync;

pub use models::{
    ErrorEntry, FullTest, Notion, PracticeTest, RetakePreference, ReviewState, Subtest,
    TestAttempt, TestKind,
};
