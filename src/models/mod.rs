pub mod error_entry;
pub mod mastery;
pub mod notion;
pub mod preferences;
pub mod retake;
pub mod review_event;
pub mod review_state;
pub mod subtest;

pub use error_entry::ErrorEntry;
pub use full_test::FullTest;
pub use notion::Notion;
pub use practice_test::{PracticeTest, TestAttempt, TestKind};
pub use preferences::RetakePreference;
pub use review_event::{ItemKind, ReviewEvent};
pub use review_state::ReviewState;
pub use subtest::Subtest;
