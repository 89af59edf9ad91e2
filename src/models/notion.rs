//! A concept note (flashcard-like), scheduled for review exactly like errors.
use super::{ReviewState, Subtest};
use crate::models::review_state::Reviewable;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notion {
    pub id: i64,
    pub user_id: String,
    pub subtest: Subtest,
    pub title: String,
    pub content: String,
    pub review: ReviewState,
}

impl Reviewable for Notion {
    fn review_state(&self) -> &ReviewState {
        &self.review
    }
}
