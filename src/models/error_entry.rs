//! A logged mistake from a practice session, scheduled for review.
use super::{ReviewState, Subtest};
use crate::models::review_state::Reviewable;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub id: i64,
    pub user_id: String,
    pub subtest: Subtest,
    pub title: String,
    pub explanation: String,
    /// Reference to an uploaded screenshot of the question, if any.
    pub image_path: Option<String>,
    pub review: ReviewState,
}

impl Reviewable for ErrorEntry {
    fn review_state(&self) -> &ReviewState {
        &self.review
    }
}
