//! Append-only audit trail of review actions.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which entity table a review event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Error,
    Notion,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Error => "error",
            ItemKind::Notion => "notion",
        }
    }
}

/// One recorded review outcome. Written once, never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub item_kind: ItemKind,
    pub item_id: i64,
    pub success: bool,
    pub new_mastery_level: u8,
    pub interval_days: i64,
    pub reviewed_at: DateTime<Utc>,
}
