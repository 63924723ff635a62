use serde::{Deserialize, Serialize};

use super::task::{mint_id, now_timestamp};

/// A note attached to a task. Comments are append-only and never edited
/// or removed once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub created_at: String,
}

impl Comment {
    pub fn new(text: String) -> Self {
        Self {
            id: mint_id(),
            text,
            created_at: now_timestamp(),
        }
    }
}
