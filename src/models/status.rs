use serde::{Deserialize, Serialize};

/// Workflow state of a task. Wire names are camelCase to match the
/// persisted document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl Status {
    /// Fixed display order: open before inProgress before closed.
    pub fn rank(self) -> u8 {
        match self {
            Status::Open => 1,
            Status::InProgress => 2,
            Status::Closed => 3,
        }
    }
}
