use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::comment::Comment;
use super::status::Status;

/// Fixed team roster. The set is closed: a document naming anyone else
/// is malformed and rejected at the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Assignee {
    Aleksandar,
    NemanjaDz,
    NemanjaT,
}

impl Assignee {
    pub fn as_str(self) -> &'static str {
        match self {
            Assignee::Aleksandar => "aleksandar",
            Assignee::NemanjaDz => "nemanjaDz",
            Assignee::NemanjaT => "nemanjaT",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

/// The unit of work. `id` and `created_at` are set once at creation and
/// never change; `comments` only grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub status: Status,
    pub assignee: Assignee,
    #[serde(default)]
    pub priority: Priority,
    /// ISO 8601 calendar date, e.g. "2025-01-10". Dates in this form
    /// compare correctly as plain strings.
    pub due_date: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: String,
}

impl Task {
    /// Materialize a new task from user-supplied fields, minting the id
    /// and creation timestamp.
    pub fn from_draft(draft: TaskDraft) -> Self {
        Self {
            id: mint_id(),
            title: draft.title,
            details: draft.details,
            status: draft.status,
            assignee: draft.assignee,
            priority: draft.priority,
            due_date: draft.due_date,
            comments: Vec::new(),
            created_at: now_timestamp(),
        }
    }

    /// Shallow merge: fields present in the patch overwrite, absent
    /// fields are preserved. Identity fields cannot be patched.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(details) = &patch.details {
            self.details = details.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = &patch.due_date {
            self.due_date = due_date.clone();
        }
    }
}

/// Fields supplied when creating a task. Everything else (id, creation
/// time, empty comment list) is generated. No `Default`: a draft always
/// names an assignee, and the roster has no neutral member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub status: Status,
    pub assignee: Assignee,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: String,
}

/// Partial update overlay for [`Task::apply`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub details: Option<String>,
    pub status: Option<Status>,
    pub assignee: Option<Assignee>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
}

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Timestamp-derived opaque id. A process-local high-water mark keeps
/// two ids minted within the same millisecond distinct.
pub fn mint_id() -> String {
    let now = Utc::now().timestamp_millis() as u64;
    let prev = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(0);
    now.max(prev + 1).to_string()
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task {
            id: "1700000000000".to_string(),
            title: "A".to_string(),
            details: "d".to_string(),
            status: Status::Open,
            assignee: Assignee::Aleksandar,
            priority: Priority::Low,
            due_date: "2025-01-10".to_string(),
            comments: Vec::new(),
            created_at: "2025-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_task_wire_field_names() {
        let json = serde_json::to_string(&sample_task()).unwrap();
        assert!(json.contains("\"dueDate\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"assignee\":\"aleksandar\""));
    }

    #[test]
    fn test_unknown_assignee_is_rejected() {
        let json = r#"{"id":"1","title":"A","details":"","status":"open",
            "assignee":"somebody","priority":"low","dueDate":"2025-01-10",
            "comments":[],"createdAt":"2025-01-01T00:00:00Z"}"#;
        let result: Result<Task, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_draft_generates_identity_fields() {
        let task = Task::from_draft(TaskDraft {
            title: "A".to_string(),
            details: "d".to_string(),
            status: Status::Open,
            assignee: Assignee::Aleksandar,
            priority: Priority::Low,
            due_date: "2025-01-10".to_string(),
        });
        assert!(!task.id.is_empty());
        assert!(!task.created_at.is_empty());
        assert!(task.comments.is_empty());
        assert_eq!(task.status, Status::Open);
    }

    #[test]
    fn test_patch_preserves_absent_fields() {
        let mut task = sample_task();
        task.apply(&TaskPatch {
            status: Some(Status::Closed),
            ..TaskPatch::default()
        });
        assert_eq!(task.status, Status::Closed);
        assert_eq!(task.title, "A");
        assert_eq!(task.details, "d");
        assert_eq!(task.assignee, Assignee::Aleksandar);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.due_date, "2025-01-10");
        assert!(task.comments.is_empty());
        assert_eq!(task.created_at, "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_mint_id_is_monotonic() {
        let a = mint_id();
        let b = mint_id();
        assert_ne!(a, b);
        assert!(b.parse::<u64>().unwrap() > a.parse::<u64>().unwrap());
    }
}
