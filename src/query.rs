//! Pure derivation of a displayed task list: filter, then stable sort.
//! No I/O and no mutation of the source collection, so it is safe to
//! re-run on every keystroke.

use serde::Serialize;

use crate::models::{Assignee, Priority, Status, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Status,
    DueDate,
    Assignee,
}

/// Filter and sort parameters for one derived view. The default value
/// is the identity query: everything matches, sorted by status.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    /// Case-insensitive substring match against title or details.
    pub search: String,
    /// Empty set means no restriction; non-empty means membership.
    pub status: Vec<Status>,
    pub priority: Vec<Priority>,
    pub assignee: Vec<Assignee>,
    /// Inclusive due-date bounds, ISO calendar dates. ISO dates order
    /// correctly under plain string comparison.
    pub due_after: Option<String>,
    pub due_before: Option<String>,
    pub sort: SortKey,
}

impl TaskQuery {
    /// True when the task passes every active filter. Filters combine
    /// with AND.
    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || task.title.to_lowercase().contains(&needle)
            || task.details.to_lowercase().contains(&needle);

        let matches_status = self.status.is_empty() || self.status.contains(&task.status);
        let matches_priority = self.priority.is_empty() || self.priority.contains(&task.priority);
        let matches_assignee = self.assignee.is_empty() || self.assignee.contains(&task.assignee);

        let matches_range = self
            .due_after
            .as_deref()
            .is_none_or(|start| task.due_date.as_str() >= start)
            && self
                .due_before
                .as_deref()
                .is_none_or(|end| task.due_date.as_str() <= end);

        matches_search && matches_status && matches_priority && matches_assignee && matches_range
    }

    /// Derive the displayed sequence. Operates on a copy; sort is stable
    /// so ties keep their original relative order.
    pub fn run(&self, tasks: &[Task]) -> Vec<Task> {
        let mut out: Vec<Task> = tasks.iter().filter(|t| self.matches(t)).cloned().collect();
        match self.sort {
            SortKey::Status => out.sort_by_key(|t| t.status.rank()),
            SortKey::DueDate => out.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
            SortKey::Assignee => out.sort_by(|a, b| a.assignee.as_str().cmp(b.assignee.as_str())),
        }
        out
    }
}

/// Tasks per status, always computed from the unfiltered collection.
/// Feeds the summary header independently of any active filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub open: usize,
    pub in_progress: usize,
    pub closed: usize,
}

pub fn status_counts(tasks: &[Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            Status::Open => counts.open += 1,
            Status::InProgress => counts.in_progress += 1,
            Status::Closed => counts.closed += 1,
        }
    }
    counts
}
