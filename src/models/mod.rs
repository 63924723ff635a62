pub mod collection;
pub mod comment;
pub mod status;
pub mod task;

pub use collection::{find_duplicate_id, find_task, find_task_mut, Collection};
pub use comment::Comment;
pub use status::Status;
pub use task::{mint_id, now_timestamp, Assignee, Priority, Task, TaskDraft, TaskPatch};
