use super::task::Task;

/// The whole task collection is the unit of persistence: reads and
/// writes always move the complete `Vec<Task>`, never a slice of it.
pub type Collection = Vec<Task>;

pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == id)
}

pub fn find_task_mut<'a>(tasks: &'a mut [Task], id: &str) -> Option<&'a mut Task> {
    tasks.iter_mut().find(|t| t.id == id)
}

/// Returns the first id that appears more than once, if any. Ids must be
/// unique for the lifetime of the collection.
pub fn find_duplicate_id(tasks: &[Task]) -> Option<&str> {
    for (i, task) in tasks.iter().enumerate() {
        if tasks[..i].iter().any(|t| t.id == task.id) {
            return Some(&task.id);
        }
    }
    None
}
