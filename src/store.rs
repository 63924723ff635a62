use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::Task;

/// Durable holder of the entire task collection, persisted as a single
/// JSON array. There is no partial update at this layer: `write`
/// replaces the whole document and the caller supplies the complete
/// desired collection.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full collection. A store that has never been written is
    /// materialized as `[]` and persisted, so callers never see a
    /// "not yet initialized" state.
    pub fn read(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            self.write(&[])?;
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| Error::CorruptStore {
            path: self.path.clone(),
            detail: e.to_string(),
        })
    }

    /// Overwrite the persisted collection.
    pub fn write(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(tasks).map_err(|e| Error::CorruptStore {
            path: self.path.clone(),
            detail: e.to_string(),
        })?;
        fs::write(&self.path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignee, Priority, Status};
    use tempfile::TempDir;

    fn sample_task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: "Checkout flow".to_string(),
            details: "verify totals".to_string(),
            status: Status::Open,
            assignee: Assignee::NemanjaDz,
            priority: Priority::High,
            due_date: "2025-02-01".to_string(),
            comments: Vec::new(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_first_read_materializes_empty_collection() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("tasks.json"));

        let tasks = store.read().unwrap();
        assert!(tasks.is_empty());

        // The empty array is persisted, not just returned.
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), "[]");
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("tasks.json"));

        let tasks = vec![sample_task("1"), sample_task("2")];
        store.write(&tasks).unwrap();
        assert_eq!(store.read().unwrap(), tasks);
    }

    #[test]
    fn test_write_creates_missing_parent_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("data").join("tasks.json"));

        store.write(&[sample_task("1")]).unwrap();
        assert_eq!(store.read().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_content_is_an_error_not_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        match store.read() {
            Err(Error::CorruptStore { .. }) => {}
            other => panic!("expected CorruptStore, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_enum_value_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(
            &path,
            r#"[{"id":"1","title":"A","details":"","status":"bogus",
                "assignee":"aleksandar","priority":"low","dueDate":"2025-01-10",
                "comments":[],"createdAt":"2025-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        assert!(matches!(
            FileStore::new(&path).read(),
            Err(Error::CorruptStore { .. })
        ));
    }
}
