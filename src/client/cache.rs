use tracing::warn;

use super::transport::SyncTransport;
use crate::error::{Error, Result};
use crate::models::{find_task, Comment, Task, TaskDraft, TaskPatch, Status};

/// In-memory copy of the collection plus the mutation operations.
///
/// Every mutation follows the same shape: build the next collection
/// value, replace it through the transport, then re-fetch so the cache
/// converges to server truth even if another client wrote concurrently.
/// The last successful replace fully wins; there is no merge of
/// concurrent edits.
pub struct TaskCache<T: SyncTransport> {
    transport: T,
    tasks: Vec<Task>,
}

impl<T: SyncTransport> TaskCache<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            tasks: Vec::new(),
        }
    }

    /// Last-known collection. Callers hand this to the query engine.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Fetch and adopt server truth. On failure the previous in-memory
    /// state is retained unchanged.
    pub async fn refresh(&mut self) -> Result<&[Task]> {
        match self.transport.fetch().await {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(&self.tasks)
            }
            Err(err) => {
                warn!(error = %err, "fetch failed, keeping cached state");
                Err(err)
            }
        }
    }

    /// Adopt a snapshot delivered by a [`ChangeSource`].
    ///
    /// [`ChangeSource`]: super::changes::ChangeSource
    pub fn adopt(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Create a task from the draft and persist the grown collection.
    /// Returns the created task as reconciled with the server.
    pub async fn create(&mut self, draft: TaskDraft) -> Result<&Task> {
        let task = Task::from_draft(draft);
        let id = task.id.clone();

        let mut next = self.tasks.clone();
        next.push(task);
        self.persist(next).await?;

        find_task(&self.tasks, &id).ok_or(Error::TaskNotFound(id))
    }

    /// Overlay the patch onto the task with the given id. Fields absent
    /// from the patch keep their current values.
    pub async fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<()> {
        let mut next = self.tasks.clone();
        let task = crate::models::find_task_mut(&mut next, id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        task.apply(patch);
        self.persist(next).await
    }

    /// Remove the task permanently. There is no tombstone; the deletion
    /// is final on the next successful replace. Asking the user first is
    /// the interface layer's job.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        if find_task(&self.tasks, id).is_none() {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        let next: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();
        self.persist(next).await
    }

    /// Restricted update touching only `status`.
    pub async fn set_status(&mut self, id: &str, status: Status) -> Result<()> {
        self.update(
            id,
            &TaskPatch {
                status: Some(status),
                ..TaskPatch::default()
            },
        )
        .await
    }

    /// Append a comment to the task. Empty or whitespace-only text is a
    /// no-op and touches neither cache nor server.
    pub async fn add_comment(&mut self, id: &str, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let mut next = self.tasks.clone();
        let task = crate::models::find_task_mut(&mut next, id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        task.comments.push(Comment::new(text.to_string()));
        self.persist(next).await
    }

    /// Replace, adopt optimistically, then re-fetch to reconcile.
    ///
    /// A failed replace leaves the cache untouched and aborts the
    /// mutation. A failed reconcile fetch after a successful replace
    /// keeps the optimistic state; the next poll cycle converges it.
    async fn persist(&mut self, next: Vec<Task>) -> Result<()> {
        if let Err(err) = self.transport.replace(&next).await {
            warn!(error = %err, "replace failed, keeping previous state");
            return Err(err);
        }
        self.tasks = next;

        match self.transport.fetch().await {
            Ok(tasks) => self.tasks = tasks,
            Err(err) => {
                warn!(error = %err, "reconcile fetch failed, keeping optimistic state");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::LocalTransport;
    use crate::models::{Assignee, Priority};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// In-memory stand-in for the sync endpoint, with switchable
    /// failure injection. Clones share state so tests can inspect the
    /// "server" side.
    #[derive(Default, Clone)]
    struct MemoryTransport {
        tasks: Arc<Mutex<Vec<Task>>>,
        fail_replace: Arc<AtomicBool>,
        fail_fetch: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SyncTransport for MemoryTransport {
        async fn fetch(&self) -> Result<Vec<Task>> {
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(Error::Server {
                    status: 500,
                    detail: "injected fetch failure".to_string(),
                });
            }
            Ok(self.tasks.lock().unwrap().clone())
        }

        async fn replace(&self, tasks: &[Task]) -> Result<()> {
            if self.fail_replace.load(Ordering::SeqCst) {
                return Err(Error::Server {
                    status: 500,
                    detail: "injected replace failure".to_string(),
                });
            }
            *self.tasks.lock().unwrap() = tasks.to_vec();
            Ok(())
        }
    }

    fn draft() -> TaskDraft {
        TaskDraft {
            title: "A".to_string(),
            details: "d".to_string(),
            status: Status::Open,
            assignee: Assignee::Aleksandar,
            priority: Priority::Low,
            due_date: "2025-01-10".to_string(),
        }
    }

    #[tokio::test]
    async fn test_full_task_lifecycle() {
        let server = MemoryTransport::default();
        let mut cache = TaskCache::new(server.clone());
        cache.refresh().await.unwrap();
        assert!(cache.tasks().is_empty());

        // Create: generated identity, empty comments.
        let created = cache.create(draft()).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(!created.created_at.is_empty());
        assert!(created.comments.is_empty());
        let id = created.id.clone();
        assert_eq!(cache.tasks().len(), 1);

        // Comment.
        cache.add_comment(&id, "looks good").await.unwrap();
        assert_eq!(cache.tasks()[0].comments.len(), 1);
        assert_eq!(cache.tasks()[0].comments[0].text, "looks good");

        // Status change leaves everything else alone.
        cache.set_status(&id, Status::Closed).await.unwrap();
        let task = &cache.tasks()[0];
        assert_eq!(task.status, Status::Closed);
        assert_eq!(task.title, "A");
        assert_eq!(task.details, "d");
        assert_eq!(task.comments.len(), 1);

        // Delete back to empty.
        cache.delete(&id).await.unwrap();
        assert!(cache.tasks().is_empty());
        assert!(server.tasks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_preserves_unpatched_fields() {
        let server = MemoryTransport::default();
        let mut cache = TaskCache::new(server.clone());
        let id = cache.create(draft()).await.unwrap().id.clone();

        cache
            .update(
                &id,
                &TaskPatch {
                    title: Some("B".to_string()),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();

        let task = &cache.tasks()[0];
        assert_eq!(task.title, "B");
        assert_eq!(task.details, "d");
        assert_eq!(task.due_date, "2025-01-10");
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_prior_state() {
        let server = MemoryTransport::default();
        let mut cache = TaskCache::new(server.clone());
        let id = cache.create(draft()).await.unwrap().id.clone();

        server.fail_replace.store(true, Ordering::SeqCst);
        assert!(cache.delete(&id).await.is_err());

        // No partial apply on either side.
        assert_eq!(cache.tasks().len(), 1);
        assert_eq!(server.tasks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reconcile_keeps_optimistic_state() {
        let server = MemoryTransport::default();
        let mut cache = TaskCache::new(server.clone());
        let id = cache.create(draft()).await.unwrap().id.clone();

        server.fail_fetch.store(true, Ordering::SeqCst);
        cache.set_status(&id, Status::InProgress).await.unwrap();

        // Replace landed; the optimistic value stands in for the
        // unreachable reconcile.
        assert_eq!(cache.tasks()[0].status, Status::InProgress);
        assert_eq!(server.tasks.lock().unwrap()[0].status, Status::InProgress);
    }

    #[tokio::test]
    async fn test_whitespace_comment_is_a_noop() {
        let server = MemoryTransport::default();
        let mut cache = TaskCache::new(server.clone());
        let id = cache.create(draft()).await.unwrap().id.clone();

        cache.add_comment(&id, "   \n\t").await.unwrap();
        assert!(cache.tasks()[0].comments.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_is_task_not_found() {
        let server = MemoryTransport::default();
        let mut cache = TaskCache::new(server.clone());

        assert!(matches!(
            cache.set_status("missing", Status::Closed).await,
            Err(Error::TaskNotFound(_))
        ));
        assert!(matches!(
            cache.delete("missing").await,
            Err(Error::TaskNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_local_transport_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");

        let mut cache = TaskCache::new(LocalTransport::new(&path));
        cache.refresh().await.unwrap();
        let id = cache.create(draft()).await.unwrap().id.clone();

        // A fresh cache over the same file sees the saved collection.
        let mut reopened = TaskCache::new(LocalTransport::new(&path));
        reopened.refresh().await.unwrap();
        assert_eq!(reopened.tasks().len(), 1);
        assert_eq!(reopened.tasks()[0].id, id);
    }
}
