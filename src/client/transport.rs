use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::Task;
use crate::store::FileStore;

/// The two suspension points of the client: fetching the collection and
/// replacing it wholesale. Everything above this trait is transport
/// agnostic.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Task>>;
    async fn replace(&self, tasks: &[Task]) -> Result<()>;
}

/// Talks to a running sync server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/api/tasks", self.base_url)
    }

    /// Resource the SSE push variant subscribes to.
    pub fn updates_url(&self) -> String {
        format!("{}/api/tasks/updates", self.base_url)
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    async fn fetch(&self) -> Result<Vec<Task>> {
        let resp = self.http.get(self.tasks_url()).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Server {
                status: resp.status().as_u16(),
                detail: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp.json().await?)
    }

    async fn replace(&self, tasks: &[Task]) -> Result<()> {
        let resp = self.http.post(self.tasks_url()).json(&tasks).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Server {
                status: resp.status().as_u16(),
                detail: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// Standalone mode with no server: the collection lives in a local JSON
/// file under a fixed path, loaded at startup and saved on every
/// mutation.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    store: FileStore,
}

impl LocalTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: FileStore::new(path),
        }
    }
}

#[async_trait]
impl SyncTransport for LocalTransport {
    async fn fetch(&self) -> Result<Vec<Task>> {
        self.store.read()
    }

    async fn replace(&self, tasks: &[Task]) -> Result<()> {
        self.store.write(tasks)
    }
}
