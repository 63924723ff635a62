use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document exists but is not a valid task array.
    /// Only a missing file is silently resurrected as `[]`; anything
    /// else is surfaced so real corruption is never masked.
    #[error("corrupt store at {}: {detail}", .path.display())]
    CorruptStore { path: PathBuf, detail: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A non-success reply from the sync endpoint.
    #[error("server replied {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("duplicate task id: {0}")]
    DuplicateTaskId(String),

    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
