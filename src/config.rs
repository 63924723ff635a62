/// Server configuration, loaded from a TOML file when one is present.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "taskboard.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port the sync endpoint listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path of the persisted task collection.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Origin the board UI is served from; the only origin granted
    /// cross-origin access.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Client polling interval, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            data_file: default_data_file(),
            cors_origin: default_cors_origin(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Config {
    /// Load configuration. An explicitly named file must exist and
    /// parse; without one, `taskboard.toml` is used when present and
    /// defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Interval for a [`PollingSource`](crate::client::PollingSource)
    /// following this server.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn default_port() -> u16 {
    3000
}

fn default_data_file() -> PathBuf {
    PathBuf::from("tasks.json")
}

fn default_cors_origin() -> String {
    // Vite development server default.
    "http://localhost:5173".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}
