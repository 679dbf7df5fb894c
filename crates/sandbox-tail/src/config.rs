//! Configuration for sandbox-tail.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use sandbox_files::{FileConfig, HttpHostConfig, Task, DEFAULT_CHUNK_SIZE};
use std::time::Duration;

/// Default number of lines printed by `head` and `tail`.
pub const DEFAULT_LINES: usize = 10;

/// Configuration for the sandbox-tail binary.
#[derive(Debug, Clone)]
pub struct TailConfig {
    /// Base URL of the agent serving the files.
    pub agent_url: String,

    /// Bytes requested per page (default: 1024).
    pub chunk_size: i64,

    /// Per-request timeout (default: 30s).
    pub timeout: Duration,

    /// Poll interval when following a file (default: 1s).
    pub poll_interval: Duration,

    /// Task id, when paths are relative to a task sandbox.
    pub task_id: Option<String>,

    /// Sandbox directory of that task.
    pub task_dir: Option<String>,
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("chunk size must be > 0, got {0}")]
    InvalidChunkSize(i64),

    #[error("SANDBOX_TASK_ID and SANDBOX_TASK_DIR must be set together")]
    IncompleteTask,

    #[error(transparent)]
    File(#[from] sandbox_files::FileError),
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            agent_url: HttpHostConfig::default().base_url,
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            task_id: None,
            task_dir: None,
        }
    }
}

impl TailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SANDBOX_AGENT_URL` | `http://127.0.0.1:5051` |
    /// | `SANDBOX_CHUNK_SIZE` | `1024` |
    /// | `SANDBOX_TIMEOUT_SECS` | `30` |
    /// | `SANDBOX_POLL_MS` | `1000` |
    /// | `SANDBOX_TASK_ID` | unset |
    /// | `SANDBOX_TASK_DIR` | unset |
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            agent_url: std::env::var("SANDBOX_AGENT_URL").unwrap_or(default.agent_url),
            chunk_size: std::env::var("SANDBOX_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.chunk_size),
            timeout: std::env::var("SANDBOX_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),
            poll_interval: std::env::var("SANDBOX_POLL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default.poll_interval),
            task_id: std::env::var("SANDBOX_TASK_ID").ok(),
            task_dir: std::env::var("SANDBOX_TASK_DIR").ok(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size <= 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }
        if self.task_id.is_some() != self.task_dir.is_some() {
            return Err(ConfigError::IncompleteTask);
        }
        Ok(())
    }

    /// Reader configuration for file handles.
    pub fn file_config(&self) -> Result<FileConfig, ConfigError> {
        Ok(FileConfig::builder().chunk_size(self.chunk_size).build()?)
    }

    /// Host configuration for the agent.
    pub fn host_config(&self) -> HttpHostConfig {
        HttpHostConfig::new(self.agent_url.clone()).timeout(self.timeout)
    }

    /// Task the paths are relative to, if configured.
    pub fn task(&self) -> Option<Task> {
        match (&self.task_id, &self.task_dir) {
            (Some(id), Some(dir)) => Some(Task::new(id.clone(), dir.clone())),
            _ => None,
        }
    }
}
