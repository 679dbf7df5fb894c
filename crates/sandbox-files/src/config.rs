//! Reader and host configuration types.

use crate::error::FileError;
use std::time::Duration;

/// Default number of bytes requested per chunk.
pub const DEFAULT_CHUNK_SIZE: i64 = 1024;

/// Configuration for a remote [`File`](crate::File) handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileConfig {
    /// Bytes requested per paging call (default: 1024).
    pub chunk_size: i64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl FileConfig {
    /// Create a new config builder.
    pub fn builder() -> FileConfigBuilder {
        FileConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), FileError> {
        if self.chunk_size <= 0 {
            return Err(FileError::InvalidConfig("chunk_size must be > 0".into()));
        }
        Ok(())
    }
}

/// Builder for FileConfig.
#[derive(Debug, Default)]
pub struct FileConfigBuilder {
    config: FileConfig,
}

impl FileConfigBuilder {
    /// Set the chunk size in bytes.
    pub fn chunk_size(mut self, bytes: i64) -> Self {
        self.config.chunk_size = bytes;
        self
    }

    /// Build the configuration, validating all fields.
    pub fn build(self) -> Result<FileConfig, FileError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for [`HttpHost`](crate::HttpHost).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHostConfig {
    /// Base URL of the agent, e.g. `http://10.0.0.5:5051`.
    pub base_url: String,
    /// Timeout applied to each paging request.
    pub timeout: Duration,
}

impl Default for HttpHostConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5051".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpHostConfig {
    /// Create a config for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
