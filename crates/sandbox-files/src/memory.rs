//! In-process host serving files from memory.
//!
//! Follows the paging contract of a real agent, which makes it usable for
//! embedding and for exercising readers without a network.

use crate::error::HostError;
use crate::host::{Host, HostResponse, ReadParams, ReadResponse, READ_ENDPOINT};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// [`Host`] keeping file contents in a map.
#[derive(Debug)]
pub struct MemoryHost {
    key: String,
    files: Mutex<HashMap<String, Vec<u8>>>,
    requests: AtomicUsize,
}

impl MemoryHost {
    /// Create an empty host identified by `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            files: Mutex::new(HashMap::new()),
            requests: AtomicUsize::new(0),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(self, path: impl Into<String>, content: impl AsRef<[u8]>) -> Self {
        self.insert(path, content);
        self
    }

    /// Create or replace a file.
    pub fn insert(&self, path: impl Into<String>, content: impl AsRef<[u8]>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), content.as_ref().to_vec());
    }

    /// Append to a file, creating it if missing.
    pub fn append(&self, path: &str, content: impl AsRef<[u8]>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(content.as_ref());
    }

    /// Remove a file. Returns whether it existed.
    pub fn remove(&self, path: &str) -> bool {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
            .is_some()
    }

    /// Number of paging requests served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn page(&self, params: &ReadParams) -> Option<ReadResponse> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        let content = files.get(&params.path)?;

        let size = content.len() as i64;
        let data = if params.offset < 0 || params.length <= 0 {
            Vec::new()
        } else {
            let start = params.offset.min(size) as usize;
            let end = params.offset.saturating_add(params.length).min(size) as usize;
            content[start..end].to_vec()
        };

        Some(ReadResponse { offset: size, data })
    }
}

#[async_trait]
impl Host for MemoryHost {
    fn key(&self) -> String {
        self.key.clone()
    }

    async fn fetch(&self, endpoint: &str, params: &ReadParams) -> Result<HostResponse, HostError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if endpoint != READ_ENDPOINT {
            return Err(HostError::Other(format!("unknown endpoint: {endpoint}")));
        }

        match self.page(params) {
            Some(payload) => Ok(HostResponse::ok(payload.to_body())),
            None => Ok(HostResponse::not_found()),
        }
    }
}
