//! Remote file handle.

use crate::chunks::{Chunk, Chunks, ReverseChunks};
use crate::config::FileConfig;
use crate::cursor::{Cursor, Whence};
use crate::error::{FileError, Result};
use crate::host::{Host, ReadParams, ReadResponse, Task, READ_ENDPOINT};
use crate::lines::{Lines, ReverseLines};
use bytes::{Bytes, BytesMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A seekable, readable handle on a file that lives on an agent.
///
/// Holds no open connection: every page is an independent request, so a
/// handle can be kept around and reused freely. Size is never cached, which
/// makes growth of the remote file visible between calls.
///
/// Operations that move the cursor take `&mut self`; share a handle across
/// tasks only behind a lock.
pub struct File {
    host: Arc<dyn Host>,
    task: Option<Task>,
    path: String,
    host_path: String,
    config: FileConfig,
    pub(crate) cursor: Cursor,
}

impl File {
    /// Open a handle on `path` as seen by the host itself.
    pub fn new(host: Arc<dyn Host>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            host,
            task: None,
            host_path: path.clone(),
            path,
            config: FileConfig::default(),
            cursor: Cursor::new(),
        }
    }

    /// Open a handle on `path` inside a task's sandbox directory.
    pub fn for_task(host: Arc<dyn Host>, task: Task, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            host,
            host_path: task.resolve(&path),
            task: Some(task),
            path,
            config: FileConfig::default(),
            cursor: Cursor::new(),
        }
    }

    /// Replace the reader configuration.
    pub fn with_config(mut self, config: FileConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the host serving this file.
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Get the owning task, if any.
    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    /// Path as given, relative to the task sandbox when there is one.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path as resolved on the host.
    pub fn host_path(&self) -> &str {
        &self.host_path
    }

    /// Get the reader configuration.
    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    pub(crate) fn chunk_size(&self) -> i64 {
        self.config.chunk_size
    }

    /// Globally unique identity: host key plus resolved path.
    pub fn key(&self) -> String {
        format!("{}:{}", self.host.key(), self.host_path)
    }

    fn location(&self) -> String {
        match &self.task {
            Some(task) => task.id().to_string(),
            None => self.host.key(),
        }
    }

    /// Issue one paging request.
    async fn fetch(&self, offset: i64, length: i64) -> Result<ReadResponse> {
        let params = ReadParams {
            path: self.host_path.clone(),
            offset,
            length,
        };

        let response = self.host.fetch(READ_ENDPOINT, &params).await?;
        if response.is_not_found() {
            tracing::debug!(host = %self.host.key(), path = %self.host_path, "File does not exist");
            return Err(FileError::DoesNotExist {
                path: self.host_path.clone(),
            });
        }

        Ok(response.json()?)
    }

    /// Fetch the page at `offset`, leaving the cursor just past the bytes
    /// actually returned.
    pub(crate) async fn fetch_chunk(&mut self, offset: i64, length: i64) -> Result<Chunk> {
        self.cursor.set(offset);
        let page = self.fetch(offset, length).await?;
        let data = Bytes::from(page.data);
        self.cursor.advance(data.len() as i64);

        tracing::debug!(
            path = %self.host_path,
            offset,
            length,
            returned = data.len(),
            size = page.offset,
            "Fetched chunk"
        );

        Ok(Chunk {
            data,
            offset,
            length,
        })
    }

    /// Check whether the file exists on the host.
    ///
    /// Only the not-found case is turned into `false`; transport errors are
    /// still returned.
    pub async fn exists(&self) -> Result<bool> {
        match self.fetch(0, 0).await {
            Ok(_) => Ok(true),
            Err(FileError::DoesNotExist { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Current size of the file in bytes. Always asks the host.
    pub async fn size(&self) -> Result<i64> {
        Ok(self.fetch(0, 0).await?.offset)
    }

    /// Move the cursor and return the new offset.
    ///
    /// [`Whence::End`] asks the host for the current size. No clamping to
    /// the file; offsets saturate at the `i64` range.
    pub async fn seek(&mut self, offset: i64, whence: Whence) -> Result<i64> {
        let position = match whence {
            Whence::Set => self.cursor.set(offset),
            Whence::Cur => self.cursor.advance(offset),
            Whence::End => {
                let size = self.size().await?;
                self.cursor.set(size.saturating_add(offset))
            }
        };
        Ok(position)
    }

    /// Current cursor offset.
    pub fn tell(&self) -> i64 {
        self.cursor.tell()
    }

    /// Lazy chunks from the cursor, up to `size` bytes or end of file.
    pub fn chunks(&mut self, size: Option<i64>) -> Chunks<'_> {
        Chunks::new(self, size)
    }

    /// Lazy chunks covering the last `size` bytes (default: the whole
    /// file), latest first.
    pub fn chunks_reverse(&mut self, size: Option<i64>) -> ReverseChunks<'_> {
        ReverseChunks::new(self, size)
    }

    /// Lazy lines from the cursor, reading at most `size` bytes.
    pub fn lines(&mut self, size: Option<i64>) -> Lines<'_> {
        Lines::new(self.chunks(size))
    }

    /// Lazy lines of the last `size` bytes (default: whole file), last
    /// line first.
    pub fn lines_reverse(&mut self, size: Option<i64>) -> ReverseLines<'_> {
        ReverseLines::new(self.chunks_reverse(size))
    }

    /// Read up to `size` bytes from the cursor, or to end of file.
    ///
    /// Returns raw bytes; a bounded read may stop inside a character.
    pub async fn read(&mut self, size: Option<i64>) -> Result<Bytes> {
        let mut chunks = self.chunks(size);
        let mut out = BytesMut::new();
        while let Some(chunk) = chunks.next().await? {
            out.extend_from_slice(&chunk.data);
        }
        Ok(out.freeze())
    }

    /// First complete line within the next `size` bytes.
    pub async fn readline(&mut self, size: Option<i64>) -> Result<Option<String>> {
        self.lines(size).next().await
    }

    /// All complete lines within the next `size` bytes.
    pub async fn readlines(&mut self, size: Option<i64>) -> Result<Vec<String>> {
        let mut lines = self.lines(size);
        let mut out = Vec::new();
        while let Some(line) = lines.next().await? {
            out.push(line);
        }
        Ok(out)
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for File {}

impl Hash for File {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.location(), self.path)
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<open file '{}', for '{}'>", self.path, self.location())
    }
}
