//! # sandbox-files
//!
//! Seekable, line-iterable handles on files that live on a remote agent,
//! such as the stdout/stderr logs in a task's sandbox.
//!
//! Bytes are pulled one page at a time from the agent's paging endpoint
//! (`/files/read.json?path=..&offset=..&length=..`), so arbitrarily large
//! files can be read, tailed, or walked backward with memory bounded by the
//! chunk size.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      sandbox-files                       │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌─────────────────┐     ┌──────────────────────────┐   │
//! │  │     File        │────▶│  Lines / ReverseLines    │   │
//! │  │  - seek/tell    │     │  (carry-over stitching)  │   │
//! │  │  - read()       │     └──────────────────────────┘   │
//! │  │  - readlines()  │                │                   │
//! │  │  - exists/size  │                ▼                   │
//! │  └─────────────────┘     ┌──────────────────────────┐   │
//! │           │              │  Chunks / ReverseChunks  │   │
//! │           │              │  (lazy page sequences)   │   │
//! │           ▼              └──────────────────────────┘   │
//! │  ┌─────────────────┐                │                   │
//! │  │  dyn Host       │◀───────────────┘                   │
//! │  │  - fetch()      │   HttpHost | MemoryHost            │
//! │  └─────────────────┘                                    │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//!                           │ HTTP
//!                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │              agent: GET /files/read.json                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use sandbox_files::{File, FileConfig, HttpHost, HttpHostConfig, Task, Whence};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let host = Arc::new(HttpHost::new(HttpHostConfig::new("http://10.0.0.5:5051"))?);
//! let task = Task::new("web.1234", "/var/lib/mesos/slaves/s1/runs/r1");
//!
//! let mut stdout = File::for_task(host, task, "stdout")
//!     .with_config(FileConfig::builder().chunk_size(4096).build()?);
//!
//! if stdout.exists().await? {
//!     // Last ten lines, newest first
//!     let mut lines = stdout.lines_reverse(None);
//!     for _ in 0..10 {
//!         match lines.next().await? {
//!             Some(line) => println!("{line}"),
//!             None => break,
//!         }
//!     }
//!
//!     // Everything written from here on
//!     stdout.seek(0, Whence::End).await?;
//!     let fresh = stdout.read(None).await?;
//!     print!("{}", String::from_utf8_lossy(&fresh));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Behavior Notes
//!
//! - **Live size**: `size()` always asks the agent; growth is visible.
//! - **Complete lines only**: forward line reads drop a trailing fragment
//!   without a terminator.
//! - **No caching, no prefetch**: one request per page, issued on demand.
//! - **Bytes, not text**: chunks and `read()` carry raw bytes and the cursor
//!   moves by bytes served; only whole lines are decoded to `String`.

mod chunks;
mod config;
mod cursor;
mod error;
mod file;
mod host;
mod http;
mod lines;
mod memory;

pub use chunks::{Chunk, Chunks, ReverseChunks};
pub use config::{FileConfig, FileConfigBuilder, HttpHostConfig, DEFAULT_CHUNK_SIZE};
pub use cursor::{Cursor, Whence};
pub use error::{FileError, HostError, Result};
pub use file::File;
pub use host::{
    Host, HostResponse, ReadParams, ReadResponse, Task, READ_ENDPOINT, STATUS_NOT_FOUND,
};
pub use http::HttpHost;
pub use lines::{Lines, ReverseLines, LINE_TERMINATOR};
pub use memory::MemoryHost;
