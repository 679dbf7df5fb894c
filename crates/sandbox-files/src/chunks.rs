//! Lazy forward and reverse chunk sequences over a remote file.
//!
//! Nothing is fetched until `next()` is awaited, and at most one chunk is
//! held at a time. Both readers move the owning file's cursor.

use crate::error::{FileError, Result};
use crate::file::File;
use bytes::Bytes;
use futures::Stream;

/// One page fetched from the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Bytes returned, possibly fewer than requested near the end of file.
    ///
    /// Raw file bytes: a page may begin or end inside a multibyte character.
    pub data: Bytes,
    /// Offset the page was requested at.
    pub offset: i64,
    /// Length that was requested.
    pub length: i64,
}

impl Chunk {
    /// Number of bytes actually returned.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the page came back empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Forward chunk sequence starting at the file's cursor.
///
/// Ends before an empty page (end of file) or right after the page that
/// completes the optional byte limit.
pub struct Chunks<'a> {
    file: &'a mut File,
    start: i64,
    limit: Option<i64>,
    done: bool,
}

impl<'a> Chunks<'a> {
    pub(crate) fn new(file: &'a mut File, limit: Option<i64>) -> Self {
        let start = file.tell();
        Self {
            file,
            start,
            limit,
            done: false,
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.file.tell() - self.start >= limit)
    }

    /// Fetch the next chunk, or `None` once the sequence has ended.
    pub async fn next(&mut self) -> Result<Option<Chunk>> {
        if self.done || self.limit_reached() {
            self.done = true;
            return Ok(None);
        }

        let length = self
            .file
            .cursor
            .request_length(self.start, self.limit, self.file.chunk_size());
        let offset = self.file.tell();
        let chunk = self.file.fetch_chunk(offset, length).await?;

        if chunk.is_empty() {
            self.done = true;
            return Ok(None);
        }
        if self.limit_reached() {
            self.done = true;
        }
        Ok(Some(chunk))
    }

    /// Convert into a [`Stream`] of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Chunk>> + 'a {
        futures::stream::try_unfold(self, |mut chunks| async move {
            Ok::<_, FileError>(chunks.next().await?.map(|chunk| (chunk, chunks)))
        })
    }
}

/// Where a reverse walk stands.
#[derive(Debug, Clone, Copy)]
struct ReverseWalk {
    /// Next aligned offset to fetch.
    next: i64,
    /// First byte of the target range.
    floor: i64,
    /// Length of the closing boundary chunk.
    remainder: i64,
    boundary_pending: bool,
}

/// Reverse chunk sequence walking from the end of file toward the start.
///
/// Full chunks are fetched at `fsize - chunk_size`, `fsize - 2 * chunk_size`,
/// and so on while they stay inside the target range, then one boundary
/// chunk of `size % chunk_size` bytes closes the range at `fsize - size`.
/// The file size is sampled on the first call to `next()`.
pub struct ReverseChunks<'a> {
    file: &'a mut File,
    limit: Option<i64>,
    walk: Option<ReverseWalk>,
}

impl<'a> ReverseChunks<'a> {
    pub(crate) fn new(file: &'a mut File, limit: Option<i64>) -> Self {
        Self {
            file,
            limit,
            walk: None,
        }
    }

    async fn start(&mut self) -> Result<ReverseWalk> {
        let fsize = self.file.size().await?;
        let size = self.limit.unwrap_or(fsize).clamp(0, fsize);
        let chunk_size = self.file.chunk_size();

        tracing::debug!(
            path = %self.file.host_path(),
            fsize,
            size,
            chunk_size,
            "Starting reverse read"
        );

        Ok(ReverseWalk {
            next: fsize - chunk_size,
            floor: fsize - size,
            remainder: size % chunk_size,
            boundary_pending: true,
        })
    }

    /// Fetch the next chunk (closer to the start of file), or `None` once
    /// the target range is covered.
    pub async fn next(&mut self) -> Result<Option<Chunk>> {
        let mut walk = match self.walk {
            Some(walk) => walk,
            None => self.start().await?,
        };
        let chunk_size = self.file.chunk_size();

        let request = if walk.next >= walk.floor {
            let offset = walk.next;
            walk.next -= chunk_size;
            Some((offset, chunk_size))
        } else if walk.boundary_pending {
            walk.boundary_pending = false;
            (walk.remainder > 0).then_some((walk.floor, walk.remainder))
        } else {
            None
        };
        self.walk = Some(walk);

        match request {
            Some((offset, length)) => Ok(Some(self.file.fetch_chunk(offset, length).await?)),
            None => Ok(None),
        }
    }

    /// Convert into a [`Stream`] of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Chunk>> + 'a {
        futures::stream::try_unfold(self, |mut chunks| async move {
            Ok::<_, FileError>(chunks.next().await?.map(|chunk| (chunk, chunks)))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Chunk, File, FileConfig, MemoryHost};
    use futures::TryStreamExt;
    use std::sync::Arc;

    fn file(content: &str, chunk_size: i64) -> (Arc<MemoryHost>, File) {
        let host = Arc::new(MemoryHost::new("agent:5051").with_file("/log", content));
        let config = FileConfig::builder().chunk_size(chunk_size).build().unwrap();
        let file = File::new(host.clone(), "/log").with_config(config);
        (host, file)
    }

    fn text(chunk: &Chunk) -> String {
        String::from_utf8(chunk.data.to_vec()).unwrap()
    }

    async fn forward(file: &mut File, limit: Option<i64>) -> Vec<(i64, String)> {
        let mut chunks = file.chunks(limit);
        let mut out = Vec::new();
        while let Some(chunk) = chunks.next().await.unwrap() {
            out.push((chunk.offset, text(&chunk)));
        }
        out
    }

    async fn reverse(file: &mut File, limit: Option<i64>) -> Vec<(i64, String)> {
        let mut chunks = file.chunks_reverse(limit);
        let mut out = Vec::new();
        while let Some(chunk) = chunks.next().await.unwrap() {
            out.push((chunk.offset, text(&chunk)));
        }
        out
    }

    #[tokio::test]
    async fn test_forward_reads_to_eof() {
        let (_, mut file) = file("0123456789", 4);
        let chunks = forward(&mut file, None).await;
        assert_eq!(
            chunks,
            vec![
                (0, "0123".to_string()),
                (4, "4567".to_string()),
                (8, "89".to_string()),
            ]
        );
        assert_eq!(file.tell(), 10);
    }

    #[tokio::test]
    async fn test_forward_swallows_empty_page() {
        let (host, mut file) = file("01234567", 4);
        let chunks = forward(&mut file, None).await;
        assert_eq!(chunks.len(), 2);
        // two full pages plus the empty one that signals end of file
        assert_eq!(host.requests(), 3);
    }

    #[tokio::test]
    async fn test_forward_respects_limit() {
        let (host, mut file) = file("0123456789", 4);
        file.seek(1, crate::Whence::Set).await.unwrap();

        let chunks = forward(&mut file, Some(6)).await;
        assert_eq!(
            chunks,
            vec![(1, "1234".to_string()), (5, "56".to_string())]
        );
        assert_eq!(file.tell(), 7);
        // no trailing end-of-file request once the limit is met
        assert_eq!(host.requests(), 2);
    }

    #[tokio::test]
    async fn test_forward_zero_limit_fetches_nothing() {
        let (host, mut file) = file("0123456789", 4);
        assert!(forward(&mut file, Some(0)).await.is_empty());
        assert_eq!(host.requests(), 0);
    }

    #[tokio::test]
    async fn test_forward_is_lazy() {
        let (host, mut file) = file("0123456789", 2);
        let mut chunks = file.chunks(None);
        assert_eq!(host.requests(), 0);
        chunks.next().await.unwrap();
        assert_eq!(host.requests(), 1);
    }

    #[tokio::test]
    async fn test_forward_stream() {
        let (_, mut file) = file("abcdef", 4);
        let chunks: Vec<_> = file.chunks(None).into_stream().try_collect().await.unwrap();
        let data: Vec<_> = chunks.iter().map(text).collect();
        assert_eq!(data, vec!["abcd", "ef"]);
    }

    #[tokio::test]
    async fn test_forward_advances_by_bytes_served() {
        // "é" is two bytes; a three byte page ends inside the second one
        let (_, mut file) = file("aéé", 3);
        let mut chunks = file.chunks(None);

        let first = chunks.next().await.unwrap().unwrap();
        assert_eq!(&first.data[..], &[b'a', 0xC3, 0xA9]);
        let second = chunks.next().await.unwrap().unwrap();
        assert_eq!(second.offset, 3);
        assert_eq!(&second.data[..], &[0xC3, 0xA9]);
        assert!(chunks.next().await.unwrap().is_none());
        assert_eq!(file.tell(), 5);
    }

    #[tokio::test]
    async fn test_reverse_split_character_reassembles() {
        let (_, mut file) = file("añb", 2);
        let mut bytes = Vec::new();
        let mut chunks = file.chunks_reverse(None);
        while let Some(chunk) = chunks.next().await.unwrap() {
            bytes.splice(0..0, chunk.data.iter().copied());
        }
        assert_eq!(bytes, "añb".as_bytes());
    }

    #[tokio::test]
    async fn test_reverse_uneven_tail() {
        let (_, mut file) = file("0123456789", 4);
        let chunks = reverse(&mut file, None).await;
        assert_eq!(
            chunks,
            vec![
                (6, "6789".to_string()),
                (2, "2345".to_string()),
                (0, "01".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_reverse_exact_multiple_covers_start() {
        let (host, mut file) = file("01234567", 4);
        let chunks = reverse(&mut file, None).await;
        assert_eq!(
            chunks,
            vec![(4, "4567".to_string()), (0, "0123".to_string())]
        );
        // size request plus two pages, no empty boundary fetch
        assert_eq!(host.requests(), 3);
    }

    #[tokio::test]
    async fn test_reverse_partial_range() {
        let (_, mut file) = file("0123456789", 4);
        let chunks = reverse(&mut file, Some(5)).await;
        assert_eq!(
            chunks,
            vec![(6, "6789".to_string()), (5, "5".to_string())]
        );
    }

    #[tokio::test]
    async fn test_reverse_file_smaller_than_chunk() {
        let (_, mut file) = file("abc", 8);
        let chunks = reverse(&mut file, None).await;
        assert_eq!(chunks, vec![(0, "abc".to_string())]);
    }

    #[tokio::test]
    async fn test_reverse_empty_file() {
        let (_, mut file) = file("", 8);
        assert!(reverse(&mut file, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_reverse_limit_is_clamped_to_file() {
        let (_, mut file) = file("0123", 4);
        let chunks = reverse(&mut file, Some(100)).await;
        assert_eq!(chunks, vec![(0, "0123".to_string())]);
    }

    #[tokio::test]
    async fn test_reverse_missing_file() {
        let host = Arc::new(MemoryHost::new("agent:5051"));
        let mut file = File::new(host, "/gone");
        let err = file.chunks_reverse(None).next().await.unwrap_err();
        assert!(err.is_not_found());
    }
}
