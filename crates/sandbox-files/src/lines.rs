//! Line reconstruction over chunk sequences.
//!
//! Chunks are independent pages, so a line may straddle any number of them.
//! The fragment left at a chunk edge is carried over and stitched onto the
//! next chunk before splitting. Memory stays bounded by one chunk plus the
//! carried fragment.
//!
//! Splitting happens on raw bytes, so a character cut by a page boundary is
//! whole again before its line is decoded. Lines that are not valid UTF-8
//! are decoded lossily.

use crate::chunks::{Chunks, ReverseChunks};
use crate::error::{FileError, Result};
use futures::Stream;
use std::collections::VecDeque;

/// Line terminator. Lines are yielded without it.
pub const LINE_TERMINATOR: u8 = b'\n';

fn decode(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}

fn is_terminator(byte: &u8) -> bool {
    *byte == LINE_TERMINATOR
}

/// Lines read front to back.
///
/// Trailing text without a terminator at the end of the stream is dropped,
/// not yielded. Log tailing callers depend on only ever seeing complete
/// lines, so this is kept deliberately; it may be revisited.
pub struct Lines<'a> {
    chunks: Chunks<'a>,
    carry: Vec<u8>,
    pending: VecDeque<String>,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(chunks: Chunks<'a>) -> Self {
        Self {
            chunks,
            carry: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Next complete line, or `None` at end of stream.
    pub async fn next(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Ok(Some(line));
            }

            let Some(chunk) = self.chunks.next().await? else {
                return Ok(None);
            };

            let mut text = std::mem::take(&mut self.carry);
            text.extend_from_slice(&chunk.data);

            match text.iter().rposition(is_terminator) {
                Some(end) => {
                    self.pending
                        .extend(text[..end].split(is_terminator).map(decode));
                    self.carry = text[end + 1..].to_vec();
                }
                None => self.carry = text,
            }
        }
    }

    /// Convert into a [`Stream`] of lines.
    pub fn into_stream(self) -> impl Stream<Item = Result<String>> + 'a {
        futures::stream::try_unfold(self, |mut lines| async move {
            Ok::<_, FileError>(lines.next().await?.map(|line| (line, lines)))
        })
    }
}

/// Lines read back to front.
///
/// Each chunk is prepended to the carried fragment, since chunks arrive from
/// the end of file backward. The piece before the first terminator may still
/// continue into the previous chunk and is carried; the rest are complete
/// and are yielded last-first. When the chunks run out the carried piece is
/// the first line of the range and is yielded too.
///
/// A terminator at the very end of the file would surface as an empty first
/// line; that artifact is suppressed. An empty line anywhere else is real and
/// is yielded.
pub struct ReverseLines<'a> {
    chunks: ReverseChunks<'a>,
    carry: Vec<u8>,
    pending: VecDeque<String>,
    exhausted: bool,
    position: usize,
}

impl<'a> ReverseLines<'a> {
    pub(crate) fn new(chunks: ReverseChunks<'a>) -> Self {
        Self {
            chunks,
            carry: Vec::new(),
            pending: VecDeque::new(),
            exhausted: false,
            position: 0,
        }
    }

    /// Next line toward the start of file, or `None` once done.
    pub async fn next(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                let position = self.position;
                self.position += 1;
                if position == 0 && line.is_empty() {
                    continue;
                }
                return Ok(Some(line));
            }

            if self.exhausted {
                return Ok(None);
            }

            match self.chunks.next().await? {
                Some(chunk) => {
                    let mut text = chunk.data.to_vec();
                    text.extend_from_slice(&self.carry);

                    match text.iter().position(is_terminator) {
                        Some(start) => {
                            self.pending
                                .extend(text[start + 1..].rsplit(is_terminator).map(decode));
                            text.truncate(start);
                            self.carry = text;
                        }
                        None => self.carry = text,
                    }
                }
                None => {
                    self.exhausted = true;
                    let first = std::mem::take(&mut self.carry);
                    self.pending.push_back(decode(&first));
                }
            }
        }
    }

    /// Convert into a [`Stream`] of lines.
    pub fn into_stream(self) -> impl Stream<Item = Result<String>> + 'a {
        futures::stream::try_unfold(self, |mut lines| async move {
            Ok::<_, FileError>(lines.next().await?.map(|line| (line, lines)))
        })
    }
}
