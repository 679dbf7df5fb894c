//! Read cursor for a remote file.

/// Reference point for [`File::seek`](crate::File::seek).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Whence {
    /// Relative to the start of the file.
    #[default]
    Set,
    /// Relative to the current offset.
    Cur,
    /// Relative to the current end of the file.
    End,
}

/// Current logical read offset.
///
/// No clamping is applied: negative or past-the-end offsets are kept as-is
/// and simply produce short or empty pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    offset: i64,
}

impl Cursor {
    /// Create a cursor at offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset.
    pub fn tell(&self) -> i64 {
        self.offset
    }

    /// Move to an absolute offset.
    pub fn set(&mut self, offset: i64) -> i64 {
        self.offset = offset;
        self.offset
    }

    /// Move relative to the current offset, saturating at the `i64` range.
    pub fn advance(&mut self, delta: i64) -> i64 {
        self.offset = self.offset.saturating_add(delta);
        self.offset
    }

    /// Length of the next request of a read that began at `start`.
    ///
    /// Unbounded reads always ask for `chunk_size`; bounded ones ask for
    /// exactly the remaining bytes once a full chunk would overshoot `limit`.
    pub fn request_length(&self, start: i64, limit: Option<i64>, chunk_size: i64) -> i64 {
        let consumed = self.offset.saturating_sub(start);
        match limit {
            Some(limit) if consumed.saturating_add(chunk_size) > limit => limit - consumed,
            _ => chunk_size,
        }
    }
}
