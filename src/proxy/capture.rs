//! Response Capture
//!
//! Bounded accumulation of a forwarded response so it can be cached once the
//! transfer completes.

// == Capture Buffer ==
/// Collects response bytes up to the single-object limit.
///
/// As soon as the response would exceed the limit the collected bytes are
/// dropped and later chunks are ignored; forwarding to the client is not
/// affected.
#[derive(Debug)]
pub struct CaptureBuffer {
    buf: Vec<u8>,
    limit: usize,
    overflowed: bool,
}

impl CaptureBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            overflowed: false,
        }
    }

    /// Appends a chunk, or drops everything captured so far once the limit
    /// would be exceeded.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.overflowed {
            return;
        }
        if self.buf.len() + chunk.len() > self.limit {
            self.overflowed = true;
            self.buf = Vec::new();
            return;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// The captured response, or None if it outgrew the limit.
    pub fn into_cacheable(self) -> Option<Vec<u8>> {
        (!self.overflowed).then_some(self.buf)
    }
}
