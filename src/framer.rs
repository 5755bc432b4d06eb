//! Receive framer: byte stream in, lines out.
//!
//! Runs in the interrupt context. Never blocks, never allocates.
//!
//! Policy:
//! - CR or LF with a non-empty buffer ends the line
//! - CR or LF with an empty buffer is ignored (no empty lines, CRLF is one end)
//! - bytes past the buffer limit are dropped until the next terminator

use crate::buffer::{is_terminator, LineBuffer};

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedResult {
    /// Byte appended.
    Stored,
    /// Line complete; read it with [`RxFramer::line`] before the next feed.
    Line,
    /// Terminator on an empty buffer.
    Ignored,
    /// Buffer full, first byte of this line discarded.
    Overflow,
    /// Buffer full, byte discarded (line already overflowed).
    Dropped,
}

/// Line accumulator.
pub struct RxFramer<const N: usize> {
    line: LineBuffer<N>,
    /// Completed line waiting to be picked up.
    ready: bool,
    /// Current line lost bytes.
    overflowed: bool,
}

impl<const N: usize> RxFramer<N> {
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            ready: false,
            overflowed: false,
        }
    }

    /// Feed one received byte.
    pub fn feed(&mut self, byte: u8) -> FeedResult {
        if self.ready {
            // Previous line was handed out, start over
            self.line.clear();
            self.ready = false;
            self.overflowed = false;
        }

        if is_terminator(byte) {
            if self.line.is_empty() {
                FeedResult::Ignored
            } else {
                self.ready = true;
                FeedResult::Line
            }
        } else if self.line.push(byte) {
            FeedResult::Stored
        } else if !self.overflowed {
            self.overflowed = true;
            FeedResult::Overflow
        } else {
            FeedResult::Dropped
        }
    }

    /// The line completed by the last [`FeedResult::Line`], terminator excluded.
    pub fn line(&self) -> &[u8] {
        if self.ready {
            self.line.as_bytes()
        } else {
            &[]
        }
    }

    /// Bytes accumulated toward the next line.
    pub fn pending(&self) -> usize {
        if self.ready {
            0
        } else {
            self.line.len()
        }
    }
}

impl<const N: usize> Default for RxFramer<N> {
    fn default() -> Self {
        Self::new()
    }
}
