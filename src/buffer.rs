//! Fixed-capacity byte buffers.
//!
//! Two overflow policies, one per direction:
//! - [`LineBuffer`] drops bytes past its limit (receive side, console input)
//! - [`SendBuffer`] rejects a payload that does not fit (transmit side)
//!
//! Zero heap allocation - both live in statics or on the stack.

/// Carriage return, first outbound terminator byte.
pub const CR: u8 = b'\r';

/// Line feed, second outbound terminator byte.
pub const LF: u8 = b'\n';

/// Returns true for bytes that end an inbound line.
#[inline]
pub const fn is_terminator(byte: u8) -> bool {
    byte == CR || byte == LF
}

/// Payload did not fit into a bounded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    /// Largest payload length the buffer accepts.
    pub max: usize,
}

impl core::fmt::Display for CapacityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "payload exceeds {} bytes", self.max)
    }
}

/// Displays raw line bytes, escaping anything outside printable ASCII
/// when the bytes are not valid UTF-8.
pub struct Printable<'b>(pub &'b [u8]);

impl core::fmt::Display for Printable<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use core::fmt::Write;

        if let Ok(s) = core::str::from_utf8(self.0) {
            return f.write_str(s);
        }

        for &b in self.0 {
            if (0x20..=0x7E).contains(&b) {
                f.write_char(b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

/// Accumulating line buffer with drop-on-overflow.
///
/// Holds at most `N - 1` bytes; the last slot is reserved so the
/// contents can always be finalized. Pushing into a full buffer
/// discards the byte and reports it.
pub struct LineBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> LineBuffer<N> {
    /// Maximum number of bytes the buffer keeps.
    pub const LIMIT: usize = N - 1;

    /// Create empty buffer
    pub const fn new() -> Self {
        assert!(N >= 2, "Line buffer needs room for one byte and the reserved slot");

        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    /// Append a byte.
    ///
    /// Returns `false` if the byte was dropped (buffer full).
    #[inline]
    pub fn push(&mut self, byte: u8) -> bool {
        if self.len < Self::LIMIT {
            self.buf[self.len] = byte;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Remove last byte
    pub fn backspace(&mut self) {
        if self.len > 0 {
            self.len -= 1;
        }
    }

    /// Reset the write cursor to zero.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Contents as a string slice (empty if not UTF-8).
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= Self::LIMIT
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outbound buffer with reject-on-overflow.
///
/// Holds one payload followed by CR LF. A payload longer than
/// `N - 2` is refused before the buffer is touched.
pub struct SendBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> SendBuffer<N> {
    /// Longest payload that still leaves room for CR LF.
    pub const MAX_PAYLOAD: usize = N - 2;

    pub const fn new() -> Self {
        assert!(N > 2, "Send buffer must hold at least one byte plus CR LF");

        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    /// Check a payload length without mutating anything.
    #[inline]
    pub const fn check(payload_len: usize) -> Result<(), CapacityError> {
        if payload_len > Self::MAX_PAYLOAD {
            Err(CapacityError { max: Self::MAX_PAYLOAD })
        } else {
            Ok(())
        }
    }

    /// Load `payload` followed by CR LF.
    ///
    /// On error the previous contents are left untouched.
    pub fn load_line(&mut self, payload: &[u8]) -> Result<&[u8], CapacityError> {
        Self::check(payload.len())?;

        let n = payload.len();
        self.buf[..n].copy_from_slice(payload);
        self.buf[n] = CR;
        self.buf[n + 1] = LF;
        self.len = n + 2;
        Ok(&self.buf[..self.len])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<const N: usize> Default for SendBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
