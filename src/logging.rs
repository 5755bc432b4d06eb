//! Interrupt-safe logging.
//!
//! ```text
//! Interrupt context        LogStream            Caller context
//! ─────────────────        ─────────            ──────────────
//!
//! irq_info!() ──────────▶ [L0][L1][L2] ──────▶ drain_logs() → console
//! non-blocking             lock-free            blocking ok
//! ```
//!
//! The interrupt context never formats into a shared sink and never
//! takes a lock. A full ring drops the record and counts the drop.
//! Caller-context code logs through the `log` facade instead.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 160;

/// Log ring size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 32;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// A single log record.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Microseconds since boot.
    pub timestamp_us: u64,
    pub level: LogLevel,
    /// Valid bytes in `msg`.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    pub const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text; invalid UTF-8 renders as a placeholder.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free single-producer, single-consumer log ring.
///
/// The producer is the interrupt context; the consumer is whichever
/// caller drains it. Records are published only after they are fully
/// written.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: One producer owns slot `write_idx`, one consumer owns slot
// `read_idx`; the indices never alias while the ring is not full, and
// each index is published with Release after its slot is touched.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a record. Never blocks.
    ///
    /// Returns `false` if the ring was full and the record was dropped.
    /// Messages longer than [`MAX_MSG_LEN`] are truncated.
    #[inline]
    pub fn push(&self, timestamp_us: u64, level: LogLevel, msg: &[u8]) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let idx = (write as usize) & Self::MASK;
        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: slot `write` is not visible to the consumer until the
        // store below, and the ring is not full so it is not being read.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Take the oldest record.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: slot was published by the producer's Release store and
        // is not reused until read_idx moves past it.
        let entry = unsafe { (*self.entries.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format into a byte buffer, truncating silently.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = SliceWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// `fmt::Write` over a fixed slice.
pub(crate) struct SliceWriter<'a> {
    pub(crate) buf: &'a mut [u8],
    pub(crate) pos: usize,
}

impl core::fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Interrupt-safe log macro.
///
/// ```ignore
/// irq_log!(LogLevel::Info, IRQ_LOG, now_us, "Received: {}", line);
/// ```
#[macro_export]
macro_rules! irq_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! irq_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::irq_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! irq_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::irq_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}
