//! Link counters.
//!
//! Written from both contexts, read by the console `stats` command.
//! Counters only grow; they are never cleared after boot.

use core::sync::atomic::{AtomicU32, Ordering};

/// Thread-safe link statistics.
pub struct LinkStats {
    /// Lines published by the receive framer.
    lines_received: AtomicU32,

    /// Bytes discarded because a line outgrew the buffer.
    rx_dropped: AtomicU32,

    /// Sends confirmed by the hardware.
    sends_ok: AtomicU32,

    /// Sends that gave up waiting for confirmation.
    send_timeouts: AtomicU32,

    /// Sends refused because the device was not ready.
    not_ready: AtomicU32,
}

impl LinkStats {
    pub const fn new() -> Self {
        Self {
            lines_received: AtomicU32::new(0),
            rx_dropped: AtomicU32::new(0),
            sends_ok: AtomicU32::new(0),
            send_timeouts: AtomicU32::new(0),
            not_ready: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn record_line(&self) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rx_drop(&self) {
        self.rx_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_send(&self) {
        self.sends_ok.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_timeout(&self) {
        self.send_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_not_ready(&self) {
        self.not_ready.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_received: self.lines_received.load(Ordering::Relaxed),
            rx_dropped: self.rx_dropped.load(Ordering::Relaxed),
            sends_ok: self.sends_ok.load(Ordering::Relaxed),
            send_timeouts: self.send_timeouts.load(Ordering::Relaxed),
            not_ready: self.not_ready.load(Ordering::Relaxed),
        }
    }
}

impl Default for LinkStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub lines_received: u32,
    pub rx_dropped: u32,
    pub sends_ok: u32,
    pub send_timeouts: u32,
    pub not_ready: u32,
}
