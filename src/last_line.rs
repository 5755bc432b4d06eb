//! Latest-value mailbox for received lines.
//!
//! Single writer (interrupt context), any number of readers.
//! Sequence-locked: the writer never waits, readers retry until they
//! copy out a line that was not overwritten underneath them. A reader
//! therefore sees either the previous line or the new one, never a mix.
//!
//! Bytes are stored as atomics so a concurrent copy is not a data race.

use core::sync::atomic::{fence, AtomicU32, AtomicU8, AtomicUsize, Ordering};

/// Last published line.
pub struct LineSlot<const N: usize> {
    /// Odd while a publish is in progress.
    seq: AtomicU32,
    len: AtomicUsize,
    bytes: [AtomicU8; N],
}

impl<const N: usize> LineSlot<N> {
    pub const fn new() -> Self {
        Self {
            seq: AtomicU32::new(0),
            len: AtomicUsize::new(0),
            bytes: [const { AtomicU8::new(0) }; N],
        }
    }

    /// Replace the stored line. Input beyond `N` bytes is cut off.
    ///
    /// Only one context may publish.
    pub fn publish(&self, line: &[u8]) {
        let n = line.len().min(N);
        let seq = self.seq.load(Ordering::Relaxed);

        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        for (slot, &byte) in self.bytes.iter().zip(&line[..n]) {
            slot.store(byte, Ordering::Relaxed);
        }
        self.len.store(n, Ordering::Relaxed);

        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    /// Copy the current line into `out`, returning its length.
    ///
    /// Truncates if `out` is shorter than the stored line.
    pub fn read(&self, out: &mut [u8]) -> usize {
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before & 1 == 1 {
                core::hint::spin_loop();
                continue;
            }

            let len = self.len.load(Ordering::Relaxed).min(out.len());
            for (dst, src) in out[..len].iter_mut().zip(&self.bytes) {
                *dst = src.load(Ordering::Relaxed);
            }

            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == before {
                return len;
            }
            core::hint::spin_loop();
        }
    }

    /// Number of lines published since boot.
    #[inline]
    pub fn published(&self) -> u32 {
        self.seq.load(Ordering::Acquire) / 2
    }

    /// Nothing has been published yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.published() == 0
    }
}

impl<const N: usize> Default for LineSlot<N> {
    fn default() -> Self {
        Self::new()
    }
}
