//! Cross-context synchronization for the transmit path.
//!
//! # Hand-off
//!
//! ```text
//! Caller                   TxGate / Signal              Interrupt
//! ──────                   ───────────────              ─────────
//! try_begin()  Idle ──────▶ Draining
//! send bytes
//! arm()        Draining ──▶ Awaiting
//!                           Awaiting ──▶ Completed  ◀── complete() on tx_complete()
//! take(timeout) ◀──────────────────────── give()
//! release()    Completed ─▶ Idle
//! ```
//!
//! The gate is the Busy Flag: `Idle` means free, anything else means a
//! send is in flight. An armed send leaves `Awaiting` exactly once: the
//! interrupt context moves it to `Completed`, or the caller, on timeout,
//! moves it to `Releasing`. Whichever way it went, only the sender
//! returns the gate to `Idle`, after it has consumed the signal. A
//! completion therefore never outlives its send.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::transport::Clock;

/// Transmit phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TxPhase {
    /// No send in flight.
    Idle = 0,
    /// Caller is pushing bytes into the transport.
    Draining = 1,
    /// All bytes written, waiting for the hardware to confirm.
    Awaiting = 2,
    /// Interrupt context confirmed; the signal is (being) given.
    Completed = 3,
    /// Caller gave up waiting and is tearing the send down.
    Releasing = 4,
}

impl TxPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => TxPhase::Draining,
            2 => TxPhase::Awaiting,
            3 => TxPhase::Completed,
            4 => TxPhase::Releasing,
            _ => TxPhase::Idle,
        }
    }
}

/// Mutual-exclusion token serializing sends.
pub struct TxGate {
    phase: AtomicU8,
}

impl TxGate {
    pub const fn new() -> Self {
        Self {
            phase: AtomicU8::new(TxPhase::Idle as u8),
        }
    }

    /// Claim the gate (`Idle` → `Draining`).
    #[inline]
    pub fn try_begin(&self) -> bool {
        self.transition(TxPhase::Idle, TxPhase::Draining)
    }

    /// Last byte written (`Draining` → `Awaiting`).
    ///
    /// From here on the interrupt context may complete the send.
    #[inline]
    pub fn arm(&self) {
        self.phase.store(TxPhase::Awaiting as u8, Ordering::Release);
    }

    /// Confirm an armed send (`Awaiting` → `Completed`).
    ///
    /// Interrupt context only. Fails if the caller already gave up.
    #[inline]
    pub fn complete(&self) -> bool {
        self.transition(TxPhase::Awaiting, TxPhase::Completed)
    }

    /// Give up on an armed send (`Awaiting` → `Releasing`).
    ///
    /// Fails if the interrupt context completed it first.
    #[inline]
    pub fn cancel(&self) -> bool {
        self.transition(TxPhase::Awaiting, TxPhase::Releasing)
    }

    /// Return the gate to `Idle`. Only the sender holding it may call this.
    #[inline]
    pub fn release(&self) {
        self.phase.store(TxPhase::Idle as u8, Ordering::Release);
    }

    #[inline]
    pub fn phase(&self) -> TxPhase {
        TxPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.phase() != TxPhase::Idle
    }

    #[inline]
    fn transition(&self, from: TxPhase, to: TxPhase) -> bool {
        self.phase
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for TxGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Binary semaphore (count 0 or 1).
///
/// `give` never blocks and is safe in the interrupt context.
/// Giving an already-given signal leaves the count at 1.
pub struct CompletionSignal {
    given: AtomicBool,
}

impl CompletionSignal {
    pub const fn new() -> Self {
        Self {
            given: AtomicBool::new(false),
        }
    }

    /// Raise the signal.
    #[inline]
    pub fn give(&self) {
        self.given.store(true, Ordering::Release);
    }

    /// Consume the signal if it is raised.
    #[inline]
    pub fn try_take(&self) -> bool {
        self.given.swap(false, Ordering::AcqRel)
    }

    /// Wait up to `timeout_us` for the signal, parking on `clock`.
    ///
    /// Returns `true` if the signal was taken.
    pub fn take<C: Clock + ?Sized>(&self, clock: &C, timeout_us: u64) -> bool {
        let deadline = clock.now_us().saturating_add(timeout_us);

        loop {
            if self.try_take() {
                return true;
            }

            let now = clock.now_us();
            if now >= deadline {
                // Late give between the last check and the deadline
                return self.try_take();
            }

            clock.park(deadline - now);
        }
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}
