//! Hardware seams for the link.
//!
//! Business logic stays in [`crate::link`]; implementations of these
//! traits are just I/O. All methods take `&self` because the same
//! transport is touched from the interrupt context and from callers.

/// Serial port primitives.
pub trait Transport {
    /// Device is initialized and usable.
    fn is_ready(&self) -> bool;

    /// Blocking write of one byte into the TX FIFO.
    fn send_byte(&self, byte: u8);

    /// Non-blocking read of one byte from the RX FIFO.
    fn read_byte(&self) -> Option<u8>;

    /// Hardware reports the transmitter ready again (last byte shifted out).
    fn tx_complete(&self) -> bool;

    fn enable_tx_notify(&self);
    fn disable_tx_notify(&self);
    fn enable_rx_notify(&self);
    fn disable_rx_notify(&self);

    /// Host side asserted its handshake line (DTR).
    fn host_connected(&self) -> bool;
}

/// Time and scheduling primitives.
pub trait Clock {
    /// Monotonic microseconds since boot.
    fn now_us(&self) -> u64;

    /// Busy-wait; used for inter-character pacing.
    fn delay_us(&self, us: u32);

    /// Yield the processor for at least `ms` milliseconds.
    fn sleep_ms(&self, ms: u32);

    /// Block the caller until [`Clock::unpark`] or `max_us` elapses.
    ///
    /// May return early; callers re-check their condition.
    fn park(&self, max_us: u64);

    /// Wake a parked caller. Must be safe to call from the interrupt context.
    fn unpark(&self);
}

impl<T: Transport + ?Sized> Transport for &T {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
    fn send_byte(&self, byte: u8) {
        (**self).send_byte(byte)
    }
    fn read_byte(&self) -> Option<u8> {
        (**self).read_byte()
    }
    fn tx_complete(&self) -> bool {
        (**self).tx_complete()
    }
    fn enable_tx_notify(&self) {
        (**self).enable_tx_notify()
    }
    fn disable_tx_notify(&self) {
        (**self).disable_tx_notify()
    }
    fn enable_rx_notify(&self) {
        (**self).enable_rx_notify()
    }
    fn disable_rx_notify(&self) {
        (**self).disable_rx_notify()
    }
    fn host_connected(&self) -> bool {
        (**self).host_connected()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
    fn delay_us(&self, us: u32) {
        (**self).delay_us(us)
    }
    fn sleep_ms(&self, ms: u32) {
        (**self).sleep_ms(ms)
    }
    fn park(&self, max_us: u64) {
        (**self).park(max_us)
    }
    fn unpark(&self) {
        (**self).unpark()
    }
}
