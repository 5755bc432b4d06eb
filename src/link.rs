//! The UART link: receive framer and transmit coordinator around one transport.
//!
//! # Contexts
//!
//! ```text
//! UART IRQ ──▶ on_interrupt() ──▶ RxFramer ──▶ LineSlot ──▶ read_last()
//!                    │
//!                    └──▶ TxGate::complete ──▶ CompletionSignal ──▶ send()
//! ```
//!
//! `on_interrupt` is the only code that runs in the interrupt context.
//! Everything else is caller context: console commands and startup.
//! At most one send is in flight; further callers poll every
//! `idle_poll_ms` until the gate returns to idle.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::buffer::{Printable, SendBuffer};
use crate::config::{LinkConfig, GREETING, RX_LINE_SIZE, TX_BUFFER_SIZE};
use crate::error::LinkError;
use crate::framer::{FeedResult, RxFramer};
use crate::{irq_info, irq_warn};
use crate::last_line::LineSlot;
use crate::logging::LogStream;
use crate::signal::{CompletionSignal, TxGate, TxPhase};
use crate::stats::{LinkStats, StatsSnapshot};
use crate::transport::{Clock, Transport};

/// What the console needs from a link.
pub trait Endpoint {
    /// Send `text` followed by CR LF and wait for confirmation.
    fn send_text(&self, text: &str) -> Result<(), LinkError>;

    /// Copy the last received line into `out`, returning its length.
    fn read_last(&self, out: &mut [u8]) -> usize;

    /// Longest text `send_text` accepts.
    fn max_text_len(&self) -> usize;

    fn stats(&self) -> StatsSnapshot;

    fn config(&self) -> &LinkConfig;
}

/// Line-oriented UART link.
///
/// `RX` is the receive line buffer capacity, `TX` the send buffer
/// capacity (payload + CR LF).
pub struct UartLink<'a, T, C, const RX: usize = RX_LINE_SIZE, const TX: usize = TX_BUFFER_SIZE> {
    transport: T,
    clock: C,
    config: &'a LinkConfig,
    log: &'a LogStream,

    /// Owned by whoever holds `in_irq`.
    framer: UnsafeCell<RxFramer<RX>>,
    in_irq: AtomicBool,
    last_line: LineSlot<RX>,

    gate: TxGate,
    tx_done: CompletionSignal,
    /// Owned by whoever holds `gate`.
    send_buf: UnsafeCell<SendBuffer<TX>>,

    stats: LinkStats,
}

// SAFETY: the two UnsafeCell fields are each guarded by an atomic token:
// `framer` by `in_irq` (swap to acquire), `send_buf` by `gate`
// (`try_begin` to acquire). No reference to either escapes the
// section that holds its token.
unsafe impl<T: Sync, C: Sync, const RX: usize, const TX: usize> Sync for UartLink<'_, T, C, RX, TX> {}
unsafe impl<T: Send, C: Send, const RX: usize, const TX: usize> Send for UartLink<'_, T, C, RX, TX> {}

impl<'a, T: Transport, C: Clock, const RX: usize, const TX: usize> UartLink<'a, T, C, RX, TX> {
    pub fn new(transport: T, clock: C, config: &'a LinkConfig, log: &'a LogStream) -> Self {
        Self {
            transport,
            clock,
            config,
            log,
            framer: UnsafeCell::new(RxFramer::new()),
            in_irq: AtomicBool::new(false),
            last_line: LineSlot::new(),
            gate: TxGate::new(),
            tx_done: CompletionSignal::new(),
            send_buf: UnsafeCell::new(SendBuffer::new()),
            stats: LinkStats::new(),
        }
    }

    /// Startup sequence.
    ///
    /// Fails only if the device is not ready. Blocks until the host
    /// asserts DTR, enables receive notifications, then sends the
    /// greeting; a greeting that is not confirmed is logged, not fatal.
    pub fn start(&self) -> Result<(), LinkError> {
        if !self.transport.is_ready() {
            log::error!("UART device not ready");
            self.stats.record_not_ready();
            return Err(LinkError::NotReady);
        }

        self.wait_for_host();

        self.transport.enable_rx_notify();
        log::info!("UART Communication Ready");

        if let Err(e) = self.send(GREETING) {
            log::warn!("greeting not confirmed: {}", e);
        }

        Ok(())
    }

    /// Stop receiving. Pairs with [`UartLink::start`].
    ///
    /// The last published line stays readable; a send in flight is not
    /// affected.
    pub fn stop(&self) {
        self.transport.disable_rx_notify();
        log::info!("UART Communication Stopped");
    }

    /// Poll the DTR line until the host connects.
    pub fn wait_for_host(&self) {
        while !self.transport.host_connected() {
            self.clock.sleep_ms(self.config.dtr_poll_ms());
        }
        log::debug!("host connected (DTR)");
    }

    /// Send raw bytes and wait for hardware confirmation.
    ///
    /// Any length the transport can carry; no terminator is added.
    pub fn send(&self, payload: &[u8]) -> Result<(), LinkError> {
        self.check_ready()?;
        let session = self.begin_tx();
        self.transmit(payload, session)
    }

    /// Send `text` + CR LF through the send buffer.
    ///
    /// A text longer than `TX - 2` is refused before any shared state or
    /// the transport is touched.
    pub fn send_line(&self, text: &[u8]) -> Result<(), LinkError> {
        SendBuffer::<TX>::check(text.len())?;
        self.check_ready()?;

        let session = self.begin_tx();

        // SAFETY: `session` holds the gate, which owns `send_buf`.
        let buf = unsafe { &mut *self.send_buf.get() };
        let frame = buf.load_line(text)?;

        self.transmit(frame, session)
    }

    /// Copy the last received line into `out`.
    pub fn read_last(&self, out: &mut [u8]) -> usize {
        self.last_line.read(out)
    }

    /// A send is in flight.
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Interrupt/event entry point.
    ///
    /// Drains the RX FIFO through the framer, then completes an armed
    /// send if the transmitter reports ready. Never blocks. A nested or
    /// concurrent call returns immediately; the outer call picks up any
    /// remaining bytes.
    pub fn on_interrupt(&self) {
        if self.in_irq.swap(true, Ordering::Acquire) {
            return;
        }

        self.service_rx();
        self.service_tx();

        self.in_irq.store(false, Ordering::Release);
    }

    fn service_rx(&self) {
        // SAFETY: `in_irq` is held, so this is the only reference.
        let framer = unsafe { &mut *self.framer.get() };

        while let Some(byte) = self.transport.read_byte() {
            match framer.feed(byte) {
                FeedResult::Line => {
                    let line = framer.line();
                    self.last_line.publish(line);
                    self.stats.record_line();

                    if self.config.log_rx() {
                        irq_info!(self.log, self.clock.now_us(), "Received: {}", Printable(line));
                    }
                }
                FeedResult::Overflow => {
                    self.stats.record_rx_drop();
                    irq_warn!(self.log, self.clock.now_us(), "RX line overflow, dropping until terminator");
                }
                FeedResult::Dropped => self.stats.record_rx_drop(),
                FeedResult::Stored | FeedResult::Ignored => {}
            }
        }
    }

    fn service_tx(&self) {
        if self.gate.phase() != TxPhase::Awaiting || !self.transport.tx_complete() {
            return;
        }

        // Lost to a caller that timed out
        if !self.gate.complete() {
            return;
        }

        self.transport.disable_tx_notify();
        self.tx_done.give();
        self.clock.unpark();
    }

    fn check_ready(&self) -> Result<(), LinkError> {
        if self.transport.is_ready() {
            Ok(())
        } else {
            self.stats.record_not_ready();
            Err(LinkError::NotReady)
        }
    }

    /// Wait for the gate, then hold it.
    fn begin_tx(&self) -> TxSession<'_, T, C> {
        while !self.gate.try_begin() {
            self.clock.sleep_ms(self.config.idle_poll_ms());
        }

        TxSession {
            gate: &self.gate,
            done: &self.tx_done,
            transport: &self.transport,
            clock: &self.clock,
            timeout_us: 0,
            state: SessionState::Draining,
        }
    }

    fn transmit(&self, bytes: &[u8], mut session: TxSession<'_, T, C>) -> Result<(), LinkError> {
        self.transport.enable_tx_notify();

        let delay_us = self.config.char_delay_us();
        for &byte in bytes {
            self.transport.send_byte(byte);
            if delay_us > 0 {
                self.clock.delay_us(delay_us);
            }
        }

        let timeout_us = self.config.tx_timeout_ms() as u64 * 1000;
        session.arm(timeout_us);

        if self.tx_done.take(&self.clock, timeout_us) {
            session.finish();
            self.stats.record_send();
            return Ok(());
        }

        if session.cancel() {
            self.stats.record_timeout();
            log::warn!("TX not confirmed within {} ms", self.config.tx_timeout_ms());
            return Err(LinkError::Timeout);
        }

        // Interrupt confirmed right at the deadline
        self.stats.record_send();
        Ok(())
    }
}

impl<T: Transport, C: Clock, const RX: usize, const TX: usize> Endpoint for UartLink<'_, T, C, RX, TX> {
    fn send_text(&self, text: &str) -> Result<(), LinkError> {
        self.send_line(text.as_bytes())
    }

    fn read_last(&self, out: &mut [u8]) -> usize {
        UartLink::read_last(self, out)
    }

    fn max_text_len(&self) -> usize {
        SendBuffer::<TX>::MAX_PAYLOAD
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn config(&self) -> &LinkConfig {
        self.config
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Gate held, bytes going out.
    Draining,
    /// Gate armed, the interrupt context may complete it.
    Armed,
    /// Gate handed back.
    Done,
}

/// Holds the transmit gate for one send.
///
/// Dropping a session that still owns the gate disables the transmit
/// notification and releases the gate, so early returns and unwinds
/// cannot leave the link busy.
struct TxSession<'l, T: Transport, C: Clock> {
    gate: &'l TxGate,
    done: &'l CompletionSignal,
    transport: &'l T,
    clock: &'l C,
    timeout_us: u64,
    state: SessionState,
}

impl<T: Transport, C: Clock> TxSession<'_, T, C> {
    fn arm(&mut self, timeout_us: u64) {
        self.timeout_us = timeout_us;
        self.gate.arm();
        self.state = SessionState::Armed;
    }

    /// Signal taken; the send is over.
    fn finish(&mut self) {
        self.gate.release();
        self.state = SessionState::Done;
    }

    /// Stop waiting after a timeout.
    ///
    /// Returns `false` if the interrupt context completed first; the
    /// send then counts as confirmed.
    fn cancel(&mut self) -> bool {
        let cancelled = self.gate.cancel();
        if cancelled {
            self.transport.disable_tx_notify();
        } else {
            self.collect();
        }
        self.gate.release();
        self.state = SessionState::Done;
        cancelled
    }

    /// Consume the signal of a completed send.
    ///
    /// `complete` and `give` are back to back in the interrupt context,
    /// so the wait is short.
    fn collect(&self) {
        if !self.done.take(self.clock, self.timeout_us) {
            log::error!("TX completed without signal");
        }
    }
}

impl<T: Transport, C: Clock> Drop for TxSession<'_, T, C> {
    fn drop(&mut self) {
        match self.state {
            SessionState::Draining => {
                self.transport.disable_tx_notify();
                self.gate.release();
            }
            SessionState::Armed => {
                self.cancel();
            }
            SessionState::Done => {}
        }
    }
}
