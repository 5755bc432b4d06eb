//! Module: config
//!
//! Purpose: Runtime configuration for the UART link.
//!
//! Architecture:
//! - `LinkConfig`: timing knobs, all atomics (readable from any context)
//! - `params`: typed descriptor table driving console `show` / `set`
//! - `UartConfig`: board wiring, fixed at startup
//!
//! Safety: Lock-free. No unsafe blocks.

pub mod params;

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

pub use params::{
    find_param, find_params_matching, ParamDescriptor, ParamSetError, ParamType,
    ParamValue, PARAMS,
};

/// Receive line buffer capacity (bytes, including the reserved slot).
pub const RX_LINE_SIZE: usize = 128;

/// Send buffer capacity (bytes, payload + CR LF).
pub const TX_BUFFER_SIZE: usize = 256;

/// Sent once after startup.
pub const GREETING: &[u8] = b"UART initialized and ready for communication!\r\n";

/// Link timing configuration.
pub struct LinkConfig {
    /// Max wait for hardware TX confirmation.
    tx_timeout_ms: AtomicU32,
    /// Pause after every transmitted byte.
    char_delay_us: AtomicU32,
    /// Park interval while another send holds the gate.
    idle_poll_ms: AtomicU32,
    /// DTR polling period during startup.
    dtr_poll_ms: AtomicU32,
    /// Log every received line.
    log_rx: AtomicBool,
}

impl LinkConfig {
    pub const DEFAULT_TX_TIMEOUT_MS: u32 = 100;
    pub const DEFAULT_CHAR_DELAY_US: u32 = 100;
    pub const DEFAULT_IDLE_POLL_MS: u32 = 1;
    pub const DEFAULT_DTR_POLL_MS: u32 = 100;

    pub const fn new() -> Self {
        Self {
            tx_timeout_ms: AtomicU32::new(Self::DEFAULT_TX_TIMEOUT_MS),
            char_delay_us: AtomicU32::new(Self::DEFAULT_CHAR_DELAY_US),
            idle_poll_ms: AtomicU32::new(Self::DEFAULT_IDLE_POLL_MS),
            dtr_poll_ms: AtomicU32::new(Self::DEFAULT_DTR_POLL_MS),
            log_rx: AtomicBool::new(true),
        }
    }

    pub fn tx_timeout_ms(&self) -> u32 {
        self.tx_timeout_ms.load(Ordering::Relaxed)
    }

    pub fn set_tx_timeout_ms(&self, ms: u32) {
        self.tx_timeout_ms.store(ms, Ordering::Relaxed);
    }

    pub fn char_delay_us(&self) -> u32 {
        self.char_delay_us.load(Ordering::Relaxed)
    }

    pub fn set_char_delay_us(&self, us: u32) {
        self.char_delay_us.store(us, Ordering::Relaxed);
    }

    pub fn idle_poll_ms(&self) -> u32 {
        self.idle_poll_ms.load(Ordering::Relaxed)
    }

    pub fn set_idle_poll_ms(&self, ms: u32) {
        self.idle_poll_ms.store(ms, Ordering::Relaxed);
    }

    pub fn dtr_poll_ms(&self) -> u32 {
        self.dtr_poll_ms.load(Ordering::Relaxed)
    }

    pub fn set_dtr_poll_ms(&self, ms: u32) {
        self.dtr_poll_ms.store(ms, Ordering::Relaxed);
    }

    pub fn log_rx(&self) -> bool {
        self.log_rx.load(Ordering::Relaxed)
    }

    pub fn set_log_rx(&self, on: bool) {
        self.log_rx.store(on, Ordering::Relaxed);
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Global link configuration.
pub static CONFIG: LinkConfig = LinkConfig::new();

/// UART wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
    pub rx_pin: u8,
    /// GPIO carrying the host's DTR line.
    pub dtr_pin: u8,
}

impl Default for UartConfig {
    #[cfg(not(feature = "esp32p4"))]
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 17,
            rx_pin: 18,
            dtr_pin: 8,
        }
    }

    #[cfg(feature = "esp32p4")]
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 20,
            rx_pin: 21,
            dtr_pin: 22,
        }
    }
}
