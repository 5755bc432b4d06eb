//! UART transport over the ESP-IDF driver.
//!
//! The IDF driver owns the hardware interrupt and its ring buffers.
//! The notify flags gate what the link's interrupt entry point sees:
//! with RX notify off no bytes are handed out, with TX notify off the
//! transmitter never reports complete.

use core::sync::atomic::{AtomicBool, Ordering};

use esp_idf_svc::hal::delay::NON_BLOCK;
use esp_idf_svc::hal::gpio::{AnyIOPin, Input, PinDriver};
use esp_idf_svc::hal::uart::UartDriver;
use esp_idf_svc::sys::{esp, uart_wait_tx_done};

use crate::transport::Transport;

pub struct EspUart<'d> {
    driver: UartDriver<'d>,
    /// DTR from the host, active low. `None` if the board has no DTR line.
    dtr: Option<PinDriver<'d, AnyIOPin, Input>>,
    rx_notify: AtomicBool,
    tx_notify: AtomicBool,
}

// SAFETY: the IDF UART API serializes access to the driver's ring
// buffers internally. The DTR pin is only read.
unsafe impl Sync for EspUart<'_> {}

impl<'d> EspUart<'d> {
    pub fn new(driver: UartDriver<'d>, dtr: Option<PinDriver<'d, AnyIOPin, Input>>) -> Self {
        Self {
            driver,
            dtr,
            rx_notify: AtomicBool::new(false),
            tx_notify: AtomicBool::new(false),
        }
    }
}

impl Transport for EspUart<'_> {
    fn is_ready(&self) -> bool {
        // The driver exists only after a successful install.
        true
    }

    fn send_byte(&self, byte: u8) {
        if let Err(e) = self.driver.write(&[byte]) {
            log::error!("UART write failed: {}", e);
        }
    }

    fn read_byte(&self) -> Option<u8> {
        if !self.rx_notify.load(Ordering::Acquire) {
            return None;
        }

        let mut byte = [0u8; 1];
        match self.driver.read(&mut byte, NON_BLOCK) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn tx_complete(&self) -> bool {
        if !self.tx_notify.load(Ordering::Acquire) {
            return false;
        }

        // Zero ticks: poll without blocking.
        // SAFETY: the port is installed for as long as `driver` lives.
        esp!(unsafe { uart_wait_tx_done(self.driver.port(), 0) }).is_ok()
    }

    fn enable_tx_notify(&self) {
        self.tx_notify.store(true, Ordering::Release);
    }

    fn disable_tx_notify(&self) {
        self.tx_notify.store(false, Ordering::Release);
    }

    fn enable_rx_notify(&self) {
        self.rx_notify.store(true, Ordering::Release);
    }

    fn disable_rx_notify(&self) {
        self.rx_notify.store(false, Ordering::Release);
    }

    fn host_connected(&self) -> bool {
        self.dtr.as_ref().map_or(true, |pin| pin.is_low())
    }
}
