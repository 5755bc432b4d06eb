//! Host platform: runs the link without hardware.
//!
//! - [`StdClock`]: `Instant` time, condition-variable parking
//! - [`LoopbackUart`]: every transmitted byte comes back on RX
//! - [`spawn_irq_pump`]: a thread standing in for the UART interrupt

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::transport::{Clock, Transport};

/// Clock backed by the OS.
pub struct StdClock {
    epoch: Instant,
    token: Mutex<bool>,
    wake: Condvar,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            token: Mutex::new(false),
            wake: Condvar::new(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_us(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }

    fn delay_us(&self, us: u32) {
        let until = Instant::now() + Duration::from_micros(us as u64);
        while Instant::now() < until {
            std::hint::spin_loop();
        }
    }

    fn sleep_ms(&self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }

    fn park(&self, max_us: u64) {
        let mut token = self.token.lock().unwrap_or_else(|e| e.into_inner());
        if !*token {
            token = self
                .wake
                .wait_timeout(token, Duration::from_micros(max_us))
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
        *token = false;
    }

    fn unpark(&self) {
        let mut token = self.token.lock().unwrap_or_else(|e| e.into_inner());
        *token = true;
        self.wake.notify_all();
    }
}

/// Loopback transport: TX feeds RX.
///
/// Transmit completes as soon as the notification is enabled, like a
/// UART whose shift register is always empty.
pub struct LoopbackUart {
    rx: Mutex<VecDeque<u8>>,
    rx_notify: AtomicBool,
    tx_notify: AtomicBool,
    dtr: AtomicBool,
}

impl LoopbackUart {
    /// Receive FIFO depth; bytes beyond it are lost.
    pub const FIFO_SIZE: usize = 1024;

    pub fn new() -> Self {
        Self {
            rx: Mutex::new(VecDeque::with_capacity(Self::FIFO_SIZE)),
            rx_notify: AtomicBool::new(false),
            tx_notify: AtomicBool::new(false),
            dtr: AtomicBool::new(true),
        }
    }

    /// Inject bytes as if received from the wire.
    pub fn inject(&self, bytes: &[u8]) {
        let mut rx = self.rx.lock().unwrap_or_else(|e| e.into_inner());
        for &b in bytes {
            if rx.len() < Self::FIFO_SIZE {
                rx.push_back(b);
            }
        }
    }

    pub fn set_dtr(&self, on: bool) {
        self.dtr.store(on, Ordering::Release);
    }
}

impl Default for LoopbackUart {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LoopbackUart {
    fn is_ready(&self) -> bool {
        true
    }

    fn send_byte(&self, byte: u8) {
        self.inject(&[byte]);
    }

    fn read_byte(&self) -> Option<u8> {
        if !self.rx_notify.load(Ordering::Acquire) {
            return None;
        }
        self.rx.lock().unwrap_or_else(|e| e.into_inner()).pop_front()
    }

    fn tx_complete(&self) -> bool {
        self.tx_notify.load(Ordering::Acquire)
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
        self.dtr.load(Ordering::Acquire)
    }
}

/// Handle to a running interrupt pump; stops the thread on drop.
pub struct IrqPump {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl IrqPump {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for IrqPump {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Call `service` every `period` on a dedicated thread.
///
/// `service` is normally `UartLink::on_interrupt`.
pub fn spawn_irq_pump<F>(period: Duration, service: F) -> IrqPump
where
    F: Fn() + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);

    let handle = thread::Builder::new()
        .name("uart-irq".into())
        .spawn(move || {
            while !flag.load(Ordering::Acquire) {
                service();
                thread::sleep(period);
            }
        })
        .ok();

    if handle.is_none() {
        log::error!("failed to spawn interrupt pump thread");
    }

    IrqPump { stop, handle }
}
