//! Shared test fixtures: a scriptable UART and a running link.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rust_uart_link::host::{spawn_irq_pump, IrqPump, StdClock};
use rust_uart_link::{LinkConfig, LogStream, Transport, UartLink};

/// Transport that records what is sent and lets tests decide the rest.
pub struct MockUart {
    sent: Mutex<Vec<u8>>,
    rx: Mutex<VecDeque<u8>>,
    ready: AtomicBool,
    completes: AtomicBool,
    dtr: AtomicBool,
    rx_notify: AtomicBool,
    tx_notify: AtomicBool,
    tx_notify_enables: AtomicUsize,
}

impl MockUart {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            rx: Mutex::new(VecDeque::new()),
            ready: AtomicBool::new(true),
            completes: AtomicBool::new(true),
            dtr: AtomicBool::new(true),
            rx_notify: AtomicBool::new(false),
            tx_notify: AtomicBool::new(false),
            tx_notify_enables: AtomicUsize::new(0),
        }
    }

    pub fn sent(&self) -> Vec<u8> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn inject(&self, bytes: &[u8]) {
        self.rx.lock().unwrap().extend(bytes.iter().copied());
    }

    pub fn set_ready(&self, on: bool) {
        self.ready.store(on, Ordering::SeqCst);
    }

    /// When off, the transmitter never reports complete.
    pub fn set_completes(&self, on: bool) {
        self.completes.store(on, Ordering::SeqCst);
    }

    pub fn set_dtr(&self, on: bool) {
        self.dtr.store(on, Ordering::SeqCst);
    }

    pub fn tx_notify_enabled(&self) -> bool {
        self.tx_notify.load(Ordering::SeqCst)
    }

    pub fn tx_notify_enables(&self) -> usize {
        self.tx_notify_enables.load(Ordering::SeqCst)
    }

    pub fn rx_pending(&self) -> usize {
        self.rx.lock().unwrap().len()
    }
}

impl Transport for MockUart {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn send_byte(&self, byte: u8) {
        self.sent.lock().unwrap().push(byte);
    }

    fn read_byte(&self) -> Option<u8> {
        if !self.rx_notify.load(Ordering::SeqCst) {
            return None;
        }
        self.rx.lock().unwrap().pop_front()
    }

    fn tx_complete(&self) -> bool {
        self.tx_notify.load(Ordering::SeqCst) && self.completes.load(Ordering::SeqCst)
    }

    fn enable_tx_notify(&self) {
        self.tx_notify_enables.fetch_add(1, Ordering::SeqCst);
        self.tx_notify.store(true, Ordering::SeqCst);
    }

    fn disable_tx_notify(&self) {
        self.tx_notify.store(false, Ordering::SeqCst);
    }

    fn enable_rx_notify(&self) {
        self.rx_notify.store(true, Ordering::SeqCst);
    }

    fn disable_rx_notify(&self) {
        self.rx_notify.store(false, Ordering::SeqCst);
    }

    fn host_connected(&self) -> bool {
        self.dtr.load(Ordering::SeqCst)
    }
}

pub type TestLink = UartLink<'static, MockUart, StdClock>;

/// A link with its own config and log stream, plus a running pump.
pub struct Rig {
    pub link: Arc<TestLink>,
    pub config: &'static LinkConfig,
    pub log: &'static LogStream,
    pump: Option<IrqPump>,
}

impl Rig {
    /// Link created, pump running, not started.
    pub fn new() -> Self {
        let config: &'static LinkConfig = Box::leak(Box::new(LinkConfig::new()));
        let log: &'static LogStream = Box::leak(Box::new(LogStream::new()));
        let link = Arc::new(UartLink::new(MockUart::new(), StdClock::new(), config, log));

        let irq_link = Arc::clone(&link);
        let pump = spawn_irq_pump(Duration::from_micros(100), move || irq_link.on_interrupt());

        Self {
            link,
            config,
            log,
            pump: Some(pump),
        }
    }

    /// Link started (greeting sent and cleared from the record).
    pub fn started() -> Self {
        let rig = Self::new();
        rig.link.start().unwrap();
        rig.uart().clear_sent();
        rig
    }

    pub fn uart(&self) -> &MockUart {
        self.link.transport()
    }

    pub fn stop_pump(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.stop();
        }
    }
}

/// Poll `cond` until it holds or a second passes.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(1);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

pub fn last_line(link: &TestLink) -> Vec<u8> {
    let mut buf = [0u8; 256];
    let len = link.read_last(&mut buf);
    buf[..len].to_vec()
}
