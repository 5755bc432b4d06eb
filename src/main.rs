//! RustUartLink - Main entry point
//!
//! 1. Initialize logging and the UART transport
//! 2. Start the interrupt pump (drives `UartLink::on_interrupt`)
//! 3. Start the log drain thread
//! 4. Run the startup sequence (DTR wait, greeting)
//! 5. Serve the console on stdin/stdout
//!
//! On ESP-IDF the transport is UART1 through the IDF driver; on a PC it
//! is a loopback, so `send "x"` followed by `read` shows `x`.

use std::io::{self, Read, Write as _};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rust_uart_link::console::Console;
use rust_uart_link::host::spawn_irq_pump;
use rust_uart_link::log_drain::drain_logs;
use rust_uart_link::log_globals::IRQ_LOG;
use rust_uart_link::{Clock, Transport, UartLink};

/// Interrupt pump period.
const IRQ_PERIOD: Duration = Duration::from_micros(200);

/// Log drain period.
const DRAIN_PERIOD: Duration = Duration::from_millis(10);

/// Console input poll period when stdin has nothing.
const INPUT_IDLE: Duration = Duration::from_millis(10);

/// `fmt::Write` over an `io::Write`.
struct IoWriter<W: io::Write>(W);

impl<W: io::Write> core::fmt::Write for IoWriter<W> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.write_all(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}

#[cfg(target_os = "espidf")]
fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    if let Err(e) = esp::run() {
        log::error!("startup failed: {}", e);
    }
}

#[cfg(target_os = "espidf")]
mod esp {
    use std::sync::Arc;

    use esp_idf_svc::hal::gpio::{AnyIOPin, PinDriver, Pull};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{config::Config, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;

    use rust_uart_link::hal::{EspClock, EspUart};
    use rust_uart_link::log_globals::IRQ_LOG;
    use rust_uart_link::{UartConfig, UartLink, CONFIG};

    pub fn run() -> Result<(), EspError> {
        let peripherals = Peripherals::take()?;
        let wiring = UartConfig::default();

        // SAFETY: pin numbers come from the board wiring table and are
        // not claimed anywhere else.
        let (tx, rx, dtr) = unsafe {
            (
                AnyIOPin::new(wiring.tx_pin as i32),
                AnyIOPin::new(wiring.rx_pin as i32),
                AnyIOPin::new(wiring.dtr_pin as i32),
            )
        };

        let config = Config::default().baudrate(Hertz(wiring.baud_rate));
        let driver = UartDriver::new(
            peripherals.uart1,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )?;

        let mut dtr = PinDriver::input(dtr)?;
        dtr.set_pull(Pull::Up)?;

        log::info!(
            "UART1 @ {} baud (tx={}, rx={}, dtr={})",
            wiring.baud_rate,
            wiring.tx_pin,
            wiring.rx_pin,
            wiring.dtr_pin
        );

        let link = Arc::new(UartLink::new(
            EspUart::new(driver, Some(dtr)),
            EspClock::new(),
            &CONFIG,
            &IRQ_LOG,
        ));

        super::serve(link);
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use rust_uart_link::host::{LoopbackUart, StdClock};
    use rust_uart_link::CONFIG;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("host mode: loopback transport");

    let link = Arc::new(UartLink::new(
        LoopbackUart::new(),
        StdClock::new(),
        &CONFIG,
        &IRQ_LOG,
    ));

    serve(link);
}

/// Bring the link up and run the console until stdin closes.
fn serve<T, C>(link: Arc<UartLink<'static, T, C>>)
where
    T: Transport + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    let irq_link = Arc::clone(&link);
    let _pump = spawn_irq_pump(IRQ_PERIOD, move || irq_link.on_interrupt());

    spawn_log_drain();

    if link.start().is_err() {
        // Already logged; nothing else can run without the device
        return;
    }

    run_console(&*link);
    link.stop();
}

fn spawn_log_drain() {
    let spawned = thread::Builder::new()
        .name("log-drain".into())
        .spawn(|| loop {
            let mut out = IoWriter(io::stderr());
            drain_logs(&IRQ_LOG, &mut out);
            thread::sleep(DRAIN_PERIOD);
        });

    if let Err(e) = spawned {
        log::error!("failed to spawn log drain: {}", e);
    }
}

fn run_console<T: Transport, C: Clock>(link: &UartLink<'static, T, C>) {
    let mut console = Console::new();
    let mut out = IoWriter(io::stdout());
    let mut stdin = io::stdin();
    let mut byte = [0u8; 1];

    console.print_banner(&mut out);
    let _ = out.0.flush();

    loop {
        match stdin.read(&mut byte) {
            Ok(1) => {
                console.process_byte(byte[0], link, &mut out);
                let _ = out.0.flush();
            }
            // EOF on a PC; the IDF console returns 0 when idle
            Ok(_) if !cfg!(target_os = "espidf") => break,
            Ok(_) => thread::sleep(INPUT_IDLE),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(INPUT_IDLE),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                log::error!("console input failed: {}", e);
                break;
            }
        }
    }
}
