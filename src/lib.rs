//! # RustUartLink
//!
//! Interrupt-driven, line-oriented UART link with a serial console.
//!
//! ## Architecture
//!
//! Two execution contexts share one [`UartLink`]:
//! - Interrupt context: [`UartLink::on_interrupt`] frames received bytes
//!   into lines and confirms transmit completion. Never blocks, logs only
//!   through [`LogStream`] (`irq_*!` macros).
//! - Caller context: console commands and startup. Sends block until the
//!   hardware confirms or the timeout expires; one send at a time.
//!
//! Hardware sits behind [`Transport`] and [`Clock`]. The `std` feature
//! adds a loopback transport for running on a PC; ESP-IDF builds get the
//! real UART driver in `hal`.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod buffer;
pub mod config;
pub mod console;
pub mod error;
pub mod framer;
pub mod last_line;
pub mod link;
pub mod logging;
pub mod log_drain;
pub mod log_globals;
pub mod signal;
pub mod stats;
pub mod transport;

#[cfg(feature = "std")]
pub mod host;

#[cfg(all(target_os = "espidf", feature = "std"))]
pub mod hal;

pub use buffer::{LineBuffer, Printable, SendBuffer};
pub use config::{LinkConfig, UartConfig, CONFIG};
pub use error::LinkError;
pub use framer::{FeedResult, RxFramer};
pub use link::{Endpoint, UartLink};
pub use logging::LogStream;
pub use stats::StatsSnapshot;
pub use transport::{Clock, Transport};
