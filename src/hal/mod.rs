//! Hardware Abstraction Layer for ESP-IDF targets.
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Business logic stays in [`crate::link`], HAL is just I/O.

pub mod clock;
pub mod uart;

pub use clock::EspClock;
pub use uart::EspUart;
