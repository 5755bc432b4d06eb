//! Global log stream instance.
//!
//! Single producer (UART interrupt context), single consumer (log drain).

use crate::logging::LogStream;

/// Records emitted from the UART interrupt context.
pub static IRQ_LOG: LogStream = LogStream::new();
