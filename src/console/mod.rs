//! Serial console: `send` / `read` plus parameter access.
//!
//! Zero heap allocation - all static buffers.

pub mod commands;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod parser;

pub use commands::{execute, CommandDescriptor, COMMANDS};
pub use console::{Console, VERSION};
pub use error::ConsoleError;
pub use parser::{parse_line, ParsedCommand};
