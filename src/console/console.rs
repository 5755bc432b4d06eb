//! Console line editor driving the command table

use core::fmt::Write;

use super::{execute, parse_line, ConsoleError};
use crate::buffer::LineBuffer;
use crate::link::Endpoint;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Console input line capacity (bytes, including the reserved slot).
pub const CONSOLE_LINE_SIZE: usize = 320;

/// Console state machine
pub struct Console {
    line: LineBuffer<CONSOLE_LINE_SIZE>,
    escape_state: EscapeState,
    /// Last byte was CR; a following LF is the same line end.
    after_cr: bool,
}

#[derive(Clone, Copy, PartialEq)]
enum EscapeState {
    Normal,
    Escape,  // Got ESC
    Bracket, // Got ESC [
}

impl Console {
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            escape_state: EscapeState::Normal,
            after_cr: false,
        }
    }

    /// Process a single input byte
    ///
    /// Returns Some(result) if a command ran, None if more input needed.
    /// Errors are printed here; the result is for the caller's bookkeeping.
    pub fn process_byte(
        &mut self,
        byte: u8,
        link: &dyn Endpoint,
        out: &mut dyn Write,
    ) -> Option<Result<(), ConsoleError>> {
        let after_cr = core::mem::replace(&mut self.after_cr, byte == b'\r');

        match self.escape_state {
            EscapeState::Normal => {
                if byte == b'\n' && after_cr {
                    return None;
                }
                self.process_normal(byte, link, out)
            }
            EscapeState::Escape => {
                self.escape_state = if byte == b'[' {
                    EscapeState::Bracket
                } else {
                    EscapeState::Normal
                };
                None
            }
            EscapeState::Bracket => {
                // Arrow keys and friends are not supported; swallow the final byte
                if (0x40..=0x7E).contains(&byte) {
                    self.escape_state = EscapeState::Normal;
                }
                None
            }
        }
    }

    fn process_normal(
        &mut self,
        byte: u8,
        link: &dyn Endpoint,
        out: &mut dyn Write,
    ) -> Option<Result<(), ConsoleError>> {
        match byte {
            // Enter
            b'\r' | b'\n' => {
                let _ = writeln!(out);

                if self.line.is_empty() {
                    self.print_prompt(out);
                    return None;
                }

                let cmd = parse_line(self.line.as_str());
                let result = execute(&cmd, link, out);
                if let Err(e) = &result {
                    let _ = writeln!(out, "{}", e);
                }

                self.line.clear();
                self.print_prompt(out);
                Some(result)
            }

            // Backspace
            0x7F | 0x08 => {
                if !self.line.is_empty() {
                    self.line.backspace();
                    let _ = write!(out, "\x08 \x08");
                }
                None
            }

            // Escape
            0x1B => {
                self.escape_state = EscapeState::Escape;
                None
            }

            // Ctrl+C
            0x03 => {
                let _ = writeln!(out, "^C");
                self.line.clear();
                self.print_prompt(out);
                None
            }

            // Ctrl+U (clear line)
            0x15 => {
                for _ in 0..self.line.len() {
                    let _ = write!(out, "\x08 \x08");
                }
                self.line.clear();
                None
            }

            // Printable character
            0x20..=0x7E => {
                if self.line.push(byte) {
                    let _ = write!(out, "{}", byte as char);
                }
                None
            }

            _ => None,
        }
    }

    /// Current unsubmitted input.
    pub fn pending(&self) -> &str {
        self.line.as_str()
    }

    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = write!(out, "uart> ");
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &mut dyn Write) {
        let _ = writeln!(out, "\r\n{}", VERSION);
        let _ = writeln!(out, "Type 'help' for commands.\r");
        self.print_prompt(out);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
