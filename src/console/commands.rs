//! Command handlers

use core::fmt::Write;

use super::parser::ParsedCommand;
use super::ConsoleError;
use crate::buffer::Printable;
use crate::config::{find_param, find_params_matching, ParamSetError, RX_LINE_SIZE, PARAMS};
use crate::link::Endpoint;

/// Handler signature
pub type Handler = fn(&ParsedCommand<'_>, &dyn Endpoint, &mut dyn Write) -> Result<(), ConsoleError>;

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub brief: &'static str,
    pub handler: Handler,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "help", brief: "List commands", handler: cmd_help },
    CommandDescriptor { name: "send", brief: "Send string over UART", handler: cmd_send },
    CommandDescriptor { name: "read", brief: "Read last received message", handler: cmd_read },
    CommandDescriptor { name: "show", brief: "Show parameters", handler: cmd_show },
    CommandDescriptor { name: "set", brief: "Set parameter value", handler: cmd_set },
    CommandDescriptor { name: "stats", brief: "Link statistics", handler: cmd_stats },
];

/// Execute a parsed command
pub fn execute(cmd: &ParsedCommand<'_>, link: &dyn Endpoint, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if cmd.command.is_empty() {
        return Ok(());
    }

    let handler = COMMANDS
        .iter()
        .find(|c| c.name == cmd.command)
        .ok_or(ConsoleError::UnknownCommand)?;

    (handler.handler)(cmd, link, out)
}

// --- Command Implementations ---

fn cmd_help(cmd: &ParsedCommand<'_>, _link: &dyn Endpoint, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if let Some(name) = cmd.arg(0) {
        let c = COMMANDS
            .iter()
            .find(|c| c.name == name)
            .ok_or(ConsoleError::UnknownCommand)?;
        let _ = writeln!(out, "{}: {}", c.name, c.brief);
    } else {
        for c in COMMANDS {
            let _ = writeln!(out, "  {:<8} {}", c.name, c.brief);
        }
    }
    Ok(())
}

fn cmd_send(cmd: &ParsedCommand<'_>, link: &dyn Endpoint, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if cmd.argc != 1 {
        let _ = writeln!(out, "Usage: send \"your string\"");
        return Err(ConsoleError::Usage);
    }
    let text = cmd.arg(0).ok_or(ConsoleError::Usage)?;

    let max = link.max_text_len();
    if text.len() > max {
        return Err(ConsoleError::TooLong { max });
    }

    link.send_text(text)?;
    let _ = writeln!(out, "Sent successfully: {}", text);
    Ok(())
}

fn cmd_read(_cmd: &ParsedCommand<'_>, link: &dyn Endpoint, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let mut line = [0u8; RX_LINE_SIZE];
    let len = link.read_last(&mut line);
    let _ = writeln!(out, "Last received message: {}", Printable(&line[..len]));
    Ok(())
}

fn cmd_show(cmd: &ParsedCommand<'_>, link: &dyn Endpoint, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let config = link.config();

    match cmd.arg(0) {
        Some(pattern) if pattern.ends_with('*') => {
            for p in find_params_matching(pattern) {
                let _ = writeln!(out, "{}={}", p.name, (p.get_fn)(config));
            }
        }
        Some(name) => {
            let p = find_param(name).ok_or(ConsoleError::UnknownCommand)?;
            let _ = writeln!(out, "{}={}", p.name, (p.get_fn)(config));
        }
        None => {
            for p in PARAMS {
                let _ = writeln!(out, "{}={}  ({})", p.name, (p.get_fn)(config), p.brief);
            }
        }
    }

    Ok(())
}

fn cmd_set(cmd: &ParsedCommand<'_>, link: &dyn Endpoint, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if cmd.argc != 2 {
        let _ = writeln!(out, "Usage: set <param> <value>");
        return Err(ConsoleError::Usage);
    }
    let name = cmd.arg(0).ok_or(ConsoleError::Usage)?;
    let value = cmd.arg(1).ok_or(ConsoleError::Usage)?;

    let param = find_param(name).ok_or(ConsoleError::UnknownCommand)?;
    let stored = param.apply(link.config(), value).map_err(|e| match e {
        ParamSetError::Invalid => ConsoleError::InvalidValue,
        ParamSetError::OutOfRange => ConsoleError::OutOfRange,
    })?;

    let _ = writeln!(out, "{}={}", param.name, stored);
    Ok(())
}

fn cmd_stats(_cmd: &ParsedCommand<'_>, link: &dyn Endpoint, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let s = link.stats();

    let _ = writeln!(out, "rx lines:      {}", s.lines_received);
    let _ = writeln!(out, "rx dropped:    {} bytes", s.rx_dropped);
    let _ = writeln!(out, "tx ok:         {}", s.sends_ok);
    let _ = writeln!(out, "tx timeouts:   {}", s.send_timeouts);
    let _ = writeln!(out, "tx not ready:  {}", s.not_ready);
    Ok(())
}
