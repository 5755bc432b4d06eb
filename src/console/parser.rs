//! Command line parser
//!
//! Whitespace-separated tokens; a double-quoted token may contain spaces.
//! Up to 3 arguments are kept, but all of them are counted.

/// Maximum arguments kept per command.
pub const MAX_ARGS: usize = 3;

/// Parsed command
#[derive(Debug, Clone)]
pub struct ParsedCommand<'a> {
    /// The command name (first token)
    pub command: &'a str,
    /// First arguments, in order
    pub args: [Option<&'a str>; MAX_ARGS],
    /// Total number of arguments on the line (may exceed `MAX_ARGS`)
    pub argc: usize,
}

impl<'a> ParsedCommand<'a> {
    pub const fn empty() -> Self {
        Self {
            command: "",
            args: [None; MAX_ARGS],
            argc: 0,
        }
    }

    /// Get argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied().flatten()
    }
}

/// Split off the next token.
///
/// Quotes delimit a token and are not part of it. An unterminated
/// quote runs to the end of the line.
fn next_token(rest: &str) -> Option<(&str, &str)> {
    let rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }

    if let Some(quoted) = rest.strip_prefix('"') {
        return Some(match quoted.find('"') {
            Some(end) => (&quoted[..end], &quoted[end + 1..]),
            None => (quoted, ""),
        });
    }

    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some((&rest[..end], &rest[end..]))
}

/// Parse a command line into command and arguments
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    let mut cmd = ParsedCommand::empty();

    let Some((command, mut rest)) = next_token(line) else {
        return cmd;
    };
    cmd.command = command;

    while let Some((token, tail)) = next_token(rest) {
        if cmd.argc < MAX_ARGS {
            cmd.args[cmd.argc] = Some(token);
        }
        cmd.argc += 1;
        rest = tail;
    }

    cmd
}
