//! Command handler tests

use std::cell::RefCell;

use rust_uart_link::console::commands::{execute, COMMANDS};
use rust_uart_link::console::parser::parse_line;
use rust_uart_link::console::ConsoleError;
use rust_uart_link::{Endpoint, LinkConfig, LinkError, StatsSnapshot};

/// Endpoint that records sends and returns a scripted result.
struct FakeLink {
    sent: RefCell<Vec<String>>,
    last: Vec<u8>,
    fail_with: Option<LinkError>,
    config: LinkConfig,
}

impl FakeLink {
    fn new() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            last: Vec::new(),
            fail_with: None,
            config: LinkConfig::new(),
        }
    }

    fn with_last(line: &[u8]) -> Self {
        Self {
            last: line.to_vec(),
            ..Self::new()
        }
    }

    fn failing(e: LinkError) -> Self {
        Self {
            fail_with: Some(e),
            ..Self::new()
        }
    }
}

impl Endpoint for FakeLink {
    fn send_text(&self, text: &str) -> Result<(), LinkError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.sent.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn read_last(&self, out: &mut [u8]) -> usize {
        let n = self.last.len().min(out.len());
        out[..n].copy_from_slice(&self.last[..n]);
        n
    }

    fn max_text_len(&self) -> usize {
        254
    }

    fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_received: 3,
            sends_ok: 2,
            ..StatsSnapshot::default()
        }
    }

    fn config(&self) -> &LinkConfig {
        &self.config
    }
}

fn run(line: &str, link: &FakeLink) -> (Result<(), ConsoleError>, String) {
    let mut out = String::new();
    let result = execute(&parse_line(line), link, &mut out);
    (result, out)
}

#[test]
fn test_command_registry_has_all_commands() {
    let expected = ["help", "send", "read", "show", "set", "stats"];

    for name in expected {
        assert!(
            COMMANDS.iter().any(|c| c.name == name),
            "Command '{}' should be in registry",
            name
        );
    }
}

#[test]
fn test_execute_unknown_command() {
    let (result, _) = run("foobar", &FakeLink::new());
    assert_eq!(result, Err(ConsoleError::UnknownCommand));
}

#[test]
fn test_execute_empty_line_is_noop() {
    let (result, out) = run("   ", &FakeLink::new());
    assert_eq!(result, Ok(()));
    assert!(out.is_empty());
}

#[test]
fn test_execute_help() {
    let (result, out) = run("help", &FakeLink::new());
    assert!(result.is_ok());
    assert!(out.contains("send"));
    assert!(out.contains("read"));
}

#[test]
fn test_send_quoted_text() {
    let link = FakeLink::new();
    let (result, out) = run("send \"hello world\"", &link);

    assert_eq!(result, Ok(()));
    assert_eq!(*link.sent.borrow(), vec!["hello world".to_string()]);
    assert!(out.contains("Sent successfully: hello world"));
}

#[test]
fn test_send_bare_word() {
    let link = FakeLink::new();
    let (result, _) = run("send ping", &link);

    assert_eq!(result, Ok(()));
    assert_eq!(*link.sent.borrow(), vec!["ping".to_string()]);
}

#[test]
fn test_send_without_argument_prints_usage() {
    let link = FakeLink::new();
    let (result, out) = run("send", &link);

    assert_eq!(result, Err(ConsoleError::Usage));
    assert!(out.contains("Usage: send \"your string\""));
    assert!(link.sent.borrow().is_empty());
}

#[test]
fn test_send_with_two_arguments_is_usage_error() {
    let link = FakeLink::new();
    let (result, _) = run("send hello world", &link);

    assert_eq!(result, Err(ConsoleError::Usage));
    assert!(link.sent.borrow().is_empty());
}

#[test]
fn test_send_too_long_is_rejected_before_link() {
    let link = FakeLink::new();
    let line = format!("send \"{}\"", "a".repeat(255));
    let (result, _) = run(&line, &link);

    assert_eq!(result, Err(ConsoleError::TooLong { max: 254 }));
    assert!(link.sent.borrow().is_empty());
}

#[test]
fn test_send_max_length_accepted() {
    let link = FakeLink::new();
    let line = format!("send \"{}\"", "a".repeat(254));
    let (result, _) = run(&line, &link);

    assert_eq!(result, Ok(()));
    assert_eq!(link.sent.borrow()[0].len(), 254);
}

#[test]
fn test_send_timeout_reports_code() {
    let link = FakeLink::failing(LinkError::Timeout);
    let (result, out) = run("send hi", &link);

    let err = result.unwrap_err();
    assert_eq!(err, ConsoleError::Link(LinkError::Timeout));
    assert_eq!(err.to_string(), "E06: failed to send (error: -11)");
    assert!(!out.contains("Sent successfully"));
}

#[test]
fn test_send_not_ready_reports_code() {
    let link = FakeLink::failing(LinkError::NotReady);
    let (result, _) = run("send hi", &link);

    assert_eq!(result.unwrap_err().to_string(), "E06: failed to send (error: -19)");
}

#[test]
fn test_read_prints_last_line() {
    let link = FakeLink::with_last(b"pong");
    let (result, out) = run("read", &link);

    assert_eq!(result, Ok(()));
    assert_eq!(out, "Last received message: pong\n");
}

#[test]
fn test_read_before_any_line() {
    let (result, out) = run("read", &FakeLink::new());

    assert_eq!(result, Ok(()));
    assert_eq!(out, "Last received message: \n");
}

#[test]
fn test_read_escapes_binary() {
    let link = FakeLink::with_last(&[b'a', 0xC0, b'b']);
    let (_, out) = run("read", &link);

    assert!(out.contains("a\\xc0b"));
}

#[test]
fn test_show_single_param() {
    let (result, out) = run("show link.tx_timeout_ms", &FakeLink::new());

    assert_eq!(result, Ok(()));
    assert_eq!(out, "link.tx_timeout_ms=100\n");
}

#[test]
fn test_show_wildcard() {
    let (_, out) = run("show link.*", &FakeLink::new());

    assert!(out.contains("link.char_delay_us=100"));
    assert!(out.contains("link.log_rx=true"));
    assert_eq!(out.lines().count(), 5);
}

#[test]
fn test_show_unknown_param() {
    let (result, _) = run("show link.nope", &FakeLink::new());
    assert_eq!(result, Err(ConsoleError::UnknownCommand));
}

#[test]
fn test_set_updates_config() {
    let link = FakeLink::new();
    let (result, out) = run("set link.tx_timeout_ms 250", &link);

    assert_eq!(result, Ok(()));
    assert_eq!(link.config.tx_timeout_ms(), 250);
    assert!(out.contains("link.tx_timeout_ms=250"));
}

#[test]
fn test_set_bool_param() {
    let link = FakeLink::new();
    let (result, _) = run("set link.log_rx off", &link);

    assert_eq!(result, Ok(()));
    assert!(!link.config.log_rx());
}

#[test]
fn test_set_errors() {
    let link = FakeLink::new();

    assert_eq!(run("set link.tx_timeout_ms abc", &link).0, Err(ConsoleError::InvalidValue));
    assert_eq!(run("set link.tx_timeout_ms 0", &link).0, Err(ConsoleError::OutOfRange));
    assert_eq!(run("set link.bogus 1", &link).0, Err(ConsoleError::UnknownCommand));
    assert_eq!(run("set link.tx_timeout_ms", &link).0, Err(ConsoleError::Usage));

    assert_eq!(link.config.tx_timeout_ms(), LinkConfig::DEFAULT_TX_TIMEOUT_MS);
}

#[test]
fn test_stats() {
    let (result, out) = run("stats", &FakeLink::new());

    assert_eq!(result, Ok(()));
    assert!(out.contains("rx lines:      3"));
    assert!(out.contains("tx ok:         2"));
}

#[test]
fn test_error_display_codes() {
    assert_eq!(ConsoleError::UnknownCommand.to_string(), "E01: unknown command");
    assert_eq!(
        ConsoleError::TooLong { max: 254 }.to_string(),
        "E05: input too long (max 254 chars)"
    );
    assert_eq!(
        ConsoleError::from(LinkError::TooLong { max: 254 }),
        ConsoleError::TooLong { max: 254 }
    );
}
