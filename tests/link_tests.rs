//! Link behavior through a scripted transport

mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{last_line, wait_until, Rig};
use rust_uart_link::config::GREETING;
use rust_uart_link::log_drain::drain_logs;
use rust_uart_link::{Endpoint, LinkError};

#[test]
fn test_send_text_appends_crlf() {
    let rig = Rig::started();

    assert_eq!(rig.link.send_text("hi"), Ok(()));
    assert_eq!(rig.uart().sent(), b"hi\r\n");
    assert_eq!(rig.link.stats().sends_ok, 2, "greeting + hi");
}

#[test]
fn test_send_clears_busy_and_notify() {
    let rig = Rig::started();

    rig.link.send_text("x").unwrap();
    assert!(!rig.link.is_busy());
    assert!(!rig.uart().tx_notify_enabled());
}

#[test]
fn test_raw_send_adds_no_terminator() {
    let rig = Rig::started();

    rig.link.send(b"AT").unwrap();
    assert_eq!(rig.uart().sent(), b"AT");
}

#[test]
fn test_max_length_text_accepted() {
    let rig = Rig::started();
    rig.config.set_char_delay_us(0);

    let text = "a".repeat(rig.link.max_text_len());
    assert_eq!(text.len(), 254);
    assert_eq!(rig.link.send_text(&text), Ok(()));
    assert_eq!(rig.uart().sent().len(), 256);
}

#[test]
fn test_too_long_text_has_no_side_effects() {
    let rig = Rig::started();
    let enables = rig.uart().tx_notify_enables();

    let text = "a".repeat(255);
    assert_eq!(rig.link.send_text(&text), Err(LinkError::TooLong { max: 254 }));

    assert!(rig.uart().sent().is_empty());
    assert_eq!(rig.uart().tx_notify_enables(), enables);
    assert!(!rig.link.is_busy());
}

#[test]
fn test_not_ready_fails_without_sending() {
    let rig = Rig::started();
    rig.uart().set_ready(false);

    assert_eq!(rig.link.send_text("hello"), Err(LinkError::NotReady));
    assert!(rig.uart().sent().is_empty());
    assert_eq!(rig.link.stats().not_ready, 1);
}

#[test]
fn test_timeout_is_bounded_and_releases_gate() {
    let rig = Rig::started();
    rig.uart().set_completes(false);

    let start = Instant::now();
    let result = rig.link.send_text("lost");
    let elapsed = start.elapsed();

    assert_eq!(result, Err(LinkError::Timeout));
    assert!(elapsed >= Duration::from_millis(90), "returned after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "returned after {:?}", elapsed);

    assert!(!rig.link.is_busy());
    assert!(!rig.uart().tx_notify_enabled());
    assert_eq!(rig.link.stats().send_timeouts, 1);

    // Link usable again
    rig.uart().set_completes(true);
    rig.uart().clear_sent();
    assert_eq!(rig.link.send_text("back"), Ok(()));
    assert_eq!(rig.uart().sent(), b"back\r\n");
}

#[test]
fn test_timeout_follows_config() {
    let rig = Rig::started();
    rig.config.set_tx_timeout_ms(20);
    rig.uart().set_completes(false);

    let start = Instant::now();
    assert_eq!(rig.link.send_text("x"), Err(LinkError::Timeout));
    assert!(start.elapsed() < Duration::from_millis(90));
}

#[test]
fn test_no_interrupt_means_timeout() {
    let mut rig = Rig::started();
    rig.stop_pump();

    assert_eq!(rig.link.send_text("x"), Err(LinkError::Timeout));
    assert!(!rig.link.is_busy());
}

#[test]
fn test_concurrent_sends_do_not_interleave() {
    let rig = Rig::started();
    rig.config.set_char_delay_us(0);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let link = Arc::clone(&rig.link);
            thread::spawn(move || {
                for i in 0..10 {
                    let text = format!("thread{}-msg{}", t, i);
                    assert_eq!(link.send_text(&text), Ok(()));
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let sent = String::from_utf8(rig.uart().sent()).unwrap();
    let lines: Vec<&str> = sent.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 40);

    for t in 0..4 {
        let own: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| l.starts_with(&format!("thread{}-", t)))
            .collect();
        let expected: Vec<String> = (0..10).map(|i| format!("thread{}-msg{}", t, i)).collect();
        assert_eq!(own, expected);
    }
}

#[test]
fn test_receive_single_line() {
    let rig = Rig::started();

    rig.uart().inject(b"ab\r");
    assert!(wait_until(|| last_line(&rig.link) == b"ab"));
    assert_eq!(rig.link.stats().lines_received, 1);
}

#[test]
fn test_consecutive_terminators_publish_once() {
    let rig = Rig::started();

    rig.uart().inject(b"ab\r\n\r\ncd\n");
    assert!(wait_until(|| last_line(&rig.link) == b"cd"));
    assert_eq!(rig.link.stats().lines_received, 2);
}

#[test]
fn test_receive_keeps_last_line_until_next() {
    let rig = Rig::started();

    rig.uart().inject(b"first\n");
    assert!(wait_until(|| last_line(&rig.link) == b"first"));

    // Partial line does not replace the published one
    rig.uart().inject(b"sec");
    assert!(wait_until(|| rig.uart().rx_pending() == 0));
    assert_eq!(last_line(&rig.link), b"first");

    rig.uart().inject(b"ond\r");
    assert!(wait_until(|| last_line(&rig.link) == b"second"));
}

#[test]
fn test_receive_overflow_drops_excess() {
    let rig = Rig::started();

    let mut input = vec![b'x'; 200];
    input.push(b'\r');
    rig.uart().inject(&input);

    assert!(wait_until(|| !last_line(&rig.link).is_empty()));
    assert_eq!(last_line(&rig.link), vec![b'x'; 127]);
    assert_eq!(rig.link.stats().rx_dropped, 73);

    // Cursor reset: next line is whole
    rig.uart().inject(b"ok\n");
    assert!(wait_until(|| last_line(&rig.link) == b"ok"));
}

#[test]
fn test_receive_overflow_warns_once_per_line() {
    let rig = Rig::started();
    rig.config.set_log_rx(false);

    let mut input = vec![b'y'; 150];
    input.extend_from_slice(b"\n");
    input.extend_from_slice(&[b'z'; 140]);
    input.push(b'\r');
    rig.uart().inject(&input);

    assert!(wait_until(|| last_line(&rig.link) == vec![b'z'; 127]));

    let mut out = String::new();
    assert_eq!(drain_logs(rig.log, &mut out), 2);
    assert_eq!(out.matches("WARN: RX line overflow").count(), 2, "log was {:?}", out);
    assert_eq!(rig.link.stats().rx_dropped, 23 + 13);
}

#[test]
fn test_stop_disables_receive() {
    let rig = Rig::started();

    rig.uart().inject(b"before\n");
    assert!(wait_until(|| last_line(&rig.link) == b"before"));

    rig.link.stop();
    rig.uart().inject(b"after\n");
    thread::sleep(Duration::from_millis(20));

    assert_eq!(last_line(&rig.link), b"before");
    assert_eq!(rig.uart().rx_pending(), 6);

    // Sending still works
    rig.uart().clear_sent();
    assert_eq!(rig.link.send_text("still"), Ok(()));
    assert_eq!(rig.uart().sent(), b"still\r\n");
}

#[test]
fn test_read_before_any_line_is_empty() {
    let rig = Rig::started();
    assert!(last_line(&rig.link).is_empty());
}

#[test]
fn test_received_lines_are_logged() {
    let rig = Rig::started();

    rig.uart().inject(b"ping\r\n");
    assert!(wait_until(|| last_line(&rig.link) == b"ping"));

    let mut out = String::new();
    assert!(drain_logs(rig.log, &mut out) >= 1);
    assert!(out.contains("INFO: Received: ping"), "log was {:?}", out);
}

#[test]
fn test_rx_logging_can_be_disabled() {
    let rig = Rig::started();
    rig.config.set_log_rx(false);

    rig.uart().inject(b"quiet\n");
    assert!(wait_until(|| last_line(&rig.link) == b"quiet"));

    let mut out = String::new();
    assert_eq!(drain_logs(rig.log, &mut out), 0);
}

#[test]
fn test_start_sends_greeting() {
    let rig = Rig::new();

    assert_eq!(rig.link.start(), Ok(()));
    assert_eq!(rig.uart().sent(), GREETING);
}

#[test]
fn test_start_waits_for_dtr() {
    let rig = Rig::new();
    rig.config.set_dtr_poll_ms(5);
    rig.uart().set_dtr(false);

    let link = Arc::clone(&rig.link);
    let starter = thread::spawn(move || link.start());

    thread::sleep(Duration::from_millis(50));
    assert!(rig.uart().sent().is_empty(), "greeting before DTR");

    rig.uart().set_dtr(true);
    assert_eq!(starter.join().unwrap(), Ok(()));
    assert_eq!(rig.uart().sent(), GREETING);
}

#[test]
fn test_start_fails_when_not_ready() {
    let rig = Rig::new();
    rig.uart().set_ready(false);

    assert_eq!(rig.link.start(), Err(LinkError::NotReady));
    assert!(rig.uart().sent().is_empty());
}

#[test]
fn test_nothing_received_before_start() {
    let rig = Rig::new();

    rig.uart().inject(b"early\n");
    thread::sleep(Duration::from_millis(20));
    assert!(last_line(&rig.link).is_empty());
}
