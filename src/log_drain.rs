//! Log drain: moves interrupt-context records to a text sink.
//!
//! Runs in the caller context (console loop, logger task). Blocking
//! writes are fine here.

use core::fmt::Write;

use crate::logging::{LogEntry, LogStream, SliceWriter, MAX_MSG_LEN};

/// Format a record into `buf`.
///
/// Format: `[timestamp_us] LEVEL: message\r\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = SliceWriter { buf, pos: 0 };

    let _ = write!(
        writer,
        "[{:10}] {}: {}\r\n",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.message()
    );

    writer.pos
}

/// Drain every pending record into `out`.
///
/// Appends a warning line if records were dropped since the last
/// drain. Returns the number of records written.
pub fn drain_logs<const N: usize>(stream: &LogStream<N>, out: &mut dyn Write) -> usize {
    let mut count = 0;

    let mut buf = [0u8; MAX_MSG_LEN + 48];

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut buf);
        if let Ok(line) = core::str::from_utf8(&buf[..len]) {
            let _ = out.write_str(line);
        }
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = write!(out, "[WARN] Dropped log records: {}\r\n", dropped);
        stream.reset_dropped();
    }

    count
}
