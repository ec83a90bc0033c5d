//! Line-oriented log relay shared by the image builder and container runner.

use std::sync::Mutex;

use crate::docker::engine::LogRecord;

/// Log target used for relayed lines
pub const LOG_TARGET: &str = "buildenv";

/// Destination for relayed log lines: one call per line.
pub trait LogSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Forwards lines to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggerSink;

impl LogSink for LoggerSink {
    fn emit(&self, line: &str) {
        log::info!(target: LOG_TARGET, "{}", line);
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line emitted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Text of one relayed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub text: String,
}

impl LogEvent {
    /// Decodes a raw output chunk, replacing invalid UTF-8 and dropping trailing whitespace.
    pub fn from_raw(raw: &[u8]) -> Self {
        Self {
            text: String::from_utf8_lossy(raw).trim_end().to_string(),
        }
    }

    /// Event for a build record, or `None` for records with nothing to relay.
    pub fn from_record(record: &LogRecord) -> Option<Self> {
        match record {
            LogRecord::Stream(text) | LogRecord::Aux(text) => Some(Self {
                text: text.trim().to_string(),
            }),
            LogRecord::Empty => None,
        }
    }
}

/// Relays a build record. Returns whether a line was emitted.
pub fn emit_record(sink: &dyn LogSink, record: &LogRecord) -> bool {
    match LogEvent::from_record(record) {
        Some(event) => {
            sink.emit(&event.text);
            true
        }
        None => false,
    }
}

/// Relays a record from a failed build's log; only stream text is relayed there.
pub fn emit_failure_record(sink: &dyn LogSink, record: &LogRecord) -> bool {
    match record {
        LogRecord::Stream(_) => emit_record(sink, record),
        LogRecord::Aux(_) | LogRecord::Empty => false,
    }
}

/// Relays a raw container output chunk as one line.
pub fn emit_raw(sink: &dyn LogSink, raw: &[u8]) {
    sink.emit(&LogEvent::from_raw(raw).text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_records_are_trimmed() {
        let sink = MemorySink::new();
        assert!(emit_record(&sink, &LogRecord::Stream("Step 1/5 : FROM rust\n".into())));
        assert!(emit_record(&sink, &LogRecord::Aux(" sha256:abc ".into())));
        assert!(!emit_record(&sink, &LogRecord::Empty));

        assert_eq!(sink.lines(), vec!["Step 1/5 : FROM rust", "sha256:abc"]);
    }

    #[test]
    fn failure_log_skips_aux_records() {
        let sink = MemorySink::new();
        assert!(emit_failure_record(&sink, &LogRecord::Stream("oops\n".into())));
        assert!(!emit_failure_record(&sink, &LogRecord::Aux("sha256:abc".into())));
        assert!(!emit_failure_record(&sink, &LogRecord::Empty));

        assert_eq!(sink.lines(), vec!["oops"]);
    }

    #[test]
    fn raw_chunks_keep_leading_indentation() {
        let sink = MemorySink::new();
        emit_raw(&sink, b"   Compiling buildenv v0.1.0\r\n");
        assert_eq!(sink.lines(), vec!["   Compiling buildenv v0.1.0"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let event = LogEvent::from_raw(&[b'o', b'k', 0xff, b'\n']);
        assert_eq!(event.text, "ok\u{fffd}");
    }
}
