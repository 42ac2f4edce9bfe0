//! Interception of raw stdout/stderr writes.
//!
//! A [`LoggerStream`] stands in for a process output stream. Bytes are
//! buffered until they decode to something other than whitespace, then split
//! into lines. Each line is attributed to an invocation, either by an
//! embedded tag or by the writing thread's ambient context, and forwarded as
//! one or more [`LogRecord`]s. Lines that cannot be attributed are dropped.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use crate::chunk::split_message;
use crate::config::LogStreamConfig;
use crate::correlation::CorrelationContext;
use crate::error::StreamError;
use crate::forward::LogForwarder;
use crate::record::{LogLevel, LogRecord, LogSource};
use crate::tag::{CorrelationIds, TagMatcher};

pub struct LoggerStream {
    level: LogLevel,
    buffer: Mutex<Vec<u8>>,
    forwarder: Arc<dyn LogForwarder>,
    tags: TagMatcher,
    max_chunk_chars: usize,
    line_separator: String,
}

impl LoggerStream {
    pub fn new(level: LogLevel, forwarder: Arc<dyn LogForwarder>, config: &LogStreamConfig) -> Self {
        Self {
            level,
            buffer: Mutex::new(Vec::new()),
            forwarder,
            tags: TagMatcher::new(&config.tag_marker),
            max_chunk_chars: config.max_chunk_chars,
            line_separator: config.line_separator.clone(),
        }
    }

    /// The stream standing in for stdout; records are INFO.
    pub fn stdout(forwarder: Arc<dyn LogForwarder>, config: &LogStreamConfig) -> Self {
        Self::new(LogLevel::Info, forwarder, config)
    }

    /// The stream standing in for stderr; records are ERROR.
    pub fn stderr(forwarder: Arc<dyn LogForwarder>, config: &LogStreamConfig) -> Self {
        Self::new(LogLevel::Error, forwarder, config)
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Writes `length` bytes of `bytes` starting at `offset`.
    ///
    /// Forwarding failures are logged, never returned; the only error is a
    /// slice that does not fit in `bytes`.
    pub fn write_at(&self, bytes: &[u8], offset: usize, length: usize) -> Result<(), StreamError> {
        let end = offset
            .checked_add(length)
            .filter(|&end| offset <= bytes.len() && end <= bytes.len())
            .ok_or(StreamError::OutOfBounds {
                offset,
                length,
                len: bytes.len(),
            })?;

        let written = &bytes[offset..end];
        if written == self.line_separator.as_bytes() {
            return Ok(());
        }

        let message = {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            buffer.extend_from_slice(written);
            let decoded = String::from_utf8_lossy(&buffer);
            let trimmed = decoded.trim_matches(is_trimmed);
            if trimmed.is_empty() {
                return Ok(());
            }
            let message = trimmed.to_string();
            buffer.clear();
            message
        };

        self.process_message(&message);
        Ok(())
    }

    /// Writes all of `bytes`.
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<(), StreamError> {
        self.write_at(bytes, 0, bytes.len())
    }

    fn process_message(&self, message: &str) {
        if !message.contains(self.line_separator.as_str()) {
            self.process_line(message);
            return;
        }
        for line in message.split(self.line_separator.as_str()) {
            if !line.is_empty() {
                self.process_line(line);
            }
        }
    }

    fn process_line(&self, line: &str) {
        let extraction = self.tags.extract(line);
        let ambient = CorrelationContext::current();
        if extraction.ids.is_none() && ambient.is_none() {
            log::trace!("dropping {} line without correlation", self.level);
            return;
        }

        let ids = extraction
            .correlation_ids()
            .or_else(|| ambient.as_deref().map(CorrelationIds::from_context))
            .unwrap_or_default();

        for chunk in split_message(&extraction.message, self.max_chunk_chars) {
            let mut record = LogRecord::new(self.level, chunk).with_source(LogSource::Std);
            if let Some(context) = ambient.as_deref() {
                record = record.with_context(context);
            }
            let record = record.with_ids(&ids);
            if let Err(e) = self.forwarder.forward(record) {
                log::warn!("dropping {} log record: {}", self.level, e);
            }
        }
    }
}

/// Space and the ASCII control characters; other Unicode whitespace is content.
fn is_trimmed(c: char) -> bool {
    c <= '\u{20}'
}

impl io::Write for &LoggerStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for LoggerStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingForwarder;
    use std::io::Write;

    fn stream(level: LogLevel) -> (LoggerStream, RecordingForwarder) {
        let sink = RecordingForwarder::new();
        let config = LogStreamConfig {
            tag_marker: "MARKER".to_string(),
            line_separator: "\n".to_string(),
            ..LogStreamConfig::default()
        };
        let stream = LoggerStream::new(level, Arc::new(sink.clone()), &config);
        (stream, sink)
    }

    #[test]
    fn bounds_are_checked() {
        let (stream, _) = stream(LogLevel::Info);
        assert_eq!(
            stream.write_at(&[1, 2], 5, 3),
            Err(StreamError::OutOfBounds {
                offset: 5,
                length: 3,
                len: 2
            })
        );
        assert!(stream.write_at(&[1, 2], 1, 1).is_ok());
        assert!(stream.write_at(&[1, 2], 2, 0).is_ok());
        assert!(stream.write_at(&[1, 2], 1, 2).is_err());
        assert!(stream.write_at(&[1, 2], 1, usize::MAX).is_err());
    }

    #[test]
    fn untagged_line_without_context_is_dropped() {
        let (stream, sink) = stream(LogLevel::Info);
        stream.write_bytes(b"hello\n").unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn ambient_context_attributes_line() {
        let (stream, sink) = stream(LogLevel::Info);
        let _guard = CorrelationContext::new("req-1", "inv-1")
            .with_instance_id("ins")
            .with_log_group("g", "s")
            .enter();
        stream.write_bytes(b"hello\n").unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.content, "hello");
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.log_source, LogSource::Std);
        assert_eq!(record.trace_id, "req-1");
        assert_eq!(record.invoke_id, "inv-1");
        assert_eq!(record.instance_id, "ins");
        assert_eq!(record.log_stream_id, "s");
    }

    #[test]
    fn tag_wins_over_context() {
        let (stream, sink) = stream(LogLevel::Error);
        let _guard = CorrelationContext::new("ambient", "0").enter();
        stream
            .write_bytes("[INFO  MARKER:tagged|7 main.java:26] 测试日志".as_bytes())
            .unwrap();

        let record = &sink.records()[0];
        assert_eq!(record.content, "[INFO  main.java:26] 测试日志");
        assert_eq!(record.trace_id, "tagged");
        assert_eq!(record.invoke_id, "7");
        assert_eq!(record.level, LogLevel::Error);
    }

    #[test]
    fn tag_alone_attributes_line() {
        let (stream, sink) = stream(LogLevel::Info);
        stream.write_bytes(b"MARKER:r|i from a pool thread").unwrap();
        let record = &sink.records()[0];
        assert_eq!(record.content, "from a pool thread");
        assert_eq!(record.trace_id, "r");
        assert_eq!(record.instance_id, "");
    }

    #[test]
    fn malformed_tag_without_context_keeps_line_with_empty_ids() {
        let (stream, sink) = stream(LogLevel::Info);
        stream.write_bytes(b"MARKER:only-one text").unwrap();
        let record = &sink.records()[0];
        assert_eq!(record.content, "text");
        assert_eq!(record.trace_id, "");
        assert_eq!(record.invoke_id, "");
    }

    #[test]
    fn separator_write_is_ignored() {
        let (stream, sink) = stream(LogLevel::Info);
        let _guard = CorrelationContext::new("r", "i").enter();
        stream.write_bytes(b"\n").unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn whitespace_accumulates_until_content() {
        let (stream, sink) = stream(LogLevel::Info);
        let _guard = CorrelationContext::new("r", "i").enter();
        stream.write_bytes(b"  ").unwrap();
        stream.write_bytes(b"\t").unwrap();
        assert!(sink.is_empty());
        stream.write_bytes(b"late").unwrap();
        assert_eq!(sink.records()[0].content, "late");

        stream.write_bytes(b"next").unwrap();
        assert_eq!(sink.records()[1].content, "next");
    }

    #[test]
    fn split_utf8_sequence_is_decoded_lossily() {
        let (stream, sink) = stream(LogLevel::Info);
        let _guard = CorrelationContext::new("r", "i").enter();
        let bytes = "日志".as_bytes();
        stream.write_bytes(&bytes[..2]).unwrap();
        let record = &sink.records()[0];
        assert_eq!(record.content, "\u{FFFD}");
    }

    #[test]
    fn multi_line_write_forwards_each_line() {
        let (stream, sink) = stream(LogLevel::Info);
        let _guard = CorrelationContext::new("ambient", "0").enter();
        stream
            .write_bytes(b"first\n\n  MARKER:r2|i2 second  \nthird\n")
            .unwrap();

        let records = sink.records();
        let contents: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "  second  ", "third"]);
        assert_eq!(records[0].trace_id, "ambient");
        assert_eq!(records[1].trace_id, "r2");
        assert_eq!(records[2].trace_id, "ambient");
    }

    #[test]
    fn trims_only_space_and_controls() {
        let (stream, sink) = stream(LogLevel::Info);
        let _guard = CorrelationContext::new("r", "i").enter();
        stream.write_bytes("\u{1}\u{3000}全角\u{3000} \u{7}".as_bytes()).unwrap();
        assert_eq!(sink.records()[0].content, "\u{3000}全角\u{3000}");
    }

    #[test]
    fn printed_trace_keeps_indentation() {
        let (stream, sink) = stream(LogLevel::Error);
        let _guard = CorrelationContext::new("r", "i").enter();
        stream
            .write_bytes(b"java.lang.Exception: x\n\tat a.B.c(B.java:1)\n\n    indented\n")
            .unwrap();

        let contents: Vec<String> = sink.take().into_iter().map(|r| r.content).collect();
        assert_eq!(
            contents,
            vec!["java.lang.Exception: x", "\tat a.B.c(B.java:1)", "    indented"]
        );
    }

    #[test]
    fn long_line_is_chunked() {
        let sink = RecordingForwarder::new();
        let config = LogStreamConfig {
            max_chunk_chars: 4,
            line_separator: "\n".to_string(),
            ..LogStreamConfig::default()
        };
        let stream = LoggerStream::stdout(Arc::new(sink.clone()), &config);
        let _guard = CorrelationContext::new("r", "i").enter();
        stream.write_bytes(b"abcdefghij").unwrap();

        let records = sink.records();
        let contents: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["abcd", "efgh", "ij"]);
        assert!(records.iter().all(|r| r.trace_id == "r" && r.invoke_id == "i"));
    }

    #[test]
    fn forwarding_failure_is_swallowed() {
        let (stream, sink) = stream(LogLevel::Info);
        sink.set_failing(true);
        let _guard = CorrelationContext::new("r", "i").enter();
        assert!(stream.write_bytes(b"lost").is_ok());
        assert!(sink.is_empty());
    }

    #[test]
    fn io_write_forwards() {
        let (mut stream, sink) = stream(LogLevel::Info);
        let _guard = CorrelationContext::new("r", "i").enter();
        {
            let mut shared = &stream;
            shared.write_all(b"through a shared handle\n").unwrap();
        }
        stream.write_all(b"through the owner\n").unwrap();
        stream.flush().unwrap();

        let contents: Vec<String> = sink.take().into_iter().map(|r| r.content).collect();
        assert_eq!(contents, vec!["through a shared handle", "through the owner"]);
    }

    #[test]
    fn constructors_fix_level() {
        let config = LogStreamConfig::default();
        let sink: Arc<dyn LogForwarder> = Arc::new(RecordingForwarder::new());
        assert_eq!(LoggerStream::stdout(sink.clone(), &config).level(), LogLevel::Info);
        assert_eq!(LoggerStream::stderr(sink, &config).level(), LogLevel::Error);
    }
}
