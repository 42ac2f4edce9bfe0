//! The logging API offered to user functions.

use std::sync::Arc;

use crate::chunk::split_message;
use crate::config::LogStreamConfig;
use crate::correlation::CorrelationContext;
use crate::forward::LogForwarder;
use crate::record::{LogLevel, LogRecord, LogSource};

/// Emits `USER` records for the invocation running on the calling thread.
///
/// Every call is stamped from the ambient [`CorrelationContext`]; calls made
/// outside any invocation are dropped.
#[derive(Clone)]
pub struct FunctionLogger {
    forwarder: Arc<dyn LogForwarder>,
    max_chunk_chars: usize,
}

impl FunctionLogger {
    pub fn new(forwarder: Arc<dyn LogForwarder>, config: &LogStreamConfig) -> Self {
        Self {
            forwarder,
            max_chunk_chars: config.max_chunk_chars,
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        let Some(context) = CorrelationContext::current() else {
            log::trace!("dropping {} user log outside an invocation", level);
            return;
        };
        for chunk in split_message(message, self.max_chunk_chars) {
            self.send(LogRecord::new(level, chunk).with_context(&context));
        }
    }

    /// Marks the start of the current invocation.
    pub fn invocation_started(&self) {
        if let Some(context) = CorrelationContext::current() {
            self.send(
                LogRecord::new(LogLevel::Info, "")
                    .with_context(&context)
                    .started(),
            );
        }
    }

    /// Marks the end of the current invocation with its result code.
    pub fn invocation_finished(&self, error_code: i32) {
        if let Some(context) = CorrelationContext::current() {
            let level = if error_code == 0 {
                LogLevel::Info
            } else {
                LogLevel::Error
            };
            self.send(
                LogRecord::new(level, "")
                    .with_context(&context)
                    .finished(error_code),
            );
        }
    }

    fn send(&self, record: LogRecord) {
        let record = record.with_source(LogSource::User);
        if let Err(e) = self.forwarder.forward(record) {
            log::warn!("dropping user log record: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingForwarder;

    fn logger(max_chunk_chars: usize) -> (FunctionLogger, RecordingForwarder) {
        let sink = RecordingForwarder::new();
        let config = LogStreamConfig {
            max_chunk_chars,
            ..LogStreamConfig::default()
        };
        (FunctionLogger::new(Arc::new(sink.clone()), &config), sink)
    }

    #[test]
    fn outside_invocation_is_dropped() {
        let (logger, sink) = logger(16);
        logger.info("nobody is listening");
        logger.invocation_started();
        logger.invocation_finished(0);
        assert!(sink.is_empty());
    }

    #[test]
    fn levels_and_source() {
        let (logger, sink) = logger(16);
        let _guard = CorrelationContext::new("req", "inv").enter();
        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");

        let records = sink.records();
        let levels: Vec<LogLevel> = records.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error]
        );
        assert!(records
            .iter()
            .all(|r| r.log_source == LogSource::User && r.trace_id == "req"));
    }

    #[test]
    fn long_message_is_chunked() {
        let (logger, sink) = logger(3);
        let _guard = CorrelationContext::new("req", "inv").enter();
        logger.info("abcdefg");
        let contents: Vec<String> = sink.take().into_iter().map(|r| r.content).collect();
        assert_eq!(contents, vec!["abc", "def", "g"]);
    }

    #[test]
    fn lifecycle_records() {
        let (logger, sink) = logger(16);
        let _guard = CorrelationContext::new("req", "inv").enter();
        logger.invocation_started();
        logger.invocation_finished(2002);

        let records = sink.records();
        assert!(records[0].is_start);
        assert!(!records[0].is_finish);
        assert!(records[1].is_finish);
        assert_eq!(records[1].error_code, 2002);
        assert_eq!(records[1].level, LogLevel::Error);
    }
}
