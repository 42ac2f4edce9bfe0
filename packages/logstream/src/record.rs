//! Structured log records handed to the native boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::correlation::CorrelationContext;
use crate::tag::CorrelationIds;

/// Record timestamp layout, in local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Severity of a record.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a record's content came from.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogSource {
    /// Intercepted stdout/stderr output.
    #[default]
    #[serde(rename = "STD")]
    Std,
    /// Calls through the function logger.
    #[serde(rename = "USER")]
    User,
}

/// One log line, or one chunk of an oversized line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub level: LogLevel,
    pub content: String,
    pub timestamp: String,
    pub invoke_id: String,
    /// The request id of the invocation.
    pub trace_id: String,
    pub stage: String,
    pub log_type: String,
    pub instance_id: String,
    pub function_info: String,
    pub log_source: LogSource,
    pub log_group_id: String,
    pub log_stream_id: String,
    pub is_start: bool,
    pub is_finish: bool,
    pub error_code: i32,
}

impl LogRecord {
    /// A record stamped with the current local time.
    pub fn new(level: LogLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
            timestamp: now_timestamp(),
            invoke_id: String::new(),
            trace_id: String::new(),
            stage: String::new(),
            log_type: String::new(),
            instance_id: String::new(),
            function_info: String::new(),
            log_source: LogSource::default(),
            log_group_id: String::new(),
            log_stream_id: String::new(),
            is_start: false,
            is_finish: false,
            error_code: 0,
        }
    }

    /// Copies every id from `context`.
    pub fn with_context(mut self, context: &CorrelationContext) -> Self {
        self.invoke_id = context.invoke_id.clone();
        self.trace_id = context.request_id.clone();
        self.instance_id = context.instance_id.clone();
        self.function_info = context.function_info.clone();
        self.log_group_id = context.log_group_id.clone();
        self.log_stream_id = context.log_stream_id.clone();
        self
    }

    /// Overrides the request and invoke ids.
    pub fn with_ids(mut self, ids: &CorrelationIds) -> Self {
        self.trace_id = ids.request_id.clone();
        self.invoke_id = ids.invoke_id.clone();
        self
    }

    pub fn with_source(mut self, source: LogSource) -> Self {
        self.log_source = source;
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    pub fn with_log_type(mut self, log_type: impl Into<String>) -> Self {
        self.log_type = log_type.into();
        self
    }

    pub fn started(mut self) -> Self {
        self.is_start = true;
        self
    }

    pub fn finished(mut self, error_code: i32) -> Self {
        self.is_finish = true;
        self.error_code = error_code;
        self
    }

    pub fn request_id(&self) -> &str {
        &self.trace_id
    }
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
