//! Log multiplexing for function invocations.
//!
//! Several invocations may share one process, and with it one stdout and one
//! stderr. This crate keeps their output apart:
//!
//! - [`CorrelationContext`] holds the ids of the invocation a thread is
//!   working for.
//! - [`LoggerStream`] replaces a process output stream. Each line it receives
//!   is attributed to an invocation (by an embedded [`TagMatcher`] tag, or by
//!   the ambient context), split with [`split_message`] and forwarded.
//! - [`FunctionLogger`] is the direct logging API for user code.
//! - [`LogForwarder`] is the boundary to the native side; a
//!   [`ForwardingPool`] puts a bounded queue and worker threads in front of
//!   it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use yr_logstream::{CorrelationContext, ForwardingPool, LogForwarder, LogRecord};
//! use yr_logstream::{ForwardError, LogStreamConfig, LoggerStream};
//!
//! struct Discard;
//!
//! impl LogForwarder for Discard {
//!     fn forward(&self, _record: LogRecord) -> Result<(), ForwardError> {
//!         Ok(())
//!     }
//! }
//!
//! let config = LogStreamConfig::default();
//! let pool = Arc::new(ForwardingPool::from_config(Arc::new(Discard), &config).unwrap());
//! let stdout = LoggerStream::stdout(pool.clone(), &config);
//!
//! let _guard = CorrelationContext::new("request-1", "invoke-1").enter();
//! stdout.write_bytes(b"hello from user code\n").unwrap();
//!
//! pool.shutdown();
//! assert_eq!(pool.forwarded(), 1);
//! ```

pub mod chunk;
pub mod config;
pub mod correlation;
pub mod error;
pub mod forward;
pub mod logger;
pub mod record;
pub mod stream;
pub mod tag;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use chunk::{split_message, MessageChunks, MAX_LOG_CHUNK_CHARS};
pub use config::{LogStreamConfig, LINE_SEPARATOR};
pub use correlation::{propagate, spawn_with_context, CorrelationContext, CorrelationGuard};
pub use error::{ForwardError, StreamError};
pub use forward::{ForwardingPool, LogForwarder};
pub use logger::FunctionLogger;
pub use record::{LogLevel, LogRecord, LogSource};
pub use stream::LoggerStream;
pub use tag::{CorrelationIds, TagExtraction, TagMatcher, DEFAULT_TAG_MARKER};
