//! Invocation diagnostics for the function runtime.
//!
//! This crate ties together [`yr_traceback`] (what a failure looked like) and
//! [`yr_logstream`] (what an invocation printed), and adds the
//! [`InvocationBoundary`] that applies both around a user function.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use yr_diag::{CapturedError, InvocationBoundary, InvocationFailure, StackFrame};
//! use yr_diag::{CorrelationContext, ForwardError, FunctionLogger, LogForwarder, LogRecord};
//! use yr_diag::LogStreamConfig;
//!
//! struct Discard;
//!
//! impl LogForwarder for Discard {
//!     fn forward(&self, _record: LogRecord) -> Result<(), ForwardError> {
//!         Ok(())
//!     }
//! }
//!
//! let logger = FunctionLogger::new(Arc::new(Discard), &LogStreamConfig::default());
//! let boundary = InvocationBoundary::new("runtime-1", logger);
//!
//! let report = boundary
//!     .run(CorrelationContext::new("req", "inv"), "Job", "run", || {
//!         Err::<(), _>(InvocationFailure::User(
//!             CapturedError::new("java.lang.IllegalStateException")
//!                 .with_frame(StackFrame::new("org.demo.Job", "run", "Job.java", 12)),
//!         ))
//!     })
//!     .unwrap_err();
//! assert_eq!(report.code.0, 2002);
//! assert_eq!(report.stack_trace_infos[0].frames.len(), 1);
//! ```

pub mod invocation;

pub use invocation::{InvocationBoundary, InvocationFailure};

pub use yr_logstream as logstream;
pub use yr_traceback as traceback;

pub use yr_logstream::{
    CorrelationContext, ForwardError, ForwardingPool, FunctionLogger, LogForwarder, LogLevel,
    LogRecord, LogStreamConfig, LoggerStream,
};
pub use yr_traceback::{
    check_invoke_error, CapturedError, ErrorCode, ErrorInfo, InvokeError, ModuleCode, StackFrame,
    StackTraceInfo, SurfacedError, TraceFilter,
};
