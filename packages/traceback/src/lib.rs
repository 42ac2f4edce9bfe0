//! Stack-trace capture and reconstruction across the runtime boundary.
//!
//! When user code fails inside a function invocation, the failure has to
//! travel back to the caller as data. This crate covers both ends of that
//! trip:
//!
//! - **Capture**: a [`CapturedError`] is turned into a portable
//!   [`StackTraceInfo`] by a [`TraceFilter`]. In user-stack mode the error's
//!   printed trace is re-parsed ([`reconstruct_frames`]) so that the
//!   runtime's own frames are cut away, then deduplicated
//!   ([`dedup_frames`]).
//! - **Surface**: an [`ErrorInfo`] returned by the runtime is checked with
//!   [`check_invoke_error`], which rebuilds the first captured exception as a
//!   [`SurfacedError`].
//!
//! # Example
//!
//! ```
//! use yr_traceback::{CapturedError, StackFrame, TraceFilter};
//!
//! let error = CapturedError::new("java.lang.IllegalStateException")
//!     .with_message("boom")
//!     .with_frame(StackFrame::new("org.demo.Job", "run", "Job.java", 7))
//!     .with_frame(StackFrame::new("org.demo.Job", "run", "Job.java", 7));
//!
//! let info = TraceFilter::select(Some(error), true)
//!     .generate("org.demo.Job", "run")
//!     .unwrap();
//! assert_eq!(info.type_name, "java.lang.IllegalStateException");
//! assert_eq!(info.frames.len(), 1);
//! ```

pub mod captured;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod frame;
pub mod info;
pub mod layout;
pub mod reconstruct;
pub mod surface;

pub use captured::{CapturedError, MAX_STACK_TRACE_CHARS};
pub use dedup::dedup_frames;
pub use error::{InvokeError, Result, TraceError};
pub use filter::TraceFilter;
pub use frame::StackFrame;
pub use info::{StackTraceInfo, DEFAULT_LANGUAGE};
pub use layout::{TraceLayout, LINE_SEPARATOR};
pub use reconstruct::{parse_frame_line, reconstruct_frames, reconstruct_frames_with};
pub use surface::{check_invoke_error, ErrorCode, ErrorInfo, ModuleCode, SurfacedError};
