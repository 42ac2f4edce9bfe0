//! Error types for trace reconstruction and surfacing.

use thiserror::Error;

use crate::surface::{ErrorCode, ErrorInfo, ModuleCode, SurfacedError};

/// Failures while turning printed trace text back into frames.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    /// The frame line has no `(` separating the method from its location.
    #[error("exception happened while parsing stack frame string {line:?}: missing '('")]
    MissingParenthesis { line: String },

    /// The line number does not fit the frame's integer type.
    #[error("invalid line number in stack frame string {line:?}: {source}")]
    InvalidLineNumber {
        line: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// An invocation failure reported back by the runtime.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// User code threw; `cause` is the surfaced user exception.
    #[error("user function exception (code {code}, module {module}): {message}")]
    UserFunction {
        code: ErrorCode,
        module: ModuleCode,
        message: String,
        #[source]
        cause: SurfacedError,
    },

    /// Any other failure, passed through untouched.
    #[error("{0}")]
    Runtime(ErrorInfo),
}

/// Result type alias for reconstruction.
pub type Result<T> = std::result::Result<T, TraceError>;
