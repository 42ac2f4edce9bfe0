//! The receiving side: turning a runtime error report back into a Rust error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvokeError;
use crate::frame::StackFrame;
use crate::info::StackTraceInfo;

/// Type reported when a captured exception carries no type name.
pub const FALLBACK_EXCEPTION_TYPE: &str = "java.lang.Exception";

/// File-name prefix on frames captured from Go code.
const GO_FILE_PREFIX: &str = "./";

/// Numeric error code shared with the native runtime.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const OK: ErrorCode = ErrorCode(0);
    pub const PARAM_INVALID: ErrorCode = ErrorCode(1001);
    pub const INSTANCE_NOT_FOUND: ErrorCode = ErrorCode(1003);
    pub const USER_CODE_LOAD: ErrorCode = ErrorCode(2001);
    pub const USER_FUNCTION_EXCEPTION: ErrorCode = ErrorCode(2002);
    pub const INNER_COMMUNICATION: ErrorCode = ErrorCode(3002);
    pub const INNER_SYSTEM_ERROR: ErrorCode = ErrorCode(3003);
    pub const DESERIALIZATION_FAILED: ErrorCode = ErrorCode(4003);
    pub const FINALIZED: ErrorCode = ErrorCode(9000);

    pub fn is_ok(self) -> bool {
        self == ErrorCode::OK
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime module an error is attributed to.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleCode(pub i32);

impl ModuleCode {
    pub const CORE: ModuleCode = ModuleCode(10);
    pub const RUNTIME: ModuleCode = ModuleCode(20);
    pub const RUNTIME_CREATE: ModuleCode = ModuleCode(21);
    pub const RUNTIME_INVOKE: ModuleCode = ModuleCode(22);
    pub const RUNTIME_KILL: ModuleCode = ModuleCode(23);
    pub const DATASYSTEM: ModuleCode = ModuleCode(30);
}

impl Default for ModuleCode {
    fn default() -> Self {
        ModuleCode::RUNTIME
    }
}

impl fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An error report as exchanged with the native runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub module: ModuleCode,
    pub message: String,
    #[serde(default)]
    pub stack_trace_infos: Vec<StackTraceInfo>,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, module: ModuleCode, message: impl Into<String>) -> Self {
        Self {
            code,
            module,
            message: message.into(),
            stack_trace_infos: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(ErrorCode::OK, ModuleCode::RUNTIME, "")
    }

    pub fn with_stack_trace_infos(mut self, infos: Vec<StackTraceInfo>) -> Self {
        self.stack_trace_infos = infos;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ErrCode: {}, ModuleCode: {}, ErrMsg: {}",
            self.code, self.module, self.message
        )
    }
}

/// A user exception rebuilt from its transport record.
///
/// The original type is known only by name; the value displays the same way
/// the thrower would have printed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfacedError {
    pub type_name: String,
    pub message: String,
    pub frames: Vec<StackFrame>,
    pub language: String,
}

impl SurfacedError {
    pub fn from_info(info: &StackTraceInfo) -> Self {
        let type_name = if info.type_name.is_empty() {
            FALLBACK_EXCEPTION_TYPE.to_string()
        } else {
            info.type_name.clone()
        };
        let frames = info
            .frames
            .iter()
            .map(|frame| {
                let mut frame = frame.clone();
                if let Some(stripped) = frame.file_name.strip_prefix(GO_FILE_PREFIX) {
                    frame.file_name = stripped.to_string();
                }
                frame
            })
            .collect();
        Self {
            type_name,
            message: info.message.clone(),
            frames,
            language: info.language.clone(),
        }
    }
}

impl fmt::Display for SurfacedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        for frame in &self.frames {
            write!(f, "\n\tat {}", frame)?;
        }
        Ok(())
    }
}

impl std::error::Error for SurfacedError {}

/// Maps a runtime error report onto a Rust result.
///
/// User-code failures that carry at least one captured exception surface
/// the first one as the error's cause. Everything else is passed through as
/// [`InvokeError::Runtime`].
pub fn check_invoke_error(info: &ErrorInfo, context: &str) -> Result<(), InvokeError> {
    if info.is_ok() {
        return Ok(());
    }
    if info.code != ErrorCode::USER_FUNCTION_EXCEPTION {
        return Err(InvokeError::Runtime(info.clone()));
    }

    log::error!(
        "occurs exception: {}, ErrorCode: {}, stackTraceInfo number: {}",
        context,
        info.code,
        info.stack_trace_infos.len()
    );
    match info.stack_trace_infos.first() {
        Some(first) => Err(InvokeError::UserFunction {
            code: info.code,
            module: info.module,
            message: info.message.clone(),
            cause: SurfacedError::from_info(first),
        }),
        None => Err(InvokeError::Runtime(info.clone())),
    }
}
