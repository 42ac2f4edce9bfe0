//! Running one function invocation with its diagnostics attached.
//!
//! [`InvocationBoundary::run`] is where a user function is entered and left.
//! The invocation's correlation context is current on the calling thread for
//! the duration of the body, start and finish records bracket it, and a
//! failure leaves as an [`ErrorInfo`] carrying the captured stack traces.

use yr_logstream::{CorrelationContext, FunctionLogger};
use yr_traceback::{
    CapturedError, ErrorCode, ErrorInfo, ModuleCode, StackFrame, StackTraceInfo, TraceFilter,
    MAX_STACK_TRACE_CHARS,
};

/// How a function body failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvocationFailure {
    /// User code threw.
    User(CapturedError),
    /// User code threw inside a call the runtime made on its behalf.
    ///
    /// `outer` is the runtime error raised with the user-function code and
    /// `cause` the user error it wraps. The report carries the frames of both.
    NestedUser {
        outer: CapturedError,
        cause: CapturedError,
    },
    /// A runtime error with any other code was raised from the body.
    ///
    /// Reported as a user-function failure whose message is the printed trace.
    WrappedRuntime(CapturedError),
    /// The runtime failed around the user code.
    System(CapturedError),
}

/// Entry point for invocations handled by one runtime instance.
pub struct InvocationBoundary {
    runtime_id: String,
    logger: FunctionLogger,
}

impl InvocationBoundary {
    pub fn new(runtime_id: impl Into<String>, logger: FunctionLogger) -> Self {
        Self {
            runtime_id: runtime_id.into(),
            logger,
        }
    }

    pub fn runtime_id(&self) -> &str {
        &self.runtime_id
    }

    /// Runs `body` as the invocation described by `context`.
    ///
    /// The context is left current only while `body` runs; whatever was
    /// current before is restored on return.
    pub fn run<T, F>(
        &self,
        context: CorrelationContext,
        class_name: &str,
        function_name: &str,
        body: F,
    ) -> Result<T, ErrorInfo>
    where
        F: FnOnce() -> Result<T, InvocationFailure>,
    {
        let _guard = context.enter();
        self.logger.invocation_started();

        let outcome =
            body().map_err(|failure| self.to_error_info(failure, class_name, function_name));

        let code = match &outcome {
            Ok(_) => ErrorCode::OK,
            Err(info) => info.code,
        };
        self.logger.invocation_finished(code.0);
        outcome
    }

    /// Maps a failure onto the report returned to the caller.
    pub fn to_error_info(
        &self,
        failure: InvocationFailure,
        class_name: &str,
        function_name: &str,
    ) -> ErrorInfo {
        match failure {
            InvocationFailure::User(error) => {
                let message = self.user_failure_message(&error);
                log::error!("{}", message);
                let info = TraceFilter::select(Some(error), true)
                    .generate_lossy(class_name, function_name);
                ErrorInfo::new(
                    ErrorCode::USER_FUNCTION_EXCEPTION,
                    ModuleCode::RUNTIME_INVOKE,
                    message,
                )
                .with_stack_trace_infos(vec![info])
            }
            InvocationFailure::NestedUser { outer, cause } => {
                let message = self.user_failure_message(&outer);
                log::error!("{}", message);
                let info = TraceFilter::select(Some(cause), false)
                    .generate_lossy(class_name, function_name);
                let info = append_frames(info, outer.frames);
                ErrorInfo::new(
                    ErrorCode::USER_FUNCTION_EXCEPTION,
                    ModuleCode::RUNTIME_INVOKE,
                    message,
                )
                .with_stack_trace_infos(vec![info])
            }
            InvocationFailure::WrappedRuntime(error) => {
                log::error!(
                    "runtime error raised from {}.{}: {}",
                    class_name,
                    function_name,
                    error
                );
                ErrorInfo::new(
                    ErrorCode::USER_FUNCTION_EXCEPTION,
                    ModuleCode::RUNTIME_INVOKE,
                    error.printed_stack_trace(),
                )
            }
            InvocationFailure::System(error) => {
                let trace = error.truncated_printed_trace(MAX_STACK_TRACE_CHARS);
                log::error!(
                    "runtime failure invoking {}.{}: {}",
                    class_name,
                    function_name,
                    error
                );
                ErrorInfo::new(ErrorCode::INNER_SYSTEM_ERROR, ModuleCode::RUNTIME_INVOKE, trace)
            }
        }
    }

    fn user_failure_message(&self, error: &CapturedError) -> String {
        format!(
            "exception occurred when processing user code, runtimeId: {}, throwable: {}",
            self.runtime_id, error
        )
    }
}

/// Inner frames followed by the outer ones. An empty inner list takes the
/// outer frames alone; inner frames with no outer frames yield nothing.
fn append_frames(mut info: StackTraceInfo, outer_frames: Vec<StackFrame>) -> StackTraceInfo {
    if info.frames.is_empty() {
        info.frames = outer_frames;
    } else if outer_frames.is_empty() {
        info.frames.clear();
    } else {
        info.frames.extend(outer_frames);
    }
    info
}
