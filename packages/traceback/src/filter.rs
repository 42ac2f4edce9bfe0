//! Turning a thrown error into a [`StackTraceInfo`].
//!
//! Two capture modes exist and exactly two:
//!
//! - **User stack**: the error came out of application code. Its printed
//!   trace is re-parsed so that runtime frames are cut away and the user's
//!   frames survive, deduplicated.
//! - **Function call**: the error was raised by the runtime on behalf of a
//!   call. Type and message are kept along with the error's own frames,
//!   untouched.

use crate::captured::CapturedError;
use crate::dedup::dedup_frames;
use crate::error::Result;
use crate::info::StackTraceInfo;
use crate::layout::TraceLayout;
use crate::reconstruct::reconstruct_frames_with;

/// Capture mode paired with the error it captures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceFilter {
    UserStack(Option<CapturedError>),
    FunctionCall(Option<CapturedError>),
}

impl TraceFilter {
    /// Picks the capture mode for an error.
    pub fn select(error: Option<CapturedError>, is_user_stack_trace: bool) -> Self {
        if is_user_stack_trace {
            TraceFilter::UserStack(error)
        } else {
            TraceFilter::FunctionCall(error)
        }
    }

    pub fn error(&self) -> Option<&CapturedError> {
        match self {
            TraceFilter::UserStack(error) | TraceFilter::FunctionCall(error) => error.as_ref(),
        }
    }

    /// Builds the transport record using the runtime's default layout.
    ///
    /// With no error captured, the record names the class and function being
    /// invoked instead.
    pub fn generate(&self, class_name: &str, function_name: &str) -> Result<StackTraceInfo> {
        self.generate_with(class_name, function_name, &TraceLayout::default())
    }

    pub fn generate_with(
        &self,
        class_name: &str,
        function_name: &str,
        layout: &TraceLayout,
    ) -> Result<StackTraceInfo> {
        let Some(error) = self.error() else {
            return Ok(StackTraceInfo::new(class_name, function_name));
        };
        let info = StackTraceInfo::new(error.class_name.as_str(), error.message_or_empty());

        match self {
            TraceFilter::FunctionCall(_) => Ok(info.with_frames(error.frames.clone())),
            TraceFilter::UserStack(_) => {
                let printed = error.printed_stack_trace();
                let frames = reconstruct_frames_with(&printed, layout)?;
                Ok(info.with_frames(dedup_frames(frames)))
            }
        }
    }

    /// Like [`generate`](Self::generate), but a trace that cannot be parsed
    /// degrades to type and message with no frames.
    pub fn generate_lossy(&self, class_name: &str, function_name: &str) -> StackTraceInfo {
        match self.generate(class_name, function_name) {
            Ok(info) => info,
            Err(err) => {
                log::warn!(
                    "failed to reconstruct frames for {}.{}: {}",
                    class_name,
                    function_name,
                    err
                );
                match self.error() {
                    Some(error) => {
                        StackTraceInfo::new(error.class_name.as_str(), error.message_or_empty())
                    }
                    None => StackTraceInfo::new(class_name, function_name),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::StackFrame;

    fn user_error() -> CapturedError {
        CapturedError::new("java.lang.ArithmeticException")
            .with_message("/ by zero")
            .with_frame(StackFrame::new("org.demo.Calc", "div", "Calc.java", 14))
            .with_frame(StackFrame::new("org.demo.Calc", "div", "Calc.java", 14))
            .with_frame(StackFrame::new(
                "com.yuanrong.executor.FunctionHandler",
                "invoke",
                "FunctionHandler.java",
                350,
            ))
            .with_frame(StackFrame::new("org.demo.Calc", "entry", "Calc.java", 3))
    }

    #[test]
    fn select_picks_variant() {
        assert!(matches!(TraceFilter::select(None, true), TraceFilter::UserStack(None)));
        assert!(matches!(TraceFilter::select(None, false), TraceFilter::FunctionCall(None)));
    }

    #[test]
    fn absent_error_names_the_call() {
        for filter in [TraceFilter::UserStack(None), TraceFilter::FunctionCall(None)] {
            let info = filter.generate("org.demo.Calc", "div").unwrap();
            assert_eq!(info.type_name, "org.demo.Calc");
            assert_eq!(info.message, "div");
            assert!(info.frames.is_empty());
        }
    }

    #[test]
    fn function_call_keeps_frames_verbatim() {
        let error = user_error();
        let info = TraceFilter::FunctionCall(Some(error.clone()))
            .generate("C", "f")
            .unwrap();
        assert_eq!(info.type_name, "java.lang.ArithmeticException");
        assert_eq!(info.message, "/ by zero");
        assert_eq!(info.frames, error.frames);
    }

    #[test]
    fn user_stack_filters_and_dedups() {
        let info = TraceFilter::UserStack(Some(user_error()))
            .generate("C", "f")
            .unwrap();
        assert_eq!(
            info.frames,
            vec![
                StackFrame::new("org.demo.Calc", "div", "Calc.java", 14),
                StackFrame::new("org.demo.Calc", "entry", "Calc.java", 3),
            ]
        );
    }

    #[test]
    fn missing_message_becomes_empty() {
        let info = TraceFilter::UserStack(Some(CapturedError::new("java.lang.Error")))
            .generate("C", "f")
            .unwrap();
        assert_eq!(info.message, "");
        assert!(info.frames.is_empty());
    }

    #[test]
    fn unparseable_trace_raises_and_lossy_degrades() {
        // A message spanning lines can inject a frame line with no location.
        let message = format!("bad{}\tat nowhere", crate::layout::LINE_SEPARATOR);
        let error = CapturedError::new("E")
            .with_message(message.clone())
            .with_frame(StackFrame::new("a.B", "c", "B.java", 1));
        let filter = TraceFilter::UserStack(Some(error));

        assert!(matches!(
            filter.generate("C", "f"),
            Err(crate::TraceError::MissingParenthesis { .. })
        ));

        let info = filter.generate_lossy("C", "f");
        assert_eq!(info.type_name, "E");
        assert_eq!(info.message, message);
        assert!(info.frames.is_empty());
    }
}
