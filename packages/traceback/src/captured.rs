//! In-process model of a thrown error.

use std::fmt;

use crate::frame::StackFrame;
use crate::layout::LINE_SEPARATOR;

/// Longest printed trace carried in an error message, in chars.
pub const MAX_STACK_TRACE_CHARS: usize = 10_000;

/// A thrown error as the invocation boundary sees it.
///
/// This is the input to the capture filters. It mirrors what a JVM throwable
/// exposes: a type name, an optional message, its own frames, and an optional
/// cause.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedError {
    pub class_name: String,
    pub message: Option<String>,
    pub frames: Vec<StackFrame>,
    pub cause: Option<Box<CapturedError>>,
}

impl CapturedError {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_frames(mut self, frames: impl IntoIterator<Item = StackFrame>) -> Self {
        self.frames.extend(frames);
        self
    }

    pub fn with_cause(mut self, cause: CapturedError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The message, or an empty string when there is none.
    pub fn message_or_empty(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    /// Renders the conventional multi-line printed trace, causes included.
    pub fn printed_stack_trace(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.to_string());
        out.push_str(LINE_SEPARATOR);
        for frame in &self.frames {
            push_frame_line(&mut out, frame);
        }

        let mut enclosing = &self.frames;
        let mut cause = self.cause.as_deref();
        while let Some(current) = cause {
            let unique = unique_frame_count(&current.frames, enclosing);
            out.push_str("Caused by: ");
            out.push_str(&current.to_string());
            out.push_str(LINE_SEPARATOR);
            for frame in &current.frames[..unique] {
                push_frame_line(&mut out, frame);
            }
            let in_common = current.frames.len() - unique;
            if in_common != 0 {
                out.push_str(&format!("\t... {} more", in_common));
                out.push_str(LINE_SEPARATOR);
            }
            enclosing = &current.frames;
            cause = current.cause.as_deref();
        }
        out
    }

    /// The printed trace cut to at most `max_chars` chars.
    pub fn truncated_printed_trace(&self, max_chars: usize) -> String {
        let printed = self.printed_stack_trace();
        match printed.char_indices().nth(max_chars) {
            Some((cut, _)) => printed[..cut].to_string(),
            None => printed,
        }
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.class_name, message),
            None => write!(f, "{}", self.class_name),
        }
    }
}

fn push_frame_line(out: &mut String, frame: &StackFrame) {
    out.push_str("\tat ");
    out.push_str(&frame.to_string());
    out.push_str(LINE_SEPARATOR);
}

/// Frames of `trace` left after removing the tail it shares with `enclosing`.
fn unique_frame_count(trace: &[StackFrame], enclosing: &[StackFrame]) -> usize {
    let shared = trace
        .iter()
        .rev()
        .zip(enclosing.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    trace.len() - shared
}
