//! A single stack frame.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of a stack trace.
///
/// Frames are plain values: two frames are the same frame when all four
/// fields agree. That equality is what [`dedup_frames`](crate::dedup_frames)
/// keys on.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub class_name: String,
    pub method_name: String,
    pub file_name: String,
    pub line_number: i32,
}

impl StackFrame {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        file_name: impl Into<String>,
        line_number: i32,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            file_name: file_name.into(),
            line_number,
        }
    }

    /// Whether the frame carries no class name.
    ///
    /// Such frames come out of partial parses and are dropped by dedup.
    pub fn is_anonymous(&self) -> bool {
        self.class_name.is_empty()
    }
}

impl fmt::Display for StackFrame {
    /// Renders the frame the way a JVM prints it, e.g.
    /// `com.example.Handler.call(Handler.java:42)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.class_name, self.method_name)?;
        if self.file_name.is_empty() {
            write!(f, "Unknown Source")?;
        } else if self.line_number >= 0 {
            write!(f, "{}:{}", self.file_name, self.line_number)?;
        } else {
            write!(f, "{}", self.file_name)?;
        }
        write!(f, ")")
    }
}
