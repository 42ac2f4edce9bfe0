//! The portable exception record carried across the runtime boundary.

use serde::{Deserialize, Serialize};

use crate::frame::StackFrame;

/// Origin-language tag used when none is given.
pub const DEFAULT_LANGUAGE: &str = "java";

/// One captured exception, ready for transport.
///
/// Built once per failed invocation, serialized, and thrown away after the
/// receiving side has surfaced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTraceInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    pub message: String,
    #[serde(rename = "stackTraceElements", default)]
    pub frames: Vec<StackFrame>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl StackTraceInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            frames: Vec::new(),
            language: default_language(),
        }
    }

    pub fn with_frames(mut self, frames: Vec<StackFrame>) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        let info = StackTraceInfo::new("java.lang.IllegalStateException", "boom")
            .with_frames(vec![StackFrame::new("A", "m", "A.java", 3)]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "java.lang.IllegalStateException");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["language"], "java");
        assert_eq!(json["stackTraceElements"][0]["className"], "A");
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let info: StackTraceInfo =
            serde_json::from_str(r#"{"type": "T", "message": "m"}"#).unwrap();
        assert!(info.frames.is_empty());
        assert_eq!(info.language, DEFAULT_LANGUAGE);
    }
}
