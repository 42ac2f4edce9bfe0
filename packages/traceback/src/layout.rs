//! Markers describing how the runtime's printed traces are laid out.

/// The platform line separator, as printed traces use it.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// The platform line separator, as printed traces use it.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Frame line marking where user frames end and the runtime's executor begins.
pub const RUNTIME_EXECUTE_MARKER: &str = "at com.yuanrong.codemanager.CodeExecutor.Execute";

/// Number of runtime-owned lines that sit above the execute marker.
pub const RUNTIME_EXECUTE_DEPTH: usize = 6;

/// Header that opens a nested cause section.
pub const CAUSED_BY_MARKER: &str = "Caused by:";

/// Package prefix of every runtime-internal frame.
pub const RUNTIME_PACKAGE: &str = "com.yuanrong";

/// Where the runtime sits inside a printed trace.
///
/// The defaults describe the runtime's own executor. The depth is a fixed
/// property of the executor's call chain; it is not derived from the text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceLayout {
    pub line_separator: String,
    pub execute_marker: String,
    pub execute_depth: usize,
    pub caused_by_marker: String,
    pub runtime_package: String,
}

impl Default for TraceLayout {
    fn default() -> Self {
        Self {
            line_separator: LINE_SEPARATOR.to_string(),
            execute_marker: RUNTIME_EXECUTE_MARKER.to_string(),
            execute_depth: RUNTIME_EXECUTE_DEPTH,
            caused_by_marker: CAUSED_BY_MARKER.to_string(),
            runtime_package: RUNTIME_PACKAGE.to_string(),
        }
    }
}
