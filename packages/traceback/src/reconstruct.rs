//! Printed-trace text back into frames.
//!
//! The input is the conventional JVM rendering of a throwable:
//!
//! ```text
//! java.lang.IllegalStateException: boom
//! 	at com.example.Service.handle(Service.java:21)
//! 	at com.yuanrong.codemanager.CodeExecutor.Execute(CodeExecutor.java:77)
//! Caused by: ...
//! ```
//!
//! This is a heuristic over conventionally formatted text, not a grammar. The
//! line offsets below are load-bearing: consumers on the other side of the
//! boundary expect exactly this slicing, so they are reproduced as-is.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, TraceError};
use crate::frame::StackFrame;
use crate::layout::TraceLayout;

lazy_static! {
    static ref FRAME_LINE: Regex = Regex::new(r"^\tat.*$").unwrap();
    static ref METHOD_PART: Regex = Regex::new(r"(?-u)((\w+\.?)+\w+)\.(\w+)").unwrap();
    static ref LOCATION_PART: Regex = Regex::new(r"(?-u)(\w+\.java):(\d+)").unwrap();
}

/// Parses a printed trace using the runtime's default layout.
pub fn reconstruct_frames(printed: &str) -> Result<Vec<StackFrame>> {
    reconstruct_frames_with(printed, &TraceLayout::default())
}

/// Parses a printed trace into the user frames it contains.
///
/// Frames belonging to the runtime package are skipped, and so is everything
/// from the runtime boundary onward. Frame lines whose method or location do
/// not match the expected shape (`Native Method`, `Unknown Source`) are
/// skipped too. The result is not deduplicated.
pub fn reconstruct_frames_with(printed: &str, layout: &TraceLayout) -> Result<Vec<StackFrame>> {
    let mut frames = Vec::new();
    if printed.is_empty() {
        log::error!("throwable has no stack information");
        return Ok(frames);
    }

    let lines = split_lines(printed, &layout.line_separator);
    let start = cause_section_start(&lines, printed, layout);
    let (boundary, found) = runtime_boundary(&lines, layout);
    let end = scan_end(lines.len(), boundary, found, layout.execute_depth);

    log::debug!(
        "reconstructing frames: start {}, runtime boundary {} (found: {}), end {}, lines {}",
        start,
        boundary,
        found,
        end,
        lines.len()
    );

    for line in lines.iter().take(end).skip(start) {
        if !FRAME_LINE.is_match(line) || line.contains(layout.runtime_package.as_str()) {
            continue;
        }
        if let Some(frame) = parse_frame_line(line.trim())? {
            frames.push(frame);
        }
    }
    Ok(frames)
}

/// Parses one trimmed frame line such as `at a.b.C.m(C.java:12)`.
///
/// Returns `Ok(None)` when the line has the right shape but the method or
/// location part does not match, e.g. `at a.b.C.m(Native Method)`.
pub fn parse_frame_line(line: &str) -> Result<Option<StackFrame>> {
    let mut pieces: Vec<&str> = line.split('(').collect();
    while pieces.len() > 1 && pieces.last() == Some(&"") {
        pieces.pop();
    }
    if pieces.len() < 2 {
        return Err(TraceError::MissingParenthesis {
            line: line.to_string(),
        });
    }

    let (Some(method), Some(location)) = (
        METHOD_PART.captures(pieces[0]),
        LOCATION_PART.captures(pieces[1]),
    ) else {
        return Ok(None);
    };

    let line_number = location[2]
        .parse::<i32>()
        .map_err(|source| TraceError::InvalidLineNumber {
            line: line.to_string(),
            source,
        })?;

    Ok(Some(StackFrame::new(
        &method[1],
        &method[3],
        &location[1],
        line_number,
    )))
}

/// Splits like the printing side joined, dropping trailing empty pieces.
fn split_lines<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut lines: Vec<&str> = text.split(separator).collect();
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Index of the first line of the first `Caused by:` section, or 1 to skip
/// the top-level header when there is no cause.
fn cause_section_start(lines: &[&str], printed: &str, layout: &TraceLayout) -> usize {
    let marker = layout.caused_by_marker.as_str();
    if !printed.contains(marker) {
        return 1;
    }
    lines.iter().take_while(|line| !line.contains(marker)).count()
}

/// First empty or execute-marker line, pulled back by the runtime's depth.
fn runtime_boundary(lines: &[&str], layout: &TraceLayout) -> (usize, bool) {
    let position = lines
        .iter()
        .position(|line| line.is_empty() || line.contains(layout.execute_marker.as_str()));
    match position {
        Some(index) if index > layout.execute_depth => (index - layout.execute_depth + 1, true),
        Some(index) => (index, true),
        None => (lines.len(), false),
    }
}

fn scan_end(len: usize, boundary: usize, found: bool, depth: usize) -> usize {
    if len >= depth && boundary == len - depth {
        boundary
    } else if boundary == len && found {
        if boundary > depth {
            boundary - depth
        } else {
            len
        }
    } else {
        boundary
    }
}
