//! Frame deduplication.

use std::collections::HashSet;

use crate::frame::StackFrame;

/// Drops anonymous frames and exact duplicates, keeping first occurrences in
/// their original order.
pub fn dedup_frames(frames: Vec<StackFrame>) -> Vec<StackFrame> {
    let mut seen = HashSet::with_capacity(frames.len());
    frames
        .into_iter()
        .filter(|frame| !frame.is_anonymous())
        .filter(|frame| seen.insert(frame.clone()))
        .collect()
}
