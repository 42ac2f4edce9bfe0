//! Configuration for log streaming.

use std::str::FromStr;

use crate::chunk::MAX_LOG_CHUNK_CHARS;
use crate::tag::DEFAULT_TAG_MARKER;

/// Platform line separator.
///
/// Same value as `yr_traceback::LINE_SEPARATOR`. The two crates do not depend
/// on each other, so each defines its own.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// Platform line separator.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

pub const ENV_TAG_MARKER: &str = "YR_LOG_TAG_MARKER";
pub const ENV_MAX_CHUNK_CHARS: &str = "YR_LOG_MAX_CHUNK_CHARS";
pub const ENV_FORWARD_WORKERS: &str = "YR_LOG_FORWARD_WORKERS";
pub const ENV_FORWARD_QUEUE: &str = "YR_LOG_FORWARD_QUEUE";

/// Configuration shared by streams, loggers and the forwarding pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStreamConfig {
    /// Marker preceding an embedded `request_id|invoke_id` tag.
    pub tag_marker: String,
    /// Largest content carried by one record, in chars.
    pub max_chunk_chars: usize,
    /// Separator splitting a write into independent lines.
    pub line_separator: String,
    /// Number of forwarding worker threads.
    pub forward_workers: usize,
    /// Capacity of the forwarding queue.
    pub forward_queue_capacity: usize,
}

impl Default for LogStreamConfig {
    fn default() -> Self {
        Self {
            tag_marker: DEFAULT_TAG_MARKER.to_string(),
            max_chunk_chars: MAX_LOG_CHUNK_CHARS,
            line_separator: LINE_SEPARATOR.to_string(),
            forward_workers: 1,
            forward_queue_capacity: 1024,
        }
    }
}

impl LogStreamConfig {
    /// Reads overrides from the process environment.
    ///
    /// Unset variables keep their defaults. Unparsable or zero numeric
    /// values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), with an explicit variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(marker) = lookup(ENV_TAG_MARKER) {
            let marker = marker.trim();
            if marker.is_empty() {
                log::warn!("{} is empty, using {}", ENV_TAG_MARKER, config.tag_marker);
            } else {
                config.tag_marker = marker.to_string();
            }
        }
        if let Some(n) = parse_positive(&lookup, ENV_MAX_CHUNK_CHARS) {
            config.max_chunk_chars = n;
        }
        if let Some(n) = parse_positive(&lookup, ENV_FORWARD_WORKERS) {
            config.forward_workers = n;
        }
        if let Some(n) = parse_positive(&lookup, ENV_FORWARD_QUEUE) {
            config.forward_queue_capacity = n;
        }

        config
    }
}

fn parse_positive<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match usize::from_str(raw.trim()) {
        Ok(0) => {
            log::warn!("{} must be positive, ignoring 0", key);
            None
        }
        Ok(n) => Some(n),
        Err(e) => {
            log::warn!("ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}
