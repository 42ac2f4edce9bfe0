//! Correlation tags embedded in log lines.
//!
//! A line written by a user logging framework may carry the ids of the
//! invocation that produced it as `MARKER:<request_id>|<invoke_id>`. The tag
//! wins over the thread's ambient context and is stripped from the content
//! before the line is forwarded.

use regex::Regex;

use crate::correlation::CorrelationContext;

/// Marker used when none is configured.
pub const DEFAULT_TAG_MARKER: &str = "logRequestId";

/// Separator between the ids in a tag payload.
const ID_SEPARATOR: char = '|';

/// Finds and strips correlation tags for one marker.
#[derive(Clone, Debug)]
pub struct TagMatcher {
    marker_len: usize,
    pattern: Regex,
}

impl TagMatcher {
    pub fn new(marker: &str) -> Self {
        // An escaped literal followed by a fixed suffix always compiles.
        let pattern = Regex::new(&format!(r"{}:(\S)+", regex::escape(marker)))
            .expect("escaped tag marker is a valid pattern");
        Self {
            marker_len: marker.len() + 1,
            pattern,
        }
    }

    /// Removes the first tag (and one space following it) from `line`.
    pub fn extract(&self, line: &str) -> TagExtraction {
        let Some(found) = self.pattern.find(line) else {
            return TagExtraction {
                message: line.to_string(),
                ids: None,
            };
        };

        let payload = &found.as_str()[self.marker_len..];
        let ids = payload.split(ID_SEPARATOR).map(str::to_string).collect();

        let rest = &line[found.end()..];
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        let mut message = String::with_capacity(line.len());
        message.push_str(&line[..found.start()]);
        message.push_str(rest);

        TagExtraction {
            message,
            ids: Some(ids),
        }
    }
}

impl Default for TagMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_MARKER)
    }
}

/// A line with its tag removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagExtraction {
    pub message: String,
    /// Payload ids, present iff a tag was found.
    pub ids: Option<Vec<String>>,
}

impl TagExtraction {
    /// Ids from the tag, if it carried exactly a request id and an invoke id.
    pub fn correlation_ids(&self) -> Option<CorrelationIds> {
        self.ids.as_deref().and_then(CorrelationIds::from_tag)
    }
}

/// The pair of ids stamped onto each forwarded record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorrelationIds {
    pub request_id: String,
    pub invoke_id: String,
}

impl CorrelationIds {
    pub fn from_tag(ids: &[String]) -> Option<Self> {
        match ids {
            [request_id, invoke_id] => Some(Self {
                request_id: request_id.clone(),
                invoke_id: invoke_id.clone(),
            }),
            _ => None,
        }
    }

    pub fn from_context(context: &CorrelationContext) -> Self {
        Self {
            request_id: context.request_id.clone(),
            invoke_id: context.invoke_id.clone(),
        }
    }
}
