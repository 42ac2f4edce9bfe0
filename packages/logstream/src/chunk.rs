//! Splitting oversized messages into bounded chunks.

use std::iter::FusedIterator;

/// Largest chunk carried by a single log record, in chars.
pub const MAX_LOG_CHUNK_CHARS: usize = 90 * 1024;

/// Splits `message` into consecutive pieces of at most `max_chars` chars.
///
/// The pieces cover the message exactly once, in order. An empty message
/// yields a single empty piece; a message whose length is an exact multiple
/// of `max_chars` yields no trailing empty piece. A `max_chars` of zero is
/// treated as one.
///
/// The iterator borrows the message and is `Clone`, so a split can be
/// replayed without recomputing anything up front.
pub fn split_message(message: &str, max_chars: usize) -> MessageChunks<'_> {
    MessageChunks {
        rest: message,
        max_chars: max_chars.max(1),
        started: false,
    }
}

/// Iterator returned by [`split_message`].
#[derive(Clone, Debug)]
pub struct MessageChunks<'a> {
    rest: &'a str,
    max_chars: usize,
    started: bool,
}

impl<'a> Iterator for MessageChunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            if self.started {
                return None;
            }
            self.started = true;
            return Some("");
        }
        self.started = true;

        let cut = self
            .rest
            .char_indices()
            .nth(self.max_chars)
            .map(|(index, _)| index)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(cut);
        self.rest = rest;
        Some(chunk)
    }
}

impl FusedIterator for MessageChunks<'_> {}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Concatenating the chunks reproduces the message.
        #[test]
        fn prop_covers_exactly(s in ".*", max in 1usize..16) {
            let joined: String = split_message(&s, max).collect();
            prop_assert_eq!(joined, s);
        }

        /// Every chunk but the last is full; none is oversized.
        #[test]
        fn prop_chunk_sizes(s in ".*", max in 1usize..16) {
            let sizes: Vec<usize> = split_message(&s, max).map(|c| c.chars().count()).collect();
            let (last, full) = sizes.split_last().unwrap();
            prop_assert!(full.iter().all(|&n| n == max));
            prop_assert!(*last <= max);
        }

        #[test]
        fn prop_chunk_count(s in ".*", max in 1usize..16) {
            let len = s.chars().count();
            let expected = if len == 0 { 1 } else { len.div_ceil(max) };
            prop_assert_eq!(split_message(&s, max).count(), expected);
        }
    }
}
