use std::ops::Range;

use crate::search::{normalize, FoldedText};

/// Byte ranges of `text` matching `query`, ignoring case and accents.
/// Blank queries match nothing.
pub fn match_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    let needle = normalize(query.trim());
    if needle.is_empty() {
        return Vec::new();
    }
    FoldedText::new(text).find_all(&needle)
}

/// Splits `text` into `(segment, matched)` pieces covering it entirely.
pub fn split_matches<'t>(text: &'t str, query: &str) -> Vec<(&'t str, bool)> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for range in match_ranges(text, query) {
        if range.start > cursor {
            pieces.push((&text[cursor..range.start], false));
        }
        pieces.push((&text[range.clone()], true));
        cursor = range.end;
    }
    if cursor < text.len() {
        pieces.push((&text[cursor..], false));
    }
    pieces
}
