use std::ops::Range;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, decompose and drop combining marks, so `Exámen` folds to
/// `examen`.
pub fn normalize(text: &str) -> String {
    FoldedText::new(text).folded
}

/// Folded text plus, for every folded byte, the byte range of the original
/// character it came from. Lets matches found on folded text be mapped back
/// onto what the user sees.
#[derive(Debug, Clone)]
pub struct FoldedText {
    folded: String,
    origins: Vec<Range<usize>>,
}

impl FoldedText {
    pub fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origins = Vec::with_capacity(text.len());
        for (start, ch) in text.char_indices() {
            let origin = start..start + ch.len_utf8();
            for folded_ch in ch
                .to_lowercase()
                .nfd()
                .filter(|candidate| !is_combining_mark(*candidate))
            {
                folded.push(folded_ch);
                for _ in 0..folded_ch.len_utf8() {
                    origins.push(origin.clone());
                }
            }
        }
        Self { folded, origins }
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Original byte ranges of every non-overlapping occurrence of an
    /// already-normalized `needle`.
    pub fn find_all(&self, needle: &str) -> Vec<Range<usize>> {
        if needle.is_empty() {
            return Vec::new();
        }
        let mut ranges: Vec<Range<usize>> = Vec::new();
        for (start, matched) in self.folded.match_indices(needle) {
            let end = start + matched.len();
            let (Some(first), Some(last)) = (self.origins.get(start), self.origins.get(end - 1))
            else {
                continue;
            };
            let range = first.start..last.end;
            match ranges.last_mut() {
                Some(previous) if previous.end > range.start => previous.end = range.end,
                _ => ranges.push(range),
            }
        }
        ranges
    }
}
