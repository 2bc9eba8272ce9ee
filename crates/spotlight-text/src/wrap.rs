#![forbid(unsafe_code)]

//! Text wrapping and ellipsizing with Unicode correctness.
//!
//! Widths are display cells: CJK ideographs and most emoji count as two,
//! combining marks as zero. Nothing here ever splits a grapheme cluster.
//!
//! # Example
//! ```
//! use spotlight_text::wrap::{ellipsize_middle, wrap_text};
//!
//! let lines = wrap_text("Hello world foo bar", 10);
//! assert_eq!(lines, vec!["Hello", "world foo", "bar"]);
//!
//! let lines = wrap_text("a supercalifragilistic b", 10);
//! assert_eq!(lines, vec!["a", "supercalif", "ragilistic", "b"]);
//!
//! assert_eq!(ellipsize_middle("abcdefghij", 7, "…"), "abc…hij");
//! ```

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Placeholder inserted by caption ellipsizing.
pub const ELLIPSIS: &str = "…";

/// Wrap text to `width` cells at word boundaries.
///
/// Words wider than `width` break at grapheme boundaries. Embedded newlines
/// start new lines. Trailing whitespace is trimmed from every line and
/// continuation lines drop their leading whitespace. The result always has
/// at least one line. A zero width returns the text
/// unchanged as a single line.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut out = LineBuilder::new(width);
    for paragraph in text.split('\n') {
        out.push_words(paragraph);
        out.end_paragraph();
    }
    out.finish()
}

/// Accumulates wrapped lines.
struct LineBuilder {
    width: usize,
    lines: Vec<String>,
    current: String,
    current_width: usize,
    paragraph_start: usize,
}

impl LineBuilder {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            current: String::new(),
            current_width: 0,
            paragraph_start: 0,
        }
    }

    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line.trim_end().to_string());
        self.current_width = 0;
    }

    fn append(&mut self, piece: &str, piece_width: usize) {
        self.current.push_str(piece);
        self.current_width += piece_width;
    }

    fn fits(&self, piece_width: usize) -> bool {
        self.current_width + piece_width <= self.width
    }

    fn push_chars(&mut self, paragraph: &str) {
        for grapheme in paragraph.graphemes(true) {
            let w = grapheme.width();
            if !self.fits(w) && !self.current.is_empty() {
                self.break_line();
            }
            self.append(grapheme, w);
        }
    }

    fn push_words(&mut self, paragraph: &str) {
        let mut first_chunk = true;
        for chunk in split_words(paragraph) {
            let is_space = chunk.chars().all(char::is_whitespace);
            let w = chunk.width();

            // Leading whitespace survives only at the start of a paragraph.
            if is_space && self.current.is_empty() && !first_chunk {
                continue;
            }
            first_chunk = false;

            if self.fits(w) {
                self.append(chunk, w);
                continue;
            }
            if is_space {
                self.break_line();
                continue;
            }
            if !self.current.is_empty() {
                self.break_line();
            }
            if w <= self.width {
                self.append(chunk, w);
            } else {
                self.push_chars(chunk);
            }
        }
    }

    /// Close the paragraph. Every paragraph yields at least one line.
    fn end_paragraph(&mut self) {
        if !self.current.is_empty() || self.lines.len() == self.paragraph_start {
            self.break_line();
        }
        self.paragraph_start = self.lines.len();
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.break_line();
        }
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines
    }
}

/// Split text into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (idx, grapheme) in text.grapheme_indices(true) {
        let is_space = grapheme.chars().all(char::is_whitespace);
        if in_space.is_some_and(|prev| prev != is_space) {
            chunks.push(&text[start..idx]);
            start = idx;
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Keep the head of `text` that fits within `max_width` cells.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if width + w > max_width {
            break;
        }
        result.push_str(grapheme);
        width += w;
    }
    result
}

/// Keep the tail of `text` that fits within `max_width` cells.
fn truncate_tail_to_width(text: &str, max_width: usize) -> &str {
    let mut width = 0;
    let mut start = text.len();
    for (idx, grapheme) in text.grapheme_indices(true).rev() {
        let w = grapheme.width();
        if width + w > max_width {
            break;
        }
        width += w;
        start = idx;
    }
    &text[start..]
}

/// Replace the middle of `text` with `ellipsis` so the result fits in
/// `max_width` cells.
///
/// The head gets the larger half of the remaining budget; cells the head
/// could not use (a wide grapheme at the boundary) go to the tail.
#[must_use]
pub fn ellipsize_middle(text: &str, max_width: usize, ellipsis: &str) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let ellipsis_width = ellipsis.width();
    if ellipsis_width >= max_width {
        return truncate_to_width(text, max_width);
    }

    let budget = max_width - ellipsis_width;
    let head = truncate_to_width(text, budget.div_ceil(2));
    let tail = truncate_tail_to_width(text, budget - head.width());

    let mut result = String::with_capacity(head.len() + ellipsis.len() + tail.len());
    result.push_str(&head);
    result.push_str(ellipsis);
    result.push_str(tail);
    result
}

/// Display width of text in cells.
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.width()
}
