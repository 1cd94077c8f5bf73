//! Selection model and range-based text surgery for the note body.
//!
//! Offsets are counted in Unicode scalar values (`char`s), never bytes, so a
//! selection can not split a code point. Conversion to UTF-8 byte indices
//! happens only inside [`edit`] at the moment a slice is taken.
//!
//! Every operation here is pure: the caller's buffer is borrowed, a fresh
//! [`EditOutcome`] is returned, and no state survives the call.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod edit;
pub use edit::{
    EditOutcome, EmptyWrap, replace_range, selected_text, wrap_selection, wrap_selection_with,
};

/// Number of text units (chars) in `text`; the upper bound for any selection over it.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Active caret or range over a buffer, expressed as `[start, end)` char offsets.
///
/// A collapsed selection (`start == end`) is a plain caret. Values arriving
/// from the host may be out of range or reversed; [`Selection::clamp`] is the
/// one place where they are brought back inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Construct a selection normalizing ordering so that `start <= end`.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Caret placed after the last char of `text`.
    pub fn end_of(text: &str) -> Self {
        Self::caret(char_len(text))
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return a copy satisfying `0 <= start <= end <= len`.
    pub fn clamp(self, len: usize) -> Self {
        let clamped = Self::new(self.start.min(len), self.end.min(len));
        if clamped != self {
            debug!(
                target: "text.edit",
                start = self.start,
                end = self.end,
                len,
                clamped_start = clamped.start,
                clamped_end = clamped.end,
                "selection_clamped"
            );
        }
        clamped
    }
}
