//! Range editor: `replace_range` and `wrap_selection`.
//!
//! Both primitives clamp the incoming selection first and therefore never
//! fail. The returned cursor is always a char offset into the new text.

use crate::{Selection, char_len};
use tracing::trace;

/// New buffer plus the collapsed cursor position produced by one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub text: String,
    pub cursor: usize,
}

/// Behavior of a wrap when the selection is a bare caret.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EmptyWrap {
    /// Insert `prefix + suffix` and leave the cursor between them.
    #[default]
    Markers,
    /// Insert `prefix + word + suffix` as if `word` had been selected.
    Placeholder(String),
}

/// Byte index of the char at `offset`, or `text.len()` past the end.
fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Borrow the text covered by `selection` (after clamping).
pub fn selected_text(buffer: &str, selection: Selection) -> &str {
    let sel = selection.clamp(char_len(buffer));
    let start = byte_index(buffer, sel.start);
    let end = start + byte_index(&buffer[start..], sel.len());
    &buffer[start..end]
}

/// Remove the selected range and splice `inserted` in its place.
///
/// The cursor lands immediately after the inserted text.
pub fn replace_range(buffer: &str, selection: Selection, inserted: &str) -> EditOutcome {
    let sel = selection.clamp(char_len(buffer));
    let start = byte_index(buffer, sel.start);
    let end = start + byte_index(&buffer[start..], sel.len());

    let mut text = String::with_capacity(buffer.len() - (end - start) + inserted.len());
    text.push_str(&buffer[..start]);
    text.push_str(inserted);
    text.push_str(&buffer[end..]);

    let cursor = sel.start + char_len(inserted);
    trace!(
        target: "text.edit",
        start = sel.start,
        end = sel.end,
        inserted_bytes = inserted.len(),
        cursor,
        "replace_range"
    );
    EditOutcome { text, cursor }
}

/// Surround the selection with `prefix`/`suffix` using the default
/// [`EmptyWrap::Markers`] policy for a bare caret.
pub fn wrap_selection(
    buffer: &str,
    selection: Selection,
    prefix: &str,
    suffix: &str,
) -> EditOutcome {
    wrap_selection_with(buffer, selection, prefix, suffix, &EmptyWrap::Markers)
}

/// Surround the selection with `prefix`/`suffix`.
///
/// A non-empty selection is replaced by the wrapped text and the cursor is put
/// after the suffix. A caret is handled according to `empty`.
pub fn wrap_selection_with(
    buffer: &str,
    selection: Selection,
    prefix: &str,
    suffix: &str,
    empty: &EmptyWrap,
) -> EditOutcome {
    let sel = selection.clamp(char_len(buffer));
    if !sel.is_collapsed() {
        let selected = selected_text(buffer, sel);
        return replace_range(buffer, sel, &format!("{prefix}{selected}{suffix}"));
    }
    match empty {
        EmptyWrap::Markers => {
            let mut out = replace_range(buffer, sel, &format!("{prefix}{suffix}"));
            out.cursor = sel.start + char_len(prefix);
            out
        }
        EmptyWrap::Placeholder(word) => {
            replace_range(buffer, sel, &format!("{prefix}{word}{suffix}"))
        }
    }
}
