//! Line classifier for the read-only note preview.
//!
//! Each line is classified in isolation: there is no carried state, so a
//! code fence line is only ever a marker and never opens a code block.
//! Classification is total and deterministic; identical input always yields
//! an identical descriptor sequence.
//!
//! Precedence (first match wins): `# `, `## `, `- [ ] `, `- [x] `, `- `,
//! `<digits>.<space>`, a fence prefix, a trimmed `---`, then paragraph.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::trace;

static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s").expect("static ordered-item pattern"));

const FENCE: &str = "```";
const FENCE_DISPLAY: &str = "─ code ─";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Heading1,
    Heading2,
    ChecklistUnchecked,
    ChecklistChecked,
    Bullet,
    OrderedItem,
    CodeFenceMarker,
    Divider,
    Paragraph,
}

/// One classified preview line.
///
/// `text` is the payload left after stripping the block marker: the remainder
/// for headings, checklists and bullets, the full line for ordered items and
/// paragraphs, and empty for fence markers and dividers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDescriptor {
    pub kind: LineKind,
    pub text: String,
    pub source_line_index: usize,
}

impl LineDescriptor {
    fn new(kind: LineKind, text: &str, source_line_index: usize) -> Self {
        Self {
            kind,
            text: text.to_string(),
            source_line_index,
        }
    }

    /// Text as the preview shows it.
    pub fn display_text(&self) -> String {
        match self.kind {
            LineKind::Heading1 | LineKind::Heading2 | LineKind::OrderedItem => self.text.clone(),
            LineKind::ChecklistUnchecked => format!("☐ {}", self.text),
            LineKind::ChecklistChecked => format!("☑ {}", self.text),
            LineKind::Bullet => format!("• {}", self.text),
            LineKind::CodeFenceMarker => FENCE_DISPLAY.to_string(),
            LineKind::Divider => String::new(),
            LineKind::Paragraph if self.text.is_empty() => " ".to_string(),
            LineKind::Paragraph => self.text.clone(),
        }
    }
}

/// Classify a single line.
pub fn classify_line(line: &str, source_line_index: usize) -> LineDescriptor {
    use LineKind::*;
    let prefixed = [
        ("# ", Heading1),
        ("## ", Heading2),
        ("- [ ] ", ChecklistUnchecked),
        ("- [x] ", ChecklistChecked),
        ("- ", Bullet),
    ];
    for (prefix, kind) in prefixed {
        if let Some(rest) = line.strip_prefix(prefix) {
            return LineDescriptor::new(kind, rest, source_line_index);
        }
    }
    if ORDERED_ITEM.is_match(line) {
        return LineDescriptor::new(OrderedItem, line, source_line_index);
    }
    if line.starts_with(FENCE) {
        return LineDescriptor::new(CodeFenceMarker, "", source_line_index);
    }
    if line.trim() == "---" {
        return LineDescriptor::new(Divider, "", source_line_index);
    }
    LineDescriptor::new(Paragraph, line, source_line_index)
}

/// Classify every `\n`-separated line of `buffer`.
///
/// An empty buffer yields a single empty paragraph.
pub fn classify(buffer: &str) -> Vec<LineDescriptor> {
    let lines: Vec<LineDescriptor> = buffer
        .split('\n')
        .enumerate()
        .map(|(idx, line)| classify_line(line, idx))
        .collect();
    trace!(target: "preview", bytes = buffer.len(), lines = lines.len(), "classified");
    lines
}

/// Join the display text of each descriptor with newlines.
///
/// Lossy: fence info strings, list markers and dividers do not survive.
pub fn render_plain(lines: &[LineDescriptor]) -> String {
    lines
        .iter()
        .map(LineDescriptor::display_text)
        .collect::<Vec<_>>()
        .join("\n")
}
