//! Formatting toolbar: a fixed, ordered registry of named text transforms.
//!
//! A tool knows nothing about history or sessions. It maps `(buffer,
//! selection)` to an [`EditOutcome`] through one of the range editor
//! primitives, and the registry is the only place tool ids are resolved.

use core_text::{EditOutcome, EmptyWrap, Selection, replace_range, wrap_selection_with};
use thiserror::Error;
use tracing::{debug, trace};

/// Pure transform used by custom tools.
pub type TransformFn = fn(&str, Selection) -> EditOutcome;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("tool `{0}` is already registered")]
    DuplicateTool(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub enum ToolAction {
    /// Surround the selection with `prefix`/`suffix`.
    Wrap {
        prefix: &'static str,
        suffix: &'static str,
    },
    /// Replace the selection with fixed text.
    Insert(&'static str),
    Custom(TransformFn),
}

#[derive(Debug, Clone, Copy)]
pub struct Tool {
    pub id: &'static str,
    pub label: &'static str,
    pub action: ToolAction,
}

impl Tool {
    pub const fn wrap(id: &'static str, label: &'static str, marker: &'static str) -> Self {
        Self {
            id,
            label,
            action: ToolAction::Wrap {
                prefix: marker,
                suffix: marker,
            },
        }
    }

    pub const fn insert(id: &'static str, label: &'static str, text: &'static str) -> Self {
        Self {
            id,
            label,
            action: ToolAction::Insert(text),
        }
    }

    pub const fn custom(id: &'static str, label: &'static str, transform: TransformFn) -> Self {
        Self {
            id,
            label,
            action: ToolAction::Custom(transform),
        }
    }

    /// Run the transform. `empty` only matters for wrap tools on a bare caret.
    pub fn apply(&self, buffer: &str, selection: Selection, empty: &EmptyWrap) -> EditOutcome {
        match self.action {
            ToolAction::Wrap { prefix, suffix } => {
                wrap_selection_with(buffer, selection, prefix, suffix, empty)
            }
            ToolAction::Insert(text) => replace_range(buffer, selection, text),
            ToolAction::Custom(transform) => transform(buffer, selection),
        }
    }
}

pub const BOLD: Tool = Tool::wrap("bold", "B", "**");
pub const ITALIC: Tool = Tool::wrap("italic", "I", "_");
pub const HEADING1: Tool = Tool::insert("heading1", "H1", "\n# ");
pub const BULLET: Tool = Tool::insert("bullet", "•", "\n- ");
pub const ORDERED: Tool = Tool::insert("ordered", "1.", "\n1. ");
pub const CHECKLIST: Tool = Tool::insert("checklist", "☑", "\n- [ ] ");
pub const CODE_FENCE: Tool = Tool::insert("code", "</>", "\n```\n\n```\n");

/// Built-in toolbar in display order.
pub const BUILTIN_TOOLS: [Tool; 7] = [BOLD, ITALIC, HEADING1, BULLET, ORDERED, CHECKLIST, CODE_FENCE];

#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    empty_wrap: EmptyWrap,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::with_empty_wrap(EmptyWrap::Markers)
    }

    pub fn with_empty_wrap(empty_wrap: EmptyWrap) -> Self {
        Self {
            tools: BUILTIN_TOOLS.to_vec(),
            empty_wrap,
        }
    }

    pub fn empty_wrap(&self) -> &EmptyWrap {
        &self.empty_wrap
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&Tool, ToolError> {
        self.tools
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ToolError::UnknownTool(id.to_string()))
    }

    /// Append a tool to the end of the toolbar.
    pub fn register(&mut self, tool: Tool) -> Result<(), ToolError> {
        if self.tools.iter().any(|t| t.id == tool.id) {
            return Err(ToolError::DuplicateTool(tool.id));
        }
        debug!(target: "tools", id = tool.id, label = tool.label, "tool_registered");
        self.tools.push(tool);
        Ok(())
    }

    /// Resolve `id` and run its transform under this registry's wrap policy.
    pub fn apply(
        &self,
        id: &str,
        buffer: &str,
        selection: Selection,
    ) -> Result<EditOutcome, ToolError> {
        let tool = self.get(id)?;
        let out = tool.apply(buffer, selection, &self.empty_wrap);
        trace!(target: "tools", id, start = selection.start, end = selection.end, cursor = out.cursor, "tool_applied");
        Ok(out)
    }
}
