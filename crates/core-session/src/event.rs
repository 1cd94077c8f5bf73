//! Events delivered by the host UI and the state it renders from.

use core_text::Selection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Write,
    Preview,
}

/// Input from the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    SelectionChanged(Selection),
    /// Full replacement text from the input widget.
    TextInput(String),
    ToolPressed(String),
    TitleChanged(String),
    Undo,
    Redo,
    SetMode(ViewMode),
}

/// Everything the host needs to draw the editor surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView<'a> {
    pub title: &'a str,
    pub buffer: &'a str,
    pub selection: Selection,
    pub can_undo: bool,
    pub can_redo: bool,
    pub saving: bool,
    pub mode: ViewMode,
}
