//! Editor session: the composition root for one open note.
//!
//! A session owns the note body (buffer), the active selection, the bounded
//! undo/redo history, the toolbar registry and the note title. Every
//! operation except [`EditorSession::save`] is synchronous and pure with
//! respect to the outside world.
//!
//! State transitions:
//! - `set_content` / `apply_tool`: commit the previous buffer, install the new one.
//! - `undo` / `redo`: swap buffers through the history; caret goes to end-of-text.
//! - `set_selection`: selection only, never recorded in history.
//! - `save`: snapshot `{title, content, updated_at}` and hand it to the store.
//!
//! Save model: `save()` takes its snapshot immediately and returns a `'static`
//! future, so edits may continue while it is pending and the write completes
//! even if the session is dropped first. A per-session async mutex admits one
//! in-flight save at a time. Each snapshot is stamped with a sequence number
//! when `save()` is called; a save that gets its turn after a newer snapshot
//! has already been written is skipped, so the store never moves backwards.

pub mod document;
pub mod event;
pub mod store;

pub use document::{Document, UNTITLED, now_millis};
pub use event::{HostEvent, SessionView, ViewMode};
pub use store::{MemoryNoteStore, NoteStore, StoreError};

use core_config::Config;
use core_history::{DEFAULT_HISTORY_CAP, History};
use core_preview::{LineDescriptor, classify};
use core_text::{EmptyWrap, Selection, char_len};
use core_tools::{ToolError, ToolRegistry};
use std::future::Future;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Tunables a session is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub history_capacity: usize,
    pub empty_wrap: EmptyWrap,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAP,
            empty_wrap: EmptyWrap::Markers,
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            history_capacity: config.effective_history_capacity,
            empty_wrap: config.empty_wrap(),
        }
    }
}

/// Decrements the pending-save counter when a save future finishes or is dropped.
struct PendingSave(Arc<AtomicUsize>);

impl PendingSave {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for PendingSave {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Result of a completed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The snapshot was handed to the store.
    Written(Document),
    /// A newer snapshot from the same session was already written; this one was dropped.
    Superseded(Document),
}

impl SaveOutcome {
    pub fn document(&self) -> &Document {
        match self {
            Self::Written(doc) | Self::Superseded(doc) => doc,
        }
    }

    pub fn into_document(self) -> Document {
        match self {
            Self::Written(doc) | Self::Superseded(doc) => doc,
        }
    }

    pub fn was_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

pub struct EditorSession<S: NoteStore> {
    note_id: String,
    created_at: u64,
    title: String,
    buffer: String,
    selection: Selection,
    history: History,
    tools: ToolRegistry,
    mode: ViewMode,
    store: Arc<S>,
    save_gate: Arc<AsyncMutex<()>>,
    pending_saves: Arc<AtomicUsize>,
    /// Sequence number handed to the most recent `save()` call.
    save_seq: AtomicU64,
    /// Sequence number of the newest snapshot the store accepted.
    persisted_seq: Arc<AtomicU64>,
}

impl<S: NoteStore> EditorSession<S> {
    /// Start editing `document`. The caret starts at offset 0 and history is empty.
    pub fn new(store: Arc<S>, document: Document, options: SessionOptions) -> Self {
        debug!(
            target: "session",
            id = document.id.as_str(),
            bytes = document.content.len(),
            history_capacity = options.history_capacity,
            "session_opened"
        );
        Self {
            note_id: document.id,
            created_at: document.created_at,
            title: document.title,
            buffer: document.content,
            selection: Selection::caret(0),
            history: History::with_capacity(options.history_capacity),
            tools: ToolRegistry::with_empty_wrap(options.empty_wrap),
            mode: ViewMode::Write,
            store,
            save_gate: Arc::new(AsyncMutex::new(())),
            pending_saves: Arc::new(AtomicUsize::new(0)),
            save_seq: AtomicU64::new(0),
            persisted_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Load note `id` through the store and open a session on it.
    pub async fn open(store: Arc<S>, id: &str, config: &Config) -> Result<Self, SessionError> {
        let document = store.load_note(id).await.inspect_err(|e| {
            warn!(target: "session", id, error = %e, "note_load_failed");
        })?;
        Ok(Self::new(store, document, SessionOptions::from(config)))
    }

    pub fn note_id(&self) -> &str {
        &self.note_id
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn buffer(&self) -> &str {
        &self.buffer
    }
    pub fn selection(&self) -> Selection {
        self.selection
    }
    pub fn history(&self) -> &History {
        &self.history
    }
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
    /// Mutable registry access for hosts that add custom tools.
    pub fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }
    pub fn mode(&self) -> ViewMode {
        self.mode
    }
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
    /// True while a save returned by [`Self::save`] is queued or in flight.
    pub fn is_saving(&self) -> bool {
        self.pending_saves.load(Ordering::SeqCst) > 0
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            title: &self.title,
            buffer: &self.buffer,
            selection: self.selection,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            saving: self.is_saving(),
            mode: self.mode,
        }
    }

    /// Classified preview of the current buffer, recomputed on every call.
    pub fn preview(&self) -> Vec<LineDescriptor> {
        classify(&self.buffer)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// Update the selection; out-of-range values are clamped. Never recorded in history.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp(char_len(&self.buffer));
        trace!(target: "session", start = self.selection.start, end = self.selection.end, "selection_changed");
    }

    /// Replace the buffer as a committed edit with the caret at end-of-text.
    pub fn set_content(&mut self, text: impl Into<String>) {
        self.set_content_with_cursor(text, None);
    }

    /// Replace the buffer as a committed edit; `cursor` defaults to end-of-text.
    pub fn set_content_with_cursor(&mut self, text: impl Into<String>, cursor: Option<usize>) {
        self.commit(text.into());
        let len = char_len(&self.buffer);
        self.selection = Selection::caret(cursor.unwrap_or(len)).clamp(len);
    }

    /// Run tool `id` over the current selection and commit the result.
    pub fn apply_tool(&mut self, id: &str) -> Result<(), SessionError> {
        let outcome = self
            .tools
            .apply(id, &self.buffer, self.selection)
            .inspect_err(|e| {
                warn!(target: "session", id, error = %e, "tool_rejected");
            })?;
        self.commit(outcome.text);
        self.selection = Selection::caret(outcome.cursor);
        debug!(target: "session", id, cursor = outcome.cursor, undo_depth = self.history.undo_depth(), "tool_applied");
        Ok(())
    }

    /// Step back one edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.buffer);
        if changed {
            self.selection = Selection::end_of(&self.buffer);
        }
        trace!(target: "session", op = "undo", changed, "history_step");
        changed
    }

    /// Step forward one undone edit. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.buffer);
        if changed {
            self.selection = Selection::end_of(&self.buffer);
        }
        trace!(target: "session", op = "redo", changed, "history_step");
        changed
    }

    /// Single entry point for host UI input.
    pub fn handle(&mut self, event: HostEvent) -> Result<(), SessionError> {
        match event {
            HostEvent::SelectionChanged(sel) => self.set_selection(sel),
            HostEvent::TextInput(text) => self.set_content(text),
            HostEvent::ToolPressed(id) => self.apply_tool(&id)?,
            HostEvent::TitleChanged(title) => self.set_title(title),
            HostEvent::Undo => {
                self.undo();
            }
            HostEvent::Redo => {
                self.redo();
            }
            HostEvent::SetMode(mode) => self.set_mode(mode),
        }
        Ok(())
    }

    /// The note as it would be persisted right now.
    pub fn document(&self) -> Document {
        Document {
            id: self.note_id.clone(),
            title: self.title.clone(),
            content: self.buffer.clone(),
            created_at: self.created_at,
            updated_at: now_millis(),
        }
    }

    /// Snapshot the note and persist it.
    ///
    /// The returned future borrows nothing from the session. Saves issued by
    /// one session run one at a time, and whatever order the futures are
    /// polled in, an older snapshot is never written over a newer one.
    pub fn save(
        &self,
    ) -> impl Future<Output = Result<SaveOutcome, SessionError>> + Send + 'static + use<S> {
        let document = self.document();
        let seq = self.save_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let store = Arc::clone(&self.store);
        let gate = Arc::clone(&self.save_gate);
        let persisted = Arc::clone(&self.persisted_seq);
        let pending = PendingSave::enter(&self.pending_saves);
        async move {
            let _pending = pending;
            let _turn = gate.lock().await;
            let id = document.id.clone();
            let newest = persisted.load(Ordering::SeqCst);
            if newest > seq {
                debug!(target: "session", id = id.as_str(), seq, newest, "save_superseded");
                return Ok(SaveOutcome::Superseded(document));
            }
            match store.save_note(document.clone()).await {
                Ok(()) => {
                    persisted.store(seq, Ordering::SeqCst);
                    info!(target: "session", id = id.as_str(), seq, bytes = document.content.len(), "note_saved");
                    Ok(SaveOutcome::Written(document))
                }
                Err(e) => {
                    warn!(target: "session", id = id.as_str(), error = %e, "note_save_failed");
                    Err(e.into())
                }
            }
        }
    }

    /// Fire-and-forget save on the current tokio runtime.
    pub fn spawn_save(&self) -> JoinHandle<Result<SaveOutcome, SessionError>> {
        tokio::spawn(self.save())
    }

    fn commit(&mut self, next: String) {
        let previous = mem::replace(&mut self.buffer, next);
        self.history.commit(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(content: &str) -> EditorSession<MemoryNoteStore> {
        let mut doc = Document::untitled("n");
        doc.content = content.to_string();
        EditorSession::new(Arc::new(MemoryNoteStore::new()), doc, SessionOptions::default())
    }

    #[test]
    fn bold_on_caret_scenario() {
        let mut s = session("Hello");
        s.set_selection(Selection::caret(2));
        s.apply_tool("bold").unwrap();
        assert_eq!(s.buffer(), "He****llo");
        assert_eq!(s.selection(), Selection::caret(4));
        assert!(s.can_undo());
        assert_eq!(s.history().past(), &["Hello"]);
    }

    #[test]
    fn selection_changes_are_not_history() {
        let mut s = session("abc");
        s.set_selection(Selection::new(0, 2));
        s.set_selection(Selection::caret(1));
        assert!(!s.can_undo());
    }

    #[test]
    fn selection_is_clamped_to_buffer() {
        let mut s = session("abc");
        s.set_selection(Selection::new(2, 99));
        assert_eq!(s.selection(), Selection::new(2, 3));
    }

    #[test]
    fn set_content_commits_and_moves_caret_to_end() {
        let mut s = session("one");
        s.set_content("one two");
        assert_eq!(s.selection(), Selection::caret(7));
        assert_eq!(s.history().past(), &["one"]);
        s.set_content_with_cursor("x", Some(40));
        assert_eq!(s.selection(), Selection::caret(1));
    }

    #[test]
    fn undo_redo_collapse_caret_to_end() {
        let mut s = session("");
        s.set_content("first line");
        s.set_selection(Selection::caret(0));
        s.apply_tool("heading1").unwrap();
        assert_eq!(s.buffer(), "\n# first line");

        assert!(s.undo());
        assert_eq!(s.buffer(), "first line");
        assert_eq!(s.selection(), Selection::caret(10));
        assert!(s.redo());
        assert_eq!(s.buffer(), "\n# first line");
        assert_eq!(s.selection(), Selection::caret(13));
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut s = session("keep");
        s.set_selection(Selection::caret(1));
        assert!(!s.undo());
        assert!(!s.redo());
        assert_eq!(s.buffer(), "keep");
        assert_eq!(s.selection(), Selection::caret(1));
    }

    #[test]
    fn unknown_tool_leaves_state_untouched() {
        let mut s = session("abc");
        let err = s.apply_tool("underline").unwrap_err();
        assert_eq!(err, SessionError::Tool(ToolError::UnknownTool("underline".into())));
        assert_eq!(s.buffer(), "abc");
        assert!(!s.can_undo());
    }

    #[test]
    fn handle_routes_host_events() {
        let mut s = session("");
        s.handle(HostEvent::TextInput("todo".into())).unwrap();
        s.handle(HostEvent::SelectionChanged(Selection::caret(0))).unwrap();
        s.handle(HostEvent::ToolPressed("checklist".into())).unwrap();
        s.handle(HostEvent::TitleChanged("Groceries".into())).unwrap();
        s.handle(HostEvent::SetMode(ViewMode::Preview)).unwrap();
        assert_eq!(s.buffer(), "\n- [ ] todo");
        assert_eq!(s.title(), "Groceries");
        assert_eq!(s.mode(), ViewMode::Preview);

        s.handle(HostEvent::Undo).unwrap();
        assert_eq!(s.buffer(), "todo");
        s.handle(HostEvent::Redo).unwrap();
        assert_eq!(s.buffer(), "\n- [ ] todo");
        assert!(s.handle(HostEvent::ToolPressed("nope".into())).is_err());
    }

    #[test]
    fn view_reports_flags() {
        let mut s = session("x");
        let v = s.view();
        assert!(!v.can_undo && !v.can_redo && !v.saving);
        s.set_content("y");
        s.undo();
        let v = s.view();
        assert!(!v.can_undo);
        assert!(v.can_redo);
        assert_eq!(v.buffer, "x");
    }

    #[test]
    fn title_changes_do_not_touch_history() {
        let mut s = session("body");
        s.set_title("New title");
        assert!(!s.can_undo());
        assert_eq!(s.document().title, "New title");
    }

    #[test]
    fn options_follow_config() {
        let cfg = Config::default();
        let opts = SessionOptions::from(&cfg);
        assert_eq!(opts, SessionOptions::default());
    }

    #[test]
    fn placeholder_option_reaches_tools() {
        let opts = SessionOptions {
            history_capacity: 5,
            empty_wrap: EmptyWrap::Placeholder("text".into()),
        };
        let mut s = EditorSession::new(
            Arc::new(MemoryNoteStore::new()),
            Document::untitled("p"),
            opts,
        );
        s.apply_tool("italic").unwrap();
        assert_eq!(s.buffer(), "_text_");
        assert_eq!(s.history().capacity(), 5);
    }
}
