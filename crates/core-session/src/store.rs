//! Persistence boundary.
//!
//! The editing core only needs two calls: load a note by id and save a whole
//! note. Implementations own the on-disk or remote layout; the session treats
//! `content` as an opaque buffer.

use crate::document::{Document, now_millis};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("note `{0}` not found")]
    NotFound(String),
    #[error("note store failure: {0}")]
    Backend(String),
}

pub trait NoteStore: Send + Sync + 'static {
    fn load_note(&self, id: &str) -> impl Future<Output = Result<Document, StoreError>> + Send;
    fn save_note(&self, document: Document) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process store keyed by note id.
///
/// Saving upserts: an existing record keeps its `created_at`, a new record is
/// stamped with the current time.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: Mutex<HashMap<String, Document>>,
    saves: AtomicU64,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: impl IntoIterator<Item = Document>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.notes.lock() {
            map.extend(notes.into_iter().map(|n| (n.id.clone(), n)));
        }
        store
    }

    /// Current stored copy of a note.
    pub fn get(&self, id: &str) -> Option<Document> {
        self.notes.lock().ok()?.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.notes.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful `save_note` calls.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }
}

impl NoteStore for MemoryNoteStore {
    async fn load_note(&self, id: &str) -> Result<Document, StoreError> {
        self.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn save_note(&self, mut document: Document) -> Result<(), StoreError> {
        let mut notes = self
            .notes
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))?;
        document.created_at = match notes.get(&document.id) {
            Some(existing) => existing.created_at,
            None if document.created_at == 0 => now_millis(),
            None => document.created_at,
        };
        debug!(target: "session.store", id = document.id.as_str(), bytes = document.content.len(), "note_saved");
        notes.insert(document.id.clone(), document);
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
