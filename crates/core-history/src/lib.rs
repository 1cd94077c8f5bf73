//! Bounded linear undo/redo over whole-buffer snapshots.
//!
//! Two stacks, both stored with their top element last:
//! - `past`: older buffers; the last element is what `undo` restores.
//! - `future`: buffers undone away from; the last element is what `redo` restores.
//!
//! Committing a forward edit clears `future` entirely (no undo tree). Each
//! stack holds at most `capacity` snapshots; on overflow the entry farthest
//! from the present is discarded. Only buffer text is recorded, never
//! selections, so caret moves are not undoable.
//!
//! Snapshot lifecycle emits trace events under the `history` target
//! (`commit`, `undo_pop`, `redo_pop`, trims, redo clear).

use std::collections::VecDeque;
use std::mem;
use tracing::trace;

/// Default number of snapshots retained per stack.
pub const DEFAULT_HISTORY_CAP: usize = 50;

#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<String>,
    future: VecDeque<String>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAP)
    }

    /// A zero capacity is raised to one so `undo` remains meaningful.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
    /// Older snapshots, oldest first.
    pub fn past(&self) -> &VecDeque<String> {
        &self.past
    }
    /// Redo snapshots in stack order; the back element is the next redo.
    pub fn future(&self) -> &VecDeque<String> {
        &self.future
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        trace!(target: "history", "cleared");
    }

    /// Record `previous` (the buffer as it was before a forward edit).
    pub fn commit(&mut self, previous: String) {
        self.past.push_back(previous);
        trace!(target: "history", undo_depth = self.past.len(), redo_depth = self.future.len(), "commit");
        if self.past.len() > self.capacity {
            let _ = self.past.pop_front();
            trace!(target: "history", capacity = self.capacity, "undo_stack_trimmed");
        }
        if !self.future.is_empty() {
            self.future.clear();
            trace!(target: "history", "redo_stack_cleared_on_new_edit");
        }
    }

    /// Swap `buffer` with the most recent past snapshot. Returns false (and
    /// leaves `buffer` untouched) when there is nothing to undo.
    pub fn undo(&mut self, buffer: &mut String) -> bool {
        let Some(previous) = self.past.pop_back() else {
            trace!(target: "history", "undo_noop");
            return false;
        };
        let current = mem::replace(buffer, previous);
        Self::push_bounded(&mut self.future, current, self.capacity);
        trace!(target: "history", undo_depth = self.past.len(), redo_depth = self.future.len(), "undo_pop");
        true
    }

    /// Swap `buffer` with the nearest redo snapshot. Returns false (and leaves
    /// `buffer` untouched) when there is nothing to redo.
    pub fn redo(&mut self, buffer: &mut String) -> bool {
        let Some(next) = self.future.pop_back() else {
            trace!(target: "history", "redo_noop");
            return false;
        };
        let current = mem::replace(buffer, next);
        Self::push_bounded(&mut self.past, current, self.capacity);
        trace!(target: "history", undo_depth = self.past.len(), redo_depth = self.future.len(), "redo_pop");
        true
    }

    fn push_bounded(stack: &mut VecDeque<String>, snapshot: String, capacity: usize) {
        stack.push_back(snapshot);
        if stack.len() > capacity {
            let _ = stack.pop_front();
            trace!(target: "history", capacity, "stack_trimmed");
        }
    }
}
