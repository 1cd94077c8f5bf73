//! End-to-end editing flows through the session.

use core_preview::LineKind;
use core_session::{Document, EditorSession, MemoryNoteStore, SessionOptions};
use core_text::Selection;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn session(content: &str) -> EditorSession<MemoryNoteStore> {
    let mut doc = Document::untitled("n");
    doc.content = content.to_string();
    EditorSession::new(Arc::new(MemoryNoteStore::new()), doc, SessionOptions::default())
}

#[test]
fn edit_undo_edit_leaves_no_redo() {
    let mut s = session("a");
    s.set_content("ab");
    assert!(s.undo());
    s.set_content("ac");
    assert!(!s.can_redo());
    assert!(!s.redo());
    assert_eq!(s.buffer(), "ac");
}

#[test]
fn history_caps_at_fifty_commits() {
    let mut s = session("");
    for i in 0..60 {
        s.set_content(format!("rev {i}"));
    }
    assert_eq!(s.history().undo_depth(), 50);
    let mut undone = 0;
    while s.undo() {
        undone += 1;
    }
    assert_eq!(undone, 50);
    assert_eq!(s.buffer(), "rev 9");
}

#[test]
fn toolbar_session_builds_previewable_note() {
    let mut s = session("Weekly");
    s.set_selection(Selection::new(0, 6));
    s.apply_tool("heading1").unwrap();
    s.apply_tool("checklist").unwrap();
    s.set_content(format!("{}ship it", s.buffer()));
    s.apply_tool("bullet").unwrap();
    s.set_content(format!("{}notes", s.buffer()));

    assert_eq!(s.buffer(), "\n# \n- [ ] ship it\n- notes");
    let kinds: Vec<_> = s.preview().into_iter().map(|d| (d.kind, d.text)).collect();
    assert_eq!(
        kinds,
        vec![
            (LineKind::Paragraph, String::new()),
            (LineKind::Heading1, String::new()),
            (LineKind::ChecklistUnchecked, "ship it".to_string()),
            (LineKind::Bullet, "notes".to_string()),
        ]
    );
}

#[test]
fn preview_is_stable_across_calls() {
    let s = session("# A\n```\ncode\n```\n---");
    assert_eq!(s.preview(), s.preview());
}

#[test]
fn wrap_bold_around_selection_then_undo() {
    let mut s = session("make this loud");
    s.set_selection(Selection::new(10, 14));
    s.apply_tool("bold").unwrap();
    assert_eq!(s.buffer(), "make this **loud**");
    assert_eq!(s.selection(), Selection::caret(18));
    s.undo();
    assert_eq!(s.buffer(), "make this loud");
    assert_eq!(s.selection(), Selection::caret(14));
}
