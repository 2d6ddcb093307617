//! Editing session flows through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use markmode::config::{DisplayMode, EditSurface, Settings};
use markmode::editor::{
    DocumentHost, EditModeController, EditorState, HostWidget, LinkEdit, Selection,
};
use markmode::markdown::{parse_markdown, serialize_markdown, Block, Inline};
use markmode::SourceFormat;

/// A host that keeps markdown text only, like a widget with its own model.
#[derive(Default)]
struct TextHost {
    markdown: String,
    replacements: usize,
}

impl HostWidget for TextHost {
    fn current_markdown(&self) -> String {
        self.markdown.clone()
    }

    fn replace_content(&mut self, markdown: &str) {
        self.markdown = serialize_markdown(&parse_markdown(markdown));
        self.replacements += 1;
    }
}

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&str) + 'static) {
    let log: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&log);
    (log, move |md: &str| sink.borrow_mut().push(md.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Mode Round Trips
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_structured_raw_structured_without_edits_is_identity() {
    let source = "# Plan\n\n1. **Design**\n2. Build `it`\n\n> Ship it\n\n```toml\n[package]\n```";
    let mut session = EditModeController::new(DocumentHost::from_markdown(source));
    let before = session.document().clone();

    assert!(session.toggle_raw_mode());
    assert_eq!(session.state(), EditorState::Raw);
    assert!(session.toggle_raw_mode());
    assert_eq!(session.state(), EditorState::Structured);

    assert_eq!(session.document(), &before);
}

#[test]
fn test_raw_edit_then_leave_replaces_tree() {
    let (changes, on_change) = recorder();
    let mut session =
        EditModeController::new(DocumentHost::from_markdown("draft")).on_change(on_change);

    session.enter_raw_mode();
    session.input_raw("- a");
    session.input_raw("- a\n- b");
    session.leave_raw_mode();

    assert_eq!(
        changes.borrow().as_slice(),
        ["- a".to_string(), "- a\n- b".to_string()]
    );
    assert!(matches!(&session.document().blocks[0], Block::BulletList(items) if items.len() == 2));
}

#[test]
fn test_custom_host_only_sees_markdown() {
    let mut session = EditModeController::new(TextHost::default());
    session.sync_value("**x**", None);
    session.enter_raw_mode();
    session.input_raw("*y*");
    session.leave_raw_mode();

    let host = session.into_host();
    assert_eq!(host.markdown, "*y*");
    assert_eq!(host.replacements, 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Display Mode
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_display_edit_toggle_from_settings() {
    let settings = Settings {
        mode: DisplayMode::Display,
        allow_mode_toggle: true,
        ..Settings::default()
    };
    let modes: Rc<RefCell<Vec<DisplayMode>>> = Rc::default();
    let sink = Rc::clone(&modes);
    let mut session = EditModeController::from_settings(DocumentHost::from_markdown("hi"), &settings)
        .on_mode_change(move |mode| sink.borrow_mut().push(mode));

    assert!(!session.is_editable());
    assert_eq!(session.toggle_mode(), Some(DisplayMode::Edit));
    assert!(session.is_editable());
    assert_eq!(modes.borrow().as_slice(), [DisplayMode::Edit]);
}

#[test]
fn test_edit_only_session_cannot_toggle() {
    let mut session = EditModeController::new(DocumentHost::default())
        .with_state(DisplayMode::Edit, EditSurface::Raw);
    assert_eq!(session.toggle_mode(), None);
    assert_eq!(session.state(), EditorState::Raw);
}

// ─────────────────────────────────────────────────────────────────────────────
// External Sync
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_caller_echo_does_not_clobber_raw_edits() {
    let (changes, on_change) = recorder();
    let mut session = EditModeController::new(DocumentHost::default()).on_change(on_change);
    session.enter_raw_mode();
    session.input_raw("typing in progr");

    // Caller stores the emitted value and feeds it back
    let echoed = changes.borrow().last().cloned().unwrap();
    assert!(!session.sync_value(&echoed, None));
    session.input_raw("typing in progress");
    assert_eq!(session.markdown(), "typing in progress");
}

#[test]
fn test_external_asciidoc_value_is_converted() {
    let mut session = EditModeController::new(DocumentHost::default());
    assert!(session.sync_value(
        "= Guide\n\n[source,python]\n----\nprint('hi')\n----",
        Some(SourceFormat::AsciiDoc),
    ));
    assert_eq!(session.markdown(), "# Guide\n\n```python\nprint('hi')\n```");
}

// ─────────────────────────────────────────────────────────────────────────────
// Links
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_href_removes_existing_link() {
    let mut session = EditModeController::new(DocumentHost::from_markdown("[x](https://x)"));
    let selection = Selection::new(0, 0..1);
    assert_eq!(session.link_at(&selection), Some("https://x".to_string()));

    let edit = session.apply_link(&selection, Some("")).unwrap();
    assert_eq!(edit, LinkEdit::Unset);
    assert_eq!(
        session.document().blocks,
        vec![Block::Paragraph(vec![Inline::text("x")])]
    );
    assert_eq!(session.link_at(&selection), None);
}

#[test]
fn test_relinking_replaces_instead_of_stacking() {
    let mut session = EditModeController::new(DocumentHost::from_markdown("[x](https://a)"));
    session
        .apply_link(&Selection::new(0, 0..1), Some("https://b"))
        .unwrap();
    assert_eq!(session.markdown(), "[x](https://b)");
}

#[test]
fn test_link_edits_survive_raw_round_trip() {
    let mut session =
        EditModeController::new(DocumentHost::from_markdown("**a**[*b*](u) and\nmore text"));
    session.apply_link(&Selection::new(0, 1..2), Some("")).unwrap();
    session
        .apply_link(&Selection::new(0, 4..11), Some("https://x"))
        .unwrap();
    let before = session.document().clone();

    assert!(session.toggle_raw_mode());
    assert_eq!(
        session.markdown(),
        "**a**_b_ a[nd](https://x)\n[more](https://x) text"
    );
    assert!(session.toggle_raw_mode());
    assert_eq!(session.document(), &before);
}

#[test]
fn test_link_over_line_break_survives_raw_round_trip() {
    let mut session = EditModeController::new(DocumentHost::from_markdown("ab\ncd"));
    session
        .apply_link(&Selection::new(0, 1..4), Some("https://x"))
        .unwrap();
    let before = session.document().clone();

    session.toggle_raw_mode();
    session.toggle_raw_mode();
    assert_eq!(session.document(), &before);
    assert_eq!(session.markdown(), "a[b](https://x)\n[c](https://x)d");
}
