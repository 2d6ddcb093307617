//! Edit mode controller
//!
//! Drives one editing session: the outer display/edit mode, the structured
//! and raw edit surfaces, external value sync, and change notifications.
//!
//! Reachable states are `Display`, `Edit·Structured` and `Edit·Raw`. The
//! Document Tree lives in the [`HostWidget`]; the controller only moves
//! markdown in and out of it.

use log::debug;

use super::host::{DocumentHost, HostWidget};
use super::links::{self, LinkEdit, Selection};
use crate::config::{DisplayMode, EditSurface, Settings};
use crate::convert::{ingest, AsciiDocConverter, MarkupConverter, SourceFormat};
use crate::error::{Error, Result};
use crate::markdown::Document;

/// Callback receiving the current markdown after every edit.
pub type ChangeCallback = Box<dyn FnMut(&str)>;

/// Callback receiving the new outer mode after a toggle.
pub type ModeCallback = Box<dyn FnMut(DisplayMode)>;

// ─────────────────────────────────────────────────────────────────────────────
// Editor State
// ─────────────────────────────────────────────────────────────────────────────

/// Effective state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Read-only rendering
    Display,
    /// Editing through the rich-text widget
    Structured,
    /// Editing the markdown text directly
    Raw,
}

impl EditorState {
    pub fn label(&self) -> &'static str {
        match self {
            EditorState::Display => "Display",
            EditorState::Structured => "Edit (structured)",
            EditorState::Raw => "Edit (raw)",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Mode controller for one editing session.
///
/// # Example
///
/// ```
/// use markmode::editor::{DocumentHost, EditModeController, EditorState};
///
/// let host = DocumentHost::from_markdown("# Notes");
/// let mut controller = EditModeController::new(host);
///
/// controller.enter_raw_mode();
/// assert_eq!(controller.state(), EditorState::Raw);
/// assert_eq!(controller.markdown(), "# Notes");
/// ```
pub struct EditModeController<H: HostWidget> {
    host: H,
    mode: DisplayMode,
    surface: EditSurface,
    allow_mode_toggle: bool,
    format: SourceFormat,
    converter: Box<dyn MarkupConverter>,
    /// Text of the raw surface; only meaningful in `Edit·Raw`
    raw_text: String,
    /// Last markdown handed to `on_change`, used to spot echoes
    last_emitted: Option<String>,
    /// Last external value ingested, with the format it was read as
    last_synced: Option<(String, SourceFormat)>,
    on_change: Option<ChangeCallback>,
    on_mode_change: Option<ModeCallback>,
}

impl<H: HostWidget> EditModeController<H> {
    /// Create a controller in `Edit·Structured` with mode toggling disabled.
    pub fn new(host: H) -> Self {
        Self {
            host,
            mode: DisplayMode::Edit,
            surface: EditSurface::Structured,
            allow_mode_toggle: false,
            format: SourceFormat::Markdown,
            converter: Box::new(AsciiDocConverter),
            raw_text: String::new(),
            last_emitted: None,
            last_synced: None,
            on_change: None,
            on_mode_change: None,
        }
    }

    /// Create a controller configured from settings.
    pub fn from_settings(host: H, settings: &Settings) -> Self {
        Self::new(host)
            .with_state(settings.mode, settings.surface)
            .allow_mode_toggle(settings.allow_mode_toggle)
            .format(settings.format)
    }

    /// Set the initial state.
    pub fn with_state(mut self, mode: DisplayMode, surface: EditSurface) -> Self {
        self.mode = mode;
        self.surface = surface;
        if self.state() == EditorState::Raw {
            self.raw_text = self.host.current_markdown();
        }
        self
    }

    /// Opt in to `Display ⇄ Edit` toggling.
    pub fn allow_mode_toggle(mut self, allow: bool) -> Self {
        self.allow_mode_toggle = allow;
        self
    }

    /// Source format used by [`Self::sync_value`] when none is given.
    pub fn format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the default AsciiDoc converter.
    pub fn converter(mut self, converter: impl MarkupConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn on_change(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn on_mode_change(mut self, callback: impl FnMut(DisplayMode) + 'static) -> Self {
        self.on_mode_change = Some(Box::new(callback));
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> EditorState {
        match (self.mode, self.surface) {
            (DisplayMode::Display, _) => EditorState::Display,
            (DisplayMode::Edit, EditSurface::Structured) => EditorState::Structured,
            (DisplayMode::Edit, EditSurface::Raw) => EditorState::Raw,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn is_editable(&self) -> bool {
        self.mode == DisplayMode::Edit
    }

    pub fn source_format(&self) -> SourceFormat {
        self.format
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Current markdown: the raw text in `Edit·Raw`, otherwise the
    /// serialization of the host's tree.
    pub fn markdown(&self) -> String {
        match self.state() {
            EditorState::Raw => self.raw_text.clone(),
            EditorState::Display | EditorState::Structured => self.host.current_markdown(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Outer Mode
    // ─────────────────────────────────────────────────────────────────────────

    /// Flip between `Display` and `Edit`, notifying `on_mode_change`.
    ///
    /// Returns the new mode, or `None` when toggling is not allowed.
    pub fn toggle_mode(&mut self) -> Option<DisplayMode> {
        if !self.allow_mode_toggle {
            debug!("Mode toggle ignored: toggling is disabled for this editor");
            return None;
        }
        let mode = self.mode.toggle();
        self.set_mode(mode);
        if let Some(callback) = self.on_mode_change.as_mut() {
            callback(mode);
        }
        Some(mode)
    }

    /// Set the outer mode directly. No notification is fired.
    ///
    /// Leaving `Edit·Raw` commits the raw text to the tree first; entering
    /// `Edit` always lands on the structured surface.
    pub fn set_mode(&mut self, mode: DisplayMode) {
        if mode == self.mode {
            return;
        }
        if self.state() == EditorState::Raw {
            self.commit_raw_text();
        }
        self.mode = mode;
        self.surface = EditSurface::Structured;
        debug!("Editor mode set to {}", mode.label());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Raw Surface
    // ─────────────────────────────────────────────────────────────────────────

    /// `Edit·Structured → Edit·Raw`: hand the serialized tree to the raw
    /// surface. Returns `false` from any other state.
    pub fn enter_raw_mode(&mut self) -> bool {
        if self.state() != EditorState::Structured {
            return false;
        }
        self.raw_text = self.host.current_markdown();
        self.surface = self.surface.toggle();
        debug!("Entered raw mode ({} bytes)", self.raw_text.len());
        true
    }

    /// `Edit·Raw → Edit·Structured`: parse the raw text into the tree.
    /// Returns `false` from any other state.
    pub fn leave_raw_mode(&mut self) -> bool {
        if self.state() != EditorState::Raw {
            return false;
        }
        self.commit_raw_text();
        self.surface = self.surface.toggle();
        debug!("Left raw mode");
        true
    }

    /// Switch between the structured and raw surfaces while editing.
    pub fn toggle_raw_mode(&mut self) -> bool {
        match self.state() {
            EditorState::Structured => self.enter_raw_mode(),
            EditorState::Raw => self.leave_raw_mode(),
            EditorState::Display => false,
        }
    }

    /// A raw-text change. The new text is emitted verbatim; it is parsed
    /// only when the raw surface is left.
    pub fn input_raw(&mut self, text: impl Into<String>) -> bool {
        if self.state() != EditorState::Raw {
            return false;
        }
        self.raw_text = text.into();
        self.emit(self.raw_text.clone());
        true
    }

    fn commit_raw_text(&mut self) {
        self.host.replace_content(&self.raw_text);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structured Edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Run an edit against the host widget and emit the new serialization.
    ///
    /// Rejected (returns `false`) unless in `Edit·Structured`.
    pub fn structured_edit(&mut self, edit: impl FnOnce(&mut H)) -> bool {
        if self.state() != EditorState::Structured {
            debug!("Structured edit ignored in {} state", self.state().label());
            return false;
        }
        edit(&mut self.host);
        self.emit(self.host.current_markdown());
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // External Sync
    // ─────────────────────────────────────────────────────────────────────────

    /// Accept a value supplied from outside.
    ///
    /// Only a changed value is ingested: one equal to the value last synced
    /// (in the same format) is skipped, and so is one equal to the last
    /// emitted markdown, which is an echo of this controller's own edit.
    /// Anything else replaces the tree (and the raw text, when the raw
    /// surface is shown). Returns whether the content was replaced.
    pub fn sync_value(&mut self, value: &str, format: Option<SourceFormat>) -> bool {
        let format = format.unwrap_or(self.format);
        let unchanged = self
            .last_synced
            .as_ref()
            .is_some_and(|(last, last_format)| last == value && *last_format == format);
        if unchanged {
            debug!("Skipping sync: external value has not changed");
            return false;
        }
        if self.last_emitted.as_deref() == Some(value) {
            debug!("Skipping sync: value matches last emitted markdown");
            return false;
        }
        self.format = format;

        let markdown = ingest(value, self.format, self.converter.as_ref());
        self.host.replace_content(&markdown);
        if self.state() == EditorState::Raw {
            self.raw_text = markdown;
        }
        self.last_emitted = None;
        self.last_synced = Some((value.to_string(), format));
        debug!("Synced external {} value ({} bytes)", self.format, value.len());
        true
    }

    fn emit(&mut self, markdown: String) {
        if self.mode == DisplayMode::Display {
            return;
        }
        if let Some(callback) = self.on_change.as_mut() {
            callback(&markdown);
        }
        self.last_emitted = Some(markdown);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Host Extras
// ─────────────────────────────────────────────────────────────────────────────

impl EditModeController<DocumentHost> {
    pub fn document(&self) -> &Document {
        self.host.document()
    }

    /// Href of the link under the selection.
    pub fn link_at(&self, selection: &Selection) -> Option<String> {
        links::link_at(self.host.document(), selection)
    }

    /// Apply a link edit as a structured edit.
    ///
    /// `input` is the answer of the URL prompt: `None` when cancelled.
    pub fn apply_link(&mut self, selection: &Selection, input: Option<&str>) -> Result<LinkEdit> {
        let state = self.state();
        if state != EditorState::Structured {
            return Err(Error::Application(format!(
                "Links can only be edited in structured mode (currently {})",
                state.label()
            )));
        }
        let edit = links::apply_link(self.host.document_mut(), selection, input)?;
        if edit != LinkEdit::Unchanged {
            self.emit(self.host.current_markdown());
        }
        Ok(edit)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
