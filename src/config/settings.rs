//! User settings for markmode
//!
//! This module defines the `Settings` struct that holds the editor's
//! configurable options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};

use crate::convert::SourceFormat;
use crate::markdown::DEFAULT_CODE_LANGUAGE;

// ─────────────────────────────────────────────────────────────────────────────
// Display Mode Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Outer editor mode.
///
/// - `Display`: read-only rendering
/// - `Edit`: content can be changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Display,
    #[default]
    Edit,
}

impl DisplayMode {
    /// Toggle between Display and Edit.
    pub fn toggle(&self) -> Self {
        match self {
            DisplayMode::Display => DisplayMode::Edit,
            DisplayMode::Edit => DisplayMode::Display,
        }
    }

    /// Get a display label for the mode.
    pub fn label(&self) -> &'static str {
        match self {
            DisplayMode::Display => "Display",
            DisplayMode::Edit => "Edit",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edit Surface Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Which surface is used while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EditSurface {
    /// Rich-text editing on the Document Tree
    #[default]
    Structured,
    /// Plain markdown text editing
    Raw,
}

impl EditSurface {
    /// Toggle between Structured and Raw.
    pub fn toggle(&self) -> Self {
        match self {
            EditSurface::Structured => EditSurface::Raw,
            EditSurface::Raw => EditSurface::Structured,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EditSurface::Structured => "Structured",
            EditSurface::Raw => "Raw",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Editor preferences.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Editing Session
    // ─────────────────────────────────────────────────────────────────────────
    /// Initial outer mode
    pub mode: DisplayMode,

    /// Initial edit surface (only meaningful in edit mode)
    pub surface: EditSurface,

    /// Whether the user may switch between display and edit
    pub allow_mode_toggle: bool,

    /// Format of incoming source text
    pub format: SourceFormat,

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────
    /// Language shown for code blocks without a language tag
    pub default_code_language: String,

    /// Drop `javascript:`, `vbscript:` and `data:` hrefs when rendering HTML
    pub safe_links: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Editing Session
            mode: DisplayMode::default(),
            surface: EditSurface::default(),
            allow_mode_toggle: false,
            format: SourceFormat::default(),

            // Rendering
            default_code_language: String::from(DEFAULT_CODE_LANGUAGE),
            safe_links: true,
        }
    }
}

impl Settings {
    /// Sanitize settings loaded from a file that might have been edited by
    /// hand.
    ///
    /// The code language is reduced to a single lowercase token, falling back
    /// to `plaintext` when empty.
    pub fn sanitize(&mut self) {
        let language = self
            .default_code_language
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        self.default_code_language = if language.is_empty() {
            String::from(DEFAULT_CODE_LANGUAGE)
        } else {
            language
        };
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
