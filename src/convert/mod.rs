//! Source ingestion
//!
//! Documents arrive either as markdown or as AsciiDoc. AsciiDoc goes through a
//! [`MarkupConverter`] first; the parser only ever sees markdown.

mod asciidoc;

pub use asciidoc::AsciiDocConverter;

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, ResultExt};
use crate::markdown::{parse_markdown, Document};

// ─────────────────────────────────────────────────────────────────────────────
// Source Format
// ─────────────────────────────────────────────────────────────────────────────

/// Markup language of an incoming document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SourceFormat {
    #[default]
    #[serde(rename = "md")]
    Markdown,
    #[serde(rename = "adoc")]
    AsciiDoc,
}

impl SourceFormat {
    /// Short identifier (`md` / `adoc`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Markdown => "md",
            SourceFormat::AsciiDoc => "adoc",
        }
    }

    /// Whether text in this format must be converted before parsing.
    pub fn needs_conversion(&self) -> bool {
        !matches!(self, SourceFormat::Markdown)
    }

    /// Guess the format from a file extension, defaulting to markdown.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("adoc" | "asciidoc" | "asc") => SourceFormat::AsciiDoc,
            _ => SourceFormat::Markdown,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(SourceFormat::Markdown),
            "adoc" | "asciidoc" => Ok(SourceFormat::AsciiDoc),
            other => Err(format!("unknown source format '{}' (expected md or adoc)", other)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Converter Boundary
// ─────────────────────────────────────────────────────────────────────────────

/// Converts an alternate markup language into markdown.
///
/// Output is handed to the markdown parser as-is, without validation.
pub trait MarkupConverter {
    fn to_markdown(&self, source: &str) -> Result<String>;
}

impl<F> MarkupConverter for F
where
    F: Fn(&str) -> Result<String>,
{
    fn to_markdown(&self, source: &str) -> Result<String> {
        self(source)
    }
}

/// Turn source text into markdown, converting when the format requires it.
///
/// A converter failure is logged and the source is used verbatim as markdown.
pub fn ingest(value: &str, format: SourceFormat, converter: &dyn MarkupConverter) -> String {
    if !format.needs_conversion() {
        return value.to_string();
    }
    debug!("Converting {} source ({} bytes) to markdown", format, value.len());
    converter
        .to_markdown(value)
        .unwrap_or_warn_else(|| value.to_string(), "Markup conversion failed")
}

/// Ingest source text and parse it into a Document Tree.
pub fn ingest_document(
    value: &str,
    format: SourceFormat,
    converter: &dyn MarkupConverter,
) -> Document {
    parse_markdown(&ingest(value, format, converter))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
