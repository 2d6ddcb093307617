//! markmode - markdown document tree, serializer, and edit mode engine
//!
//! Converts markdown (or AsciiDoc, through a converter) into a structured
//! Document Tree, writes the tree back as markdown without losing code
//! block languages, and drives an editing session that switches between
//! display, structured editing and raw markdown editing.

pub mod config;
pub mod convert;
pub mod editor;
pub mod error;
pub mod export;
pub mod markdown;

pub use convert::{ingest, ingest_document, AsciiDocConverter, MarkupConverter, SourceFormat};
pub use editor::{DocumentHost, EditModeController, EditorState, HostWidget, LinkEdit, Selection};
pub use error::{Error, Result};
pub use markdown::{parse_markdown, serialize_markdown, Block, Document, Inline};
