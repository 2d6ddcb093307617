//! Markdown parsing and serialization
//!
//! This module converts between markdown text and the Document Tree used
//! while editing.
//!
//! # Features
//! - Parse markdown text into a flat tree of blocks and inlines
//! - Serialize a tree back to markdown, keeping code fence languages
//! - Headings (1-3), bold/italic/bold-italic, inline code, links
//! - Flat bullet and ordered lists, single-line blockquotes, rules
//!
//! # Example
//! ```
//! use markmode::markdown::{parse_markdown, serialize_markdown};
//!
//! let doc = parse_markdown("# Hello\n\nThis is **bold** text.");
//! assert_eq!(doc.blocks.len(), 2);
//! assert_eq!(serialize_markdown(&doc), "# Hello\n\nThis is **bold** text.");
//! ```

mod inline;
mod parser;
mod serializer;
mod tree;

pub use parser::parse_markdown;
pub use serializer::{serialize_block, serialize_inline_content, serialize_markdown};
pub use tree::{
    inlines_text, Block, CodeBlock, Document, HeadingLevel, Inline, ListItem,
    DEFAULT_CODE_LANGUAGE, LANGUAGE_CLASS_PREFIX,
};
