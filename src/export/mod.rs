//! Document export for markmode
//!
//! Renders the Document Tree as HTML, either as a fragment for a rich-text
//! host or as a standalone page.

pub mod html;

pub use html::{
    export_to_html_file, generate_html_document, markdown_to_html, render_html, HtmlOptions,
};
