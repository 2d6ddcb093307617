//! Host widget boundary
//!
//! The controller never touches a rich-text widget directly. It only asks
//! the widget for its content as markdown and hands it replacement markdown.

use crate::markdown::{parse_markdown, serialize_markdown, Document};

/// The rich-text surface that owns the live Document Tree.
pub trait HostWidget {
    /// Serialize the widget's current tree to markdown.
    fn current_markdown(&self) -> String;

    /// Replace the widget's tree wholesale with the parse of `markdown`.
    fn replace_content(&mut self, markdown: &str);
}

/// In-memory host that keeps the Document Tree itself.
///
/// Used by the CLI, by tests, and by callers that render the tree on their
/// own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHost {
    document: Document,
}

impl DocumentHost {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Build a host from markdown text.
    pub fn from_markdown(markdown: &str) -> Self {
        Self::new(parse_markdown(markdown))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

impl HostWidget for DocumentHost {
    fn current_markdown(&self) -> String {
        serialize_markdown(&self.document)
    }

    fn replace_content(&mut self, markdown: &str) {
        self.document = parse_markdown(markdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_host_roundtrip() {
        let mut host = DocumentHost::from_markdown("# Title\n\nBody");
        assert_eq!(host.current_markdown(), "# Title\n\nBody");

        host.replace_content("- a\n- b");
        assert_eq!(host.document().blocks.len(), 1);
        assert!(host.document().blocks[0].is_list());
    }

    #[test]
    fn test_replace_with_empty_clears_tree() {
        let mut host = DocumentHost::from_markdown("text");
        host.replace_content("");
        assert!(host.document().is_empty());
        assert_eq!(host.current_markdown(), "");
    }
}
