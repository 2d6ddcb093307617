//! Document Tree types
//!
//! The structured representation of a markdown document used while editing.
//! A document is a flat, ordered sequence of blocks; each text-bearing block
//! owns an inline sequence. Lists are flat: a list item never contains
//! another list.

use serde::{Deserialize, Serialize};

/// Language used when rendering a code block that has no language tag.
pub const DEFAULT_CODE_LANGUAGE: &str = "plaintext";

/// Prefix of the class marker that carries a code block's language.
pub const LANGUAGE_CLASS_PREFIX: &str = "language-";

// ─────────────────────────────────────────────────────────────────────────────
// Heading Level
// ─────────────────────────────────────────────────────────────────────────────

/// Heading level (H1-H3). Deeper headings are not part of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
}

impl HeadingLevel {
    /// Map a run of `#` characters to a heading level.
    ///
    /// Returns `None` for runs outside 1..=3.
    pub fn from_marker_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    /// Numeric level (1-3).
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The `#` run that introduces this heading in markdown.
    pub fn marker(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "#",
            HeadingLevel::H2 => "##",
            HeadingLevel::H3 => "###",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Nodes
// ─────────────────────────────────────────────────────────────────────────────

/// Text-level content within a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    /// Plain text
    Text(String),
    /// Strong emphasis (`**text**`)
    Bold(Vec<Inline>),
    /// Emphasis (`*text*`)
    Italic(Vec<Inline>),
    /// Strong emphasis and emphasis together (`***text***`)
    BoldItalic(Vec<Inline>),
    /// Inline code span; literal, never re-parsed
    Code(String),
    /// Hyperlink; `href` is never empty
    Link { href: String, children: Vec<Inline> },
    /// Hard line break inside a paragraph
    LineBreak,
}

impl Inline {
    /// Convenience constructor for a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text(value.into())
    }

    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match self {
            Inline::Text(t) | Inline::Code(t) => output.push_str(t),
            Inline::LineBreak => output.push('\n'),
            Inline::Bold(children)
            | Inline::Italic(children)
            | Inline::BoldItalic(children)
            | Inline::Link { children, .. } => {
                for child in children {
                    child.collect_text(output);
                }
            }
        }
    }

    /// Child inline sequence, if this node has one.
    pub fn children(&self) -> Option<&[Inline]> {
        match self {
            Inline::Bold(children)
            | Inline::Italic(children)
            | Inline::BoldItalic(children)
            | Inline::Link { children, .. } => Some(children),
            Inline::Text(_) | Inline::Code(_) | Inline::LineBreak => None,
        }
    }
}

/// Flattened text of an inline sequence.
pub fn inlines_text(inlines: &[Inline]) -> String {
    let mut text = String::new();
    for inline in inlines {
        inline.collect_text(&mut text);
    }
    text
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Nodes
// ─────────────────────────────────────────────────────────────────────────────

/// A single list item. Holds inline content only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListItem {
    pub content: Vec<Inline>,
}

impl ListItem {
    pub fn new(content: Vec<Inline>) -> Self {
        Self { content }
    }
}

/// A fenced code block. The text is opaque literal content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language token from the opening fence, `None` when the fence had none
    pub language: Option<String>,
    /// Literal text between the fences, without the trailing newline
    pub text: String,
}

impl CodeBlock {
    pub fn new(language: Option<String>, text: impl Into<String>) -> Self {
        Self {
            language,
            text: text.into(),
        }
    }

    /// Language used for rendering, falling back to `plaintext`.
    pub fn display_language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_CODE_LANGUAGE)
    }

    /// The `language-<lang>` marker carried by the rendered node.
    ///
    /// Untagged blocks get no marker, so the rendering default never leaks
    /// back into the markdown fence.
    pub fn language_class(&self) -> Option<String> {
        self.language
            .as_ref()
            .map(|lang| format!("{}{}", LANGUAGE_CLASS_PREFIX, lang))
    }
}

/// A top-level structural unit of the Document Tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading {
        level: HeadingLevel,
        content: Vec<Inline>,
    },
    BulletList(Vec<ListItem>),
    OrderedList {
        /// Number of the first item
        start: u32,
        items: Vec<ListItem>,
    },
    /// Single-line quote; multi-line quotes are one block per line
    Blockquote(Vec<Inline>),
    CodeBlock(CodeBlock),
    HorizontalRule,
}

impl Block {
    /// Get the flattened text of this block.
    ///
    /// List items are joined with newlines.
    pub fn text_content(&self) -> String {
        match self {
            Block::Paragraph(content)
            | Block::Heading { content, .. }
            | Block::Blockquote(content) => inlines_text(content),
            Block::BulletList(items) | Block::OrderedList { items, .. } => items
                .iter()
                .map(|item| inlines_text(&item.content))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::CodeBlock(code) => code.text.clone(),
            Block::HorizontalRule => String::new(),
        }
    }

    /// Whether this block is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Block::BulletList(_) | Block::OrderedList { .. })
    }

    /// Borrow the inline sequence addressed by `item`.
    ///
    /// Lists need an item index; other text blocks ignore it. Code blocks
    /// and rules have no inline content.
    pub fn inlines(&self, item: Option<usize>) -> Option<&Vec<Inline>> {
        match self {
            Block::Paragraph(content)
            | Block::Heading { content, .. }
            | Block::Blockquote(content) => Some(content),
            Block::BulletList(items) | Block::OrderedList { items, .. } => {
                item.and_then(|i| items.get(i)).map(|item| &item.content)
            }
            Block::CodeBlock(_) | Block::HorizontalRule => None,
        }
    }

    /// Mutable counterpart of [`Block::inlines`].
    pub fn inlines_mut(&mut self, item: Option<usize>) -> Option<&mut Vec<Inline>> {
        match self {
            Block::Paragraph(content)
            | Block::Heading { content, .. }
            | Block::Blockquote(content) => Some(content),
            Block::BulletList(items) | Block::OrderedList { items, .. } => match item {
                Some(i) => items.get_mut(i).map(|item| &mut item.content),
                None => None,
            },
            Block::CodeBlock(_) | Block::HorizontalRule => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// A parsed document: an ordered sequence of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// An empty document has zero blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Get the flattened text of the whole document, one block per line.
    pub fn text_content(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text_content)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_from_marker_len() {
        assert_eq!(HeadingLevel::from_marker_len(1), Some(HeadingLevel::H1));
        assert_eq!(HeadingLevel::from_marker_len(3), Some(HeadingLevel::H3));
        assert_eq!(HeadingLevel::from_marker_len(0), None);
        assert_eq!(HeadingLevel::from_marker_len(4), None);
        assert_eq!(HeadingLevel::H2.as_u8(), 2);
        assert_eq!(HeadingLevel::H3.marker(), "###");
    }

    #[test]
    fn test_inline_text_content_nested() {
        let inline = Inline::Link {
            href: "https://x".to_string(),
            children: vec![
                Inline::text("a "),
                Inline::Bold(vec![Inline::text("b")]),
                Inline::Code("c".to_string()),
            ],
        };
        assert_eq!(inline.text_content(), "a bc");
    }

    #[test]
    fn test_block_text_content_list() {
        let block = Block::BulletList(vec![
            ListItem::new(vec![Inline::text("one")]),
            ListItem::new(vec![Inline::Italic(vec![Inline::text("two")])]),
        ]);
        assert_eq!(block.text_content(), "one\ntwo");
    }

    #[test]
    fn test_code_block_language_class() {
        let tagged = CodeBlock::new(Some("rust".to_string()), "fn main() {}");
        assert_eq!(tagged.language_class().as_deref(), Some("language-rust"));
        assert_eq!(tagged.display_language(), "rust");

        let untagged = CodeBlock::new(None, "plain");
        assert_eq!(untagged.language_class(), None);
        assert_eq!(untagged.display_language(), DEFAULT_CODE_LANGUAGE);
    }

    #[test]
    fn test_inlines_mut_addresses_list_items() {
        let mut block = Block::OrderedList {
            start: 1,
            items: vec![ListItem::new(vec![Inline::text("first")])],
        };
        assert!(block.inlines_mut(None).is_none());
        assert!(block.inlines_mut(Some(1)).is_none());
        let content = block.inlines_mut(Some(0)).unwrap();
        content.push(Inline::text("!"));
        assert_eq!(block.text_content(), "first!");
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::default();
        assert!(doc.is_empty());
        assert_eq!(doc.text_content(), "");
    }

    #[test]
    fn test_tree_serializes_to_json() {
        let doc = Document::new(vec![Block::Heading {
            level: HeadingLevel::H1,
            content: vec![Inline::text("Hello")],
        }]);
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
        assert!(json.contains("heading"));
    }
}
