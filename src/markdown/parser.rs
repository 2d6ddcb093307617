//! Markdown parser
//!
//! A line scanner that builds the Document Tree directly. Parsing runs in
//! fixed phases:
//!
//! 1. Fenced code blocks are cut out of the source before anything else looks
//!    at it, so their content is never touched by later phases. An
//!    unterminated fence swallows the rest of the document.
//! 2. The remaining lines are classified one at a time: headings (1-3 `#`),
//!    blockquotes (`> `), list items (`- ` / `N. `) and horizontal rules
//!    (`---`). Consecutive list items of the same kind form one list.
//! 3. Everything else is paragraph text, split on blank lines. A single
//!    newline inside a paragraph is a hard line break.
//! 4. Text-bearing blocks run through the inline scanner.
//!
//! Parsing is total: every string yields a document, and anything that is
//! not recognised degrades to paragraph text.

use log::debug;

use super::inline::parse_inlines;
use super::tree::{Block, CodeBlock, Document, HeadingLevel, Inline, ListItem};

/// Opening and closing marker of a fenced code block.
pub(crate) const FENCE: &str = "```";

/// Longest digit run accepted as an ordered list number.
const MAX_ORDERED_DIGITS: usize = 9;

/// Largest ordered list number that still reads back as a list marker.
pub(crate) const MAX_ORDERED_NUMBER: u32 = 999_999_999;

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Parse markdown text into a Document Tree.
///
/// Never fails. Empty or whitespace-only input yields an empty document.
///
/// # Example
/// ```
/// use markmode::markdown::{parse_markdown, Block, HeadingLevel, Inline};
///
/// let doc = parse_markdown("# Hello");
/// assert_eq!(
///     doc.blocks,
///     vec![Block::Heading { level: HeadingLevel::H1, content: vec![Inline::text("Hello")] }]
/// );
/// ```
pub fn parse_markdown(markdown: &str) -> Document {
    let mut blocks = Vec::new();

    for segment in extract_fences(markdown) {
        match segment {
            Segment::Fenced(code) => blocks.push(Block::CodeBlock(code)),
            Segment::Lines(lines) => scan_blocks(&lines, &mut blocks),
        }
    }

    debug!("Parsed markdown into {} blocks", blocks.len());
    Document::new(blocks)
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase 1: Fenced Code Blocks
// ─────────────────────────────────────────────────────────────────────────────

enum Segment<'a> {
    Fenced(CodeBlock),
    Lines(Vec<&'a str>),
}

fn extract_fences(markdown: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut lines = markdown.lines();

    while let Some(line) = lines.next() {
        let Some(info) = line.strip_prefix(FENCE) else {
            pending.push(line);
            continue;
        };

        if !pending.is_empty() {
            segments.push(Segment::Lines(std::mem::take(&mut pending)));
        }

        let language = info.split_whitespace().next().map(str::to_string);
        let mut body: Vec<&str> = Vec::new();
        let mut closed = false;
        for code_line in lines.by_ref() {
            if code_line.trim_end() == FENCE {
                closed = true;
                break;
            }
            body.push(code_line);
        }
        if !closed {
            debug!("Unterminated code fence, treating rest of document as code");
        }

        segments.push(Segment::Fenced(CodeBlock::new(language, body.join("\n"))));
    }

    if !pending.is_empty() {
        segments.push(Segment::Lines(pending));
    }
    segments
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase 2: Line Classification
// ─────────────────────────────────────────────────────────────────────────────

/// What a single source line introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    Blank,
    Heading(HeadingLevel, &'a str),
    Quote(&'a str),
    Bullet(&'a str),
    Ordered(u32, &'a str),
    Rule,
    Text(&'a str),
}

impl LineKind<'_> {
    /// Whether the line starts a block other than a paragraph.
    pub(crate) fn is_block_marker(&self) -> bool {
        !matches!(self, LineKind::Blank | LineKind::Text(_))
    }
}

/// Classify one line of non-code source.
pub(crate) fn classify_line(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some((level, rest)) = heading_marker(line) {
        return LineKind::Heading(level, rest.trim());
    }
    if let Some(rest) = line.strip_prefix("> ") {
        return LineKind::Quote(rest.trim());
    }
    if let Some(rest) = line.strip_prefix("- ") {
        return LineKind::Bullet(rest.trim());
    }
    if let Some((number, rest)) = ordered_marker(line) {
        return LineKind::Ordered(number, rest.trim());
    }
    if line.trim() == "---" {
        return LineKind::Rule;
    }
    LineKind::Text(line.trim())
}

fn heading_marker(line: &str) -> Option<(HeadingLevel, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    let level = HeadingLevel::from_marker_len(hashes)?;
    let rest = line[hashes..].strip_prefix(' ')?;
    Some((level, rest))
}

/// Split `N. rest` into the item number and the rest of the line.
pub(crate) fn ordered_marker(line: &str) -> Option<(u32, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > MAX_ORDERED_DIGITS {
        return None;
    }
    let rest = line[digits..].strip_prefix(". ")?;
    let number = line[..digits].parse().ok()?;
    Some((number, rest))
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase 3: Block Assembly
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Ordered { start: u32 },
}

impl ListKind {
    fn same_marker(self, other: ListKind) -> bool {
        matches!(
            (self, other),
            (ListKind::Bullet, ListKind::Bullet) | (ListKind::Ordered { .. }, ListKind::Ordered { .. })
        )
    }
}

/// Accumulates paragraph lines and list items between block boundaries.
#[derive(Default)]
struct BlockBuilder<'a> {
    paragraph: Vec<&'a str>,
    list: Option<(ListKind, Vec<ListItem>)>,
}

impl<'a> BlockBuilder<'a> {
    fn flush_paragraph(&mut self, blocks: &mut Vec<Block>) {
        if self.paragraph.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.paragraph);
        blocks.push(Block::Paragraph(paragraph_inlines(&lines)));
    }

    fn flush_list(&mut self, blocks: &mut Vec<Block>) {
        let Some((kind, items)) = self.list.take() else {
            return;
        };
        blocks.push(match kind {
            ListKind::Bullet => Block::BulletList(items),
            ListKind::Ordered { start } => Block::OrderedList { start, items },
        });
    }

    fn flush(&mut self, blocks: &mut Vec<Block>) {
        self.flush_paragraph(blocks);
        self.flush_list(blocks);
    }

    fn push_item(&mut self, kind: ListKind, content: &str, blocks: &mut Vec<Block>) {
        self.flush_paragraph(blocks);
        let continues = matches!(&self.list, Some((current, _)) if current.same_marker(kind));
        if !continues {
            self.flush_list(blocks);
            self.list = Some((kind, Vec::new()));
        }
        if let Some((_, items)) = self.list.as_mut() {
            items.push(ListItem::new(parse_inlines(content)));
        }
    }
}

fn scan_blocks(lines: &[&str], blocks: &mut Vec<Block>) {
    let mut builder = BlockBuilder::default();

    for &line in lines {
        match classify_line(line) {
            LineKind::Blank => builder.flush(blocks),
            LineKind::Heading(level, rest) => {
                builder.flush(blocks);
                blocks.push(Block::Heading {
                    level,
                    content: parse_inlines(rest),
                });
            }
            LineKind::Quote(rest) => {
                builder.flush(blocks);
                blocks.push(Block::Blockquote(parse_inlines(rest)));
            }
            LineKind::Bullet(rest) => builder.push_item(ListKind::Bullet, rest, blocks),
            LineKind::Ordered(number, rest) => {
                builder.push_item(ListKind::Ordered { start: number }, rest, blocks)
            }
            LineKind::Rule => {
                builder.flush(blocks);
                blocks.push(Block::HorizontalRule);
            }
            LineKind::Text(text) => {
                builder.flush_list(blocks);
                builder.paragraph.push(text);
            }
        }
    }

    builder.flush(blocks);
}

/// Join paragraph lines with hard line breaks.
fn paragraph_inlines(lines: &[&str]) -> Vec<Inline> {
    let mut inlines = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            inlines.push(Inline::LineBreak);
        }
        inlines.extend(parse_inlines(line));
    }
    inlines
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
