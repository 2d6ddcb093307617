//! Markdown serializer
//!
//! Converts a Document Tree back into markdown. Blocks are separated by a
//! blank line; list items sit on consecutive lines. Fenced code blocks get a
//! dedicated rule that writes the language tag back onto the opening fence.
//!
//! Output is chosen so that `parse_markdown(serialize_markdown(doc)) == doc`
//! for any document produced by the parser: literal marker characters in
//! text are backslash-escaped, and paragraph lines that would read back as a
//! block marker are escaped at the line start.

use super::parser::{classify_line, LineKind, FENCE, MAX_ORDERED_NUMBER};
use super::tree::{Block, CodeBlock, Document, Inline, ListItem};

/// Characters that carry inline meaning and must be escaped inside text.
const INLINE_SPECIAL: [char; 5] = ['\\', '*', '`', '[', ']'];

/// Where inline content is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineContext {
    /// Paragraph content: line breaks become newlines
    Paragraph,
    /// Headings, quotes and list items: must stay on one line
    SingleLine,
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Serialize a Document Tree to markdown.
///
/// An empty document serializes to the empty string.
///
/// # Example
/// ```
/// use markmode::markdown::{parse_markdown, serialize_markdown};
///
/// let source = "```js\nconsole.log(1)\n```";
/// assert_eq!(serialize_markdown(&parse_markdown(source)), source);
/// ```
pub fn serialize_markdown(doc: &Document) -> String {
    doc.blocks
        .iter()
        .map(serialize_block)
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Serialize a single block without surrounding blank lines.
pub fn serialize_block(block: &Block) -> String {
    match block {
        Block::Paragraph(content) => serialize_paragraph(content),
        Block::Heading { level, content } => format!(
            "{} {}",
            level.marker(),
            serialize_inlines(content, InlineContext::SingleLine)
        ),
        Block::BulletList(items) => serialize_list(items, |_| "-".to_string()),
        Block::OrderedList { start, items } => serialize_list(items, |index| {
            // Past the marker limit the item would read back as text; only
            // the first number carries meaning, so repeat it instead
            let number = u32::try_from(index)
                .ok()
                .and_then(|offset| start.checked_add(offset))
                .filter(|number| *number <= MAX_ORDERED_NUMBER)
                .unwrap_or(*start);
            format!("{}.", number)
        }),
        Block::Blockquote(content) => format!(
            "> {}",
            serialize_inlines(content, InlineContext::SingleLine)
        ),
        Block::CodeBlock(code) => serialize_code_block(code),
        Block::HorizontalRule => "---".to_string(),
    }
}

/// Serialize an inline sequence as it would appear inside a paragraph.
pub fn serialize_inline_content(inlines: &[Inline]) -> String {
    serialize_inlines(inlines, InlineContext::Paragraph)
}

// ─────────────────────────────────────────────────────────────────────────────
// Fenced Code Block Rule
// ─────────────────────────────────────────────────────────────────────────────

/// Write a code block as a fence, keeping its language tag.
///
/// Untagged blocks get a bare fence; the `plaintext` rendering default is
/// never written back.
fn serialize_code_block(code: &CodeBlock) -> String {
    let language = code.language.as_deref().unwrap_or_default();
    format!("{FENCE}{language}\n{}\n{FENCE}", code.text)
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn serialize_list(items: &[ListItem], marker: impl Fn(usize) -> String) -> String {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            format!(
                "{} {}",
                marker(index),
                serialize_inlines(&item.content, InlineContext::SingleLine)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn serialize_paragraph(content: &[Inline]) -> String {
    serialize_inlines(content, InlineContext::Paragraph)
        .split('\n')
        .map(escape_line_start)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape a paragraph line that would otherwise start a different block.
fn escape_line_start(line: &str) -> String {
    match classify_line(line) {
        LineKind::Ordered(..) => {
            // `12. x` → `12\. x`
            let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            format!("{}\\{}", &line[..digits], &line[digits..])
        }
        kind if kind.is_block_marker() => format!("\\{}", line),
        _ if line.starts_with(FENCE) => format!("\\{}", line),
        _ => line.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Serialization
// ─────────────────────────────────────────────────────────────────────────────

fn serialize_inlines(inlines: &[Inline], context: InlineContext) -> String {
    let mut output = String::new();
    write_inlines(inlines, context, &mut output);
    output
}

/// Write a sibling sequence.
///
/// Emphasis directly after `*` emphasis is written with `_` markers, so the
/// two marker runs never fuse (`**a**_b_**c**`). A word character right
/// after the span would keep `_` from closing, so `*` is kept there.
fn write_inlines(inlines: &[Inline], context: InlineContext, output: &mut String) {
    let mut after_star = false;
    for (index, inline) in inlines.iter().enumerate() {
        let marker = if after_star && !starts_word(inlines.get(index + 1)) {
            '_'
        } else {
            '*'
        };
        write_inline(inline, marker, context, output);
        after_star = is_emphasis(inline) && marker == '*';
    }
}

fn write_inline(inline: &Inline, marker: char, context: InlineContext, output: &mut String) {
    match inline {
        Inline::Text(text) => output.push_str(&escape_text(text)),
        Inline::Bold(children) => wrap(children, marker, 2, context, output),
        Inline::Italic(children) => wrap(children, marker, 1, context, output),
        Inline::BoldItalic(children) => wrap(children, marker, 3, context, output),
        Inline::Code(code) => {
            output.push('`');
            output.push_str(code);
            output.push('`');
        }
        Inline::Link { href, children } => {
            output.push('[');
            write_inlines(children, context, output);
            output.push_str("](");
            output.push_str(href);
            output.push(')');
        }
        Inline::LineBreak => match context {
            InlineContext::Paragraph => output.push('\n'),
            InlineContext::SingleLine => output.push(' '),
        },
    }
}

fn wrap(
    children: &[Inline],
    marker: char,
    width: usize,
    context: InlineContext,
    output: &mut String,
) {
    let run: String = std::iter::repeat(marker).take(width).collect();
    output.push_str(&run);
    write_inlines(children, context, output);
    output.push_str(&run);
}

fn is_emphasis(inline: &Inline) -> bool {
    matches!(
        inline,
        Inline::Bold(_) | Inline::Italic(_) | Inline::BoldItalic(_)
    )
}

fn starts_word(next: Option<&Inline>) -> bool {
    matches!(next, Some(Inline::Text(text)) if text.chars().next().is_some_and(char::is_alphanumeric))
}

/// Escape marker characters in text.
///
/// An `_` between two word characters can neither open nor close emphasis
/// and is left as is.
fn escape_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut escaped = String::with_capacity(text.len());
    for (index, &c) in chars.iter().enumerate() {
        let intraword = |offset: Option<usize>| {
            offset
                .and_then(|i| chars.get(i))
                .is_some_and(|n| n.is_alphanumeric())
        };
        let needs_escape = INLINE_SPECIAL.contains(&c)
            || (c == '_' && !(intraword(index.checked_sub(1)) && intraword(Some(index + 1))));
        if needs_escape {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parser::parse_markdown;
    use crate::markdown::tree::HeadingLevel;

    fn text(s: &str) -> Inline {
        Inline::text(s)
    }

    fn roundtrip(source: &str) -> String {
        serialize_markdown(&parse_markdown(source))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block Serialization Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_serialize_empty_document() {
        assert_eq!(serialize_markdown(&Document::default()), "");
    }

    #[test]
    fn test_serialize_heading() {
        let doc = Document::new(vec![Block::Heading {
            level: HeadingLevel::H2,
            content: vec![text("Title")],
        }]);
        assert_eq!(serialize_markdown(&doc), "## Title");
    }

    #[test]
    fn test_serialize_lists() {
        let doc = Document::new(vec![
            Block::BulletList(vec![
                ListItem::new(vec![text("a")]),
                ListItem::new(vec![text("b")]),
            ]),
            Block::OrderedList {
                start: 4,
                items: vec![
                    ListItem::new(vec![text("four")]),
                    ListItem::new(vec![text("five")]),
                ],
            },
        ]);
        assert_eq!(serialize_markdown(&doc), "- a\n- b\n\n4. four\n5. five");
    }

    #[test]
    fn test_ordered_numbers_stay_within_marker_limit() {
        let doc = parse_markdown("999999998. a\n999999998. b\n999999998. c");
        let markdown = serialize_markdown(&doc);
        assert_eq!(markdown, "999999998. a\n999999999. b\n999999998. c");
        assert_eq!(parse_markdown(&markdown), doc);
    }

    #[test]
    fn test_serialize_blockquote_and_rule() {
        let doc = Document::new(vec![
            Block::Blockquote(vec![text("quoted")]),
            Block::HorizontalRule,
        ]);
        assert_eq!(serialize_markdown(&doc), "> quoted\n\n---");
    }

    #[test]
    fn test_serialize_skips_empty_blocks() {
        let doc = Document::new(vec![
            Block::Paragraph(vec![]),
            Block::BulletList(vec![]),
            Block::Paragraph(vec![text("kept")]),
        ]);
        assert_eq!(serialize_markdown(&doc), "kept");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Code Block Rule Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_code_block_keeps_language() {
        let code = CodeBlock::new(Some("js".to_string()), "console.log(1)");
        assert_eq!(
            serialize_block(&Block::CodeBlock(code)),
            "```js\nconsole.log(1)\n```"
        );
    }

    #[test]
    fn test_code_block_without_language_has_bare_fence() {
        let code = CodeBlock::new(None, "x = 1");
        assert_eq!(serialize_block(&Block::CodeBlock(code)), "```\nx = 1\n```");
    }

    #[test]
    fn test_code_block_text_is_not_escaped() {
        let code = CodeBlock::new(Some("md".to_string()), "**raw** `x` [y]");
        assert_eq!(
            serialize_block(&Block::CodeBlock(code)),
            "```md\n**raw** `x` [y]\n```"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inline Serialization Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_serialize_emphasis() {
        let content = vec![
            Inline::Bold(vec![text("b")]),
            text(" "),
            Inline::Italic(vec![text("i")]),
            text(" "),
            Inline::BoldItalic(vec![text("bi")]),
        ];
        assert_eq!(serialize_inline_content(&content), "**b** *i* ***bi***");
    }

    #[test]
    fn test_adjacent_emphasis_alternates_markers() {
        let bold = |s: &str| Inline::Bold(vec![text(s)]);
        let italic = |s: &str| Inline::Italic(vec![text(s)]);

        let content = vec![bold("a"), italic("b"), bold("c")];
        assert_eq!(serialize_inline_content(&content), "**a**_b_**c**");

        // A word right after the span keeps `*`
        let content = vec![bold("a"), italic("b"), text("c")];
        assert_eq!(serialize_inline_content(&content), "**a***b*c");

        for content in [
            vec![bold("a"), italic("b"), bold("c")],
            vec![bold("a"), italic("b"), text("c")],
            vec![italic("a"), bold("b")],
            vec![Inline::BoldItalic(vec![text("a")]), italic("b")],
        ] {
            let doc = Document::new(vec![Block::Paragraph(content)]);
            assert_eq!(parse_markdown(&serialize_markdown(&doc)), doc);
        }
    }

    #[test]
    fn test_underscores_escaped_outside_words() {
        assert_eq!(
            serialize_inline_content(&[text("snake_case and _x_ and a_")]),
            r"snake_case and \_x\_ and a\_"
        );
    }

    #[test]
    fn test_serialize_link_and_code() {
        let content = vec![
            Inline::Link {
                href: "https://x".to_string(),
                children: vec![text("site")],
            },
            text(" and "),
            Inline::Code("a*b".to_string()),
        ];
        assert_eq!(serialize_inline_content(&content), "[site](https://x) and `a*b`");
    }

    #[test]
    fn test_text_markers_are_escaped() {
        assert_eq!(
            serialize_inline_content(&[text(r"2*3 [x] \ `y`")]),
            r"2\*3 \[x\] \\ \`y\`"
        );
    }

    #[test]
    fn test_line_break_in_single_line_block_becomes_space() {
        let doc = Document::new(vec![Block::Heading {
            level: HeadingLevel::H1,
            content: vec![text("a"), Inline::LineBreak, text("b")],
        }]);
        assert_eq!(serialize_markdown(&doc), "# a b");
    }

    #[test]
    fn test_paragraph_line_starts_are_escaped() {
        let doc = Document::new(vec![Block::Paragraph(vec![
            text("# not heading"),
            Inline::LineBreak,
            text("- not item"),
            Inline::LineBreak,
            text("12. not ordered"),
            Inline::LineBreak,
            text("---"),
            Inline::LineBreak,
            text("> not quote"),
        ])]);
        assert_eq!(
            serialize_markdown(&doc),
            "\\# not heading\n\\- not item\n12\\. not ordered\n\\---\n\\> not quote"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Round-trip Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_roundtrip_heading() {
        assert_eq!(roundtrip("# Hello"), "# Hello");
    }

    #[test]
    fn test_roundtrip_mixed_document() {
        let source = "# Title\n\nSome **bold** and *italic* with `code`.\n\n- one\n- [two](https://two.dev)\n\n1. first\n2. second\n\n> quote\n\n```rust\nfn main() {}\n```\n\n---";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_roundtrip_normalizes_spacing() {
        assert_eq!(roundtrip("#   Spaced   \n\n\n\npara"), "# Spaced\n\npara");
    }

    #[test]
    fn test_roundtrip_unterminated_fence_gets_closed() {
        assert_eq!(roundtrip("```py\nprint(1)"), "```py\nprint(1)\n```");
    }

    #[test]
    fn test_reparse_of_escaped_paragraph_is_stable() {
        let doc = Document::new(vec![Block::Paragraph(vec![
            text("# a * b"),
            Inline::LineBreak,
            text("3. c"),
        ])]);
        assert_eq!(parse_markdown(&serialize_markdown(&doc)), doc);
    }
}
