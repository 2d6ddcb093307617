//! Link editing on the Document Tree
//!
//! A link edit targets a [`Selection`]: one block (plus an item index inside
//! lists) and a character range over that block's flattened text. The range
//! counts `char`s of [`inlines_text`], with a line break counting as one.

use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{Error, Result};
use crate::markdown::{inlines_text, Document, Inline};

// ─────────────────────────────────────────────────────────────────────────────
// Selection
// ─────────────────────────────────────────────────────────────────────────────

/// A span of inline content inside one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Index of the block in the document
    pub block: usize,
    /// Item index when the block is a list
    pub item: Option<usize>,
    /// Character range over the flattened text
    pub range: Range<usize>,
}

impl Selection {
    /// Selection inside a paragraph, heading or blockquote.
    pub fn new(block: usize, range: Range<usize>) -> Self {
        Self {
            block,
            item: None,
            range,
        }
    }

    /// Selection inside one list item.
    pub fn in_item(block: usize, item: usize, range: Range<usize>) -> Self {
        Self {
            block,
            item: Some(item),
            range,
        }
    }

    /// A collapsed selection (cursor) at `offset`.
    pub fn caret(block: usize, offset: usize) -> Self {
        Self::new(block, offset..offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.range.start == self.range.end
    }

    fn invalid(&self, reason: &str) -> Error {
        Error::InvalidSelection {
            block: self.block,
            reason: reason.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edit Policy
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a link edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEdit {
    /// The request was cancelled; nothing changed
    Unchanged,
    /// A link with this href now covers the selection
    Set(String),
    /// No link covers the selection any more
    Unset,
}

/// Decide what a URL prompt answer means.
///
/// `None` is a cancelled prompt. An empty (or blank) answer removes the
/// link; anything else sets it, trimmed.
pub fn link_edit(input: Option<&str>) -> LinkEdit {
    match input.map(str::trim) {
        None => LinkEdit::Unchanged,
        Some("") => LinkEdit::Unset,
        Some(href) => LinkEdit::Set(href.to_string()),
    }
}

/// Apply a link edit to the selected span.
///
/// A collapsed selection inside an existing link targets that whole link.
/// Setting a link replaces any link already covering part of the range, so
/// links never nest.
pub fn apply_link(
    doc: &mut Document,
    selection: &Selection,
    input: Option<&str>,
) -> Result<LinkEdit> {
    let edit = link_edit(input);
    if edit == LinkEdit::Unchanged {
        return Ok(edit);
    }

    let inlines = target_inlines(doc, selection)?;
    let range = effective_range(inlines.as_slice(), selection)?;
    if matches!(edit, LinkEdit::Set(_)) && only_line_breaks(inlines, &range) {
        return Err(selection.invalid("selection holds no linkable text"));
    }

    let content = std::mem::take(inlines);
    let (before, rest) = split_inlines(content, range.start);
    let (middle, after) = split_inlines(rest, range.end - range.start);
    let middle = strip_links(middle);

    let mut rebuilt = before;
    match &edit {
        LinkEdit::Set(href) => rebuilt.extend(link_lines(middle, href)),
        _ => rebuilt.extend(middle),
    }
    rebuilt.extend(after);
    *inlines = normalize(rebuilt);

    debug!(
        "Link edit {:?} on block {} range {:?}",
        edit, selection.block, range
    );
    Ok(edit)
}

/// Existing href over the selection, used to prefill the URL prompt.
///
/// Returns the first link that overlaps the range, or the link under the
/// caret for a collapsed selection.
pub fn link_at(doc: &Document, selection: &Selection) -> Option<String> {
    let inlines = doc
        .blocks
        .get(selection.block)?
        .inlines(selection.item)?;
    let mut spans = Vec::new();
    collect_link_spans(inlines, 0, &mut spans);
    spans
        .into_iter()
        .find(|(span, _)| touches(span, &selection.range))
        .map(|(_, href)| href)
}

// ─────────────────────────────────────────────────────────────────────────────
// Target Resolution
// ─────────────────────────────────────────────────────────────────────────────

fn target_inlines<'a>(doc: &'a mut Document, selection: &Selection) -> Result<&'a mut Vec<Inline>> {
    let block = doc
        .blocks
        .get_mut(selection.block)
        .ok_or_else(|| selection.invalid("no such block"))?;

    if block.is_list() && selection.item.is_none() {
        return Err(selection.invalid("list selections need an item index"));
    }
    let is_list = block.is_list();
    block.inlines_mut(selection.item).ok_or_else(|| {
        if is_list {
            selection.invalid("no such list item")
        } else {
            selection.invalid("block cannot carry links")
        }
    })
}

fn effective_range(inlines: &[Inline], selection: &Selection) -> Result<Range<usize>> {
    let len = inlines_text(inlines).chars().count();
    let range = selection.range.clone();
    if range.start > range.end || range.end > len {
        return Err(selection.invalid("range is out of bounds"));
    }
    if !selection.is_collapsed() {
        return Ok(range);
    }

    let mut spans = Vec::new();
    collect_link_spans(inlines, 0, &mut spans);
    spans
        .into_iter()
        .map(|(span, _)| span)
        .find(|span| touches(span, &range))
        .ok_or_else(|| selection.invalid("selection is empty"))
}

fn touches(span: &Range<usize>, range: &Range<usize>) -> bool {
    if range.start == range.end {
        span.start <= range.start && range.start < span.end
    } else {
        span.start < range.end && range.start < span.end
    }
}

fn collect_link_spans(inlines: &[Inline], offset: usize, spans: &mut Vec<(Range<usize>, String)>) {
    let mut offset = offset;
    for inline in inlines {
        let len = char_len(inline);
        match inline {
            Inline::Link { href, .. } => spans.push((offset..offset + len, href.clone())),
            other => {
                if let Some(children) = other.children() {
                    collect_link_spans(children, offset, spans);
                }
            }
        }
        offset += len;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Surgery
// ─────────────────────────────────────────────────────────────────────────────

fn char_len(inline: &Inline) -> usize {
    inline.text_content().chars().count()
}

/// Split an inline sequence at a character offset.
///
/// Containers straddling the offset are cut in two, each half keeping the
/// container's kind and href.
fn split_inlines(inlines: Vec<Inline>, at: usize) -> (Vec<Inline>, Vec<Inline>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut offset = 0;

    for inline in inlines {
        let len = char_len(&inline);
        if offset + len <= at {
            left.push(inline);
        } else if offset >= at {
            right.push(inline);
        } else {
            let (head, tail) = split_node(inline, at - offset);
            left.push(head);
            right.push(tail);
        }
        offset += len;
    }
    (left, right)
}

fn split_node(inline: Inline, at: usize) -> (Inline, Inline) {
    match inline {
        Inline::Text(text) => {
            let (head, tail) = split_str(&text, at);
            (Inline::Text(head), Inline::Text(tail))
        }
        Inline::Code(code) => {
            let (head, tail) = split_str(&code, at);
            (Inline::Code(head), Inline::Code(tail))
        }
        Inline::Bold(children) => {
            let (head, tail) = split_inlines(children, at);
            (Inline::Bold(head), Inline::Bold(tail))
        }
        Inline::Italic(children) => {
            let (head, tail) = split_inlines(children, at);
            (Inline::Italic(head), Inline::Italic(tail))
        }
        Inline::BoldItalic(children) => {
            let (head, tail) = split_inlines(children, at);
            (Inline::BoldItalic(head), Inline::BoldItalic(tail))
        }
        Inline::Link { href, children } => {
            let (head, tail) = split_inlines(children, at);
            (
                Inline::Link {
                    href: href.clone(),
                    children: head,
                },
                Inline::Link {
                    href,
                    children: tail,
                },
            )
        }
        // One character wide, never straddles an offset
        Inline::LineBreak => (Inline::LineBreak, Inline::Text(String::new())),
    }
}

fn split_str(text: &str, at: usize) -> (String, String) {
    let index = text
        .char_indices()
        .nth(at)
        .map_or(text.len(), |(index, _)| index);
    (text[..index].to_string(), text[index..].to_string())
}

/// Wrap each line of `inlines` in its own link; line breaks stay between
/// the links since markdown links cannot span lines.
fn link_lines(inlines: Vec<Inline>, href: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut line = Vec::new();
    for inline in inlines {
        if inline == Inline::LineBreak {
            push_link(&mut out, std::mem::take(&mut line), href);
            out.push(Inline::LineBreak);
        } else {
            line.push(inline);
        }
    }
    push_link(&mut out, line, href);
    out
}

fn push_link(out: &mut Vec<Inline>, children: Vec<Inline>, href: &str) {
    if children.iter().any(|child| char_len(child) > 0) {
        out.push(Inline::Link {
            href: href.to_string(),
            children,
        });
    }
}

fn only_line_breaks(inlines: &[Inline], range: &Range<usize>) -> bool {
    inlines_text(inlines)
        .chars()
        .skip(range.start)
        .take(range.end - range.start)
        .all(|c| c == '\n')
}

/// Replace every link in the sequence by its children.
fn strip_links(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Link { children, .. } => out.extend(strip_links(children)),
            Inline::Bold(children) => out.push(Inline::Bold(strip_links(children))),
            Inline::Italic(children) => out.push(Inline::Italic(strip_links(children))),
            Inline::BoldItalic(children) => out.push(Inline::BoldItalic(strip_links(children))),
            other => out.push(other),
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Drop empty nodes, fold nested bold/italic into `BoldItalic`, and merge
/// adjacent nodes of the same kind (links only when the href matches).
fn normalize(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        if let Some(inline) = normalize_node(inline) {
            push_merged(&mut out, inline);
        }
    }
    out
}

fn normalize_node(inline: Inline) -> Option<Inline> {
    let node = match inline {
        Inline::Text(text) | Inline::Code(text) if text.is_empty() => return None,
        Inline::Bold(children) => match fold_single(normalize(children)) {
            Ok(Inline::Italic(inner)) => Inline::BoldItalic(inner),
            Ok(other) => Inline::Bold(vec![other]),
            Err(children) => Inline::Bold(children),
        },
        Inline::Italic(children) => match fold_single(normalize(children)) {
            Ok(Inline::Bold(inner)) => Inline::BoldItalic(inner),
            Ok(other) => Inline::Italic(vec![other]),
            Err(children) => Inline::Italic(children),
        },
        Inline::BoldItalic(children) => Inline::BoldItalic(normalize(children)),
        Inline::Link { href, children } => Inline::Link {
            href,
            children: normalize(children),
        },
        other => other,
    };

    if matches!(node.children(), Some(children) if children.is_empty()) {
        return None;
    }
    Some(node)
}

/// `Ok(node)` when the sequence is exactly one node.
fn fold_single(mut children: Vec<Inline>) -> std::result::Result<Inline, Vec<Inline>> {
    if children.len() == 1 {
        if let Some(only) = children.pop() {
            return Ok(only);
        }
    }
    Err(children)
}

fn push_merged(out: &mut Vec<Inline>, inline: Inline) {
    let unmerged = match (out.last_mut(), inline) {
        (Some(Inline::Text(prev)), Inline::Text(next))
        | (Some(Inline::Code(prev)), Inline::Code(next)) => {
            prev.push_str(&next);
            None
        }
        (Some(Inline::Bold(prev)), Inline::Bold(next))
        | (Some(Inline::Italic(prev)), Inline::Italic(next))
        | (Some(Inline::BoldItalic(prev)), Inline::BoldItalic(next)) => {
            merge_children(prev, next);
            None
        }
        (
            Some(Inline::Link {
                href: prev_href,
                children: prev,
            }),
            Inline::Link { href, children },
        ) if *prev_href == href => {
            merge_children(prev, children);
            None
        }
        (_, other) => Some(other),
    };
    if let Some(inline) = unmerged {
        out.push(inline);
    }
}

fn merge_children(prev: &mut Vec<Inline>, next: Vec<Inline>) {
    let mut merged = std::mem::take(prev);
    merged.extend(next);
    *prev = normalize(merged);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
