//! Inline scanning
//!
//! Turns a single line of markdown into an inline sequence. Scanning runs
//! left to right with three priorities that mirror the block parser's phase
//! order:
//!
//! 1. Code spans (`` `code` ``) are captured first; their content is literal.
//! 2. Emphasis, longest marker first: `***` → bold-italic, `**` → bold,
//!    `*` → italic, with `_` runs working the same way. Closer searches step
//!    over code spans and nested spans, so markers inside them never pair up
//!    with markers outside.
//! 3. Links (`[text](url)`).
//!
//! A backslash before ASCII punctuation yields the punctuation literally.
//! Anything that does not form a complete construct stays plain text.
//!
//! `_` runs never open or close inside a word (`snake_case` stays text).

use std::collections::HashMap;

use super::tree::Inline;

/// Longest emphasis marker run that is treated as emphasis.
const MAX_EMPHASIS_RUN: usize = 3;

/// Closer searches already made, keyed by `(content start, marker, width)`.
type CloserCache = HashMap<(usize, char, usize), Option<usize>>;

/// A recognised emphasis span.
struct Emphasis {
    /// Opener markers left over as literal text before the span
    literal: usize,
    node: Inline,
    /// Index just past the closing run
    end: usize,
}

/// Parse one line of markdown into inline nodes.
pub(crate) fn parse_inlines(text: &str) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    parse_range(&chars)
}

fn parse_range(chars: &[char]) -> Vec<Inline> {
    let mut nodes = Vec::new();
    let mut text = String::new();
    let mut closers = CloserCache::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if chars.get(i + 1).is_some_and(|c| c.is_ascii_punctuation()) => {
                text.push(chars[i + 1]);
                i += 2;
            }
            '`' => match find_code_close(chars, i) {
                Some(end) => {
                    flush_text(&mut nodes, &mut text);
                    nodes.push(Inline::Code(collect(&chars[i + 1..end])));
                    i = end + 1;
                }
                None => {
                    text.push('`');
                    i += 1;
                }
            },
            marker @ ('*' | '_') => {
                let found = if can_open(chars, i, marker) {
                    scan_emphasis(chars, i, &mut closers)
                } else {
                    None
                };
                match found {
                    Some(span) => {
                        text.extend(&chars[i..i + span.literal]);
                        flush_text(&mut nodes, &mut text);
                        nodes.push(span.node);
                        i = span.end;
                    }
                    None => {
                        // Unmatched runs stay literal as a whole
                        let run = run_len(chars, i, marker);
                        text.extend(&chars[i..i + run]);
                        i += run;
                    }
                }
            }
            '[' => match scan_link(chars, i) {
                Some((node, next)) => {
                    flush_text(&mut nodes, &mut text);
                    nodes.push(node);
                    i = next;
                }
                None => {
                    text.push('[');
                    i += 1;
                }
            },
            c => {
                text.push(c);
                i += 1;
            }
        }
    }

    flush_text(&mut nodes, &mut text);
    nodes
}

fn flush_text(nodes: &mut Vec<Inline>, text: &mut String) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = nodes.last_mut() {
        last.push_str(text);
        text.clear();
    } else {
        nodes.push(Inline::Text(std::mem::take(text)));
    }
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

fn run_len(chars: &[char], start: usize, marker: char) -> usize {
    chars[start..].iter().take_while(|&&c| c == marker).count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Code Spans
// ─────────────────────────────────────────────────────────────────────────────

/// Find the closing backtick of a code span opened at `open`.
///
/// Empty spans (two adjacent backticks) are not code.
fn find_code_close(chars: &[char], open: usize) -> Option<usize> {
    let offset = chars[open + 1..].iter().position(|&c| c == '`')?;
    if offset == 0 {
        return None;
    }
    Some(open + 1 + offset)
}

// ─────────────────────────────────────────────────────────────────────────────
// Emphasis
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the run at `at` may open a span: it must be followed by content,
/// and an `_` run must not sit inside a word.
fn can_open(chars: &[char], at: usize, marker: char) -> bool {
    let run = run_len(chars, at, marker);
    if at + run >= chars.len() {
        return false;
    }
    marker == '*' || at == 0 || !chars[at - 1].is_alphanumeric()
}

/// Parse the emphasis span opened by the marker run at `open`.
///
/// Every width is first tried with surplus opener markers inside the span
/// (`***a*b**` is bold around an italic); only then are they left as literal
/// text in front of it (`***a**` is `*` then bold).
fn scan_emphasis(chars: &[char], open: usize, closers: &mut CloserCache) -> Option<Emphasis> {
    let marker = chars[open];
    let run = run_len(chars, open, marker);
    if run > MAX_EMPHASIS_RUN {
        return None;
    }

    let inner = (1..=run).rev().map(|width| (width, open + width));
    let outer = (1..run).rev().map(|width| (width, open + run));
    for (width, content_start) in inner.chain(outer) {
        let Some(close) = find_emphasis_close(chars, content_start, marker, width, closers)
        else {
            continue;
        };
        let children = parse_range(&chars[content_start..close]);
        let node = match width {
            3 => Inline::BoldItalic(children),
            2 => Inline::Bold(children),
            _ => Inline::Italic(children),
        };
        return Some(Emphasis {
            literal: content_start - width - open,
            node,
            end: close + width,
        });
    }

    None
}

/// Find where a span of `width` markers with content starting at `from`
/// closes.
///
/// A run of exactly `width` markers closes the span. A longer run closes it
/// with its leading markers (`**a***b*` is bold then italic) unless it opens
/// a nested span of its own, which is skipped whole (`*a**b**c*`).
fn find_emphasis_close(
    chars: &[char],
    from: usize,
    marker: char,
    width: usize,
    closers: &mut CloserCache,
) -> Option<usize> {
    if let Some(cached) = closers.get(&(from, marker, width)) {
        return *cached;
    }
    let found = search_emphasis_close(chars, from, marker, width, closers);
    closers.insert((from, marker, width), found);
    found
}

fn search_emphasis_close(
    chars: &[char],
    from: usize,
    marker: char,
    width: usize,
    closers: &mut CloserCache,
) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '`' => match find_code_close(chars, j) {
                Some(end) => j = end + 1,
                None => j += 1,
            },
            c @ ('*' | '_') => {
                let run = run_len(chars, j, c);
                if c == marker && j > from {
                    let word_follows = chars.get(j + run).is_some_and(|n| n.is_alphanumeric());
                    if run == width && (marker == '*' || !word_follows) {
                        return Some(j);
                    }
                }
                if run <= MAX_EMPHASIS_RUN && can_open(chars, j, c) {
                    if let Some(close) = find_emphasis_close(chars, j + run, c, run, closers) {
                        j = close + run;
                        continue;
                    }
                }
                if c == marker && j > from && run > width {
                    return Some(j);
                }
                j += run;
            }
            _ => j += 1,
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Links
// ─────────────────────────────────────────────────────────────────────────────

fn scan_link(chars: &[char], open: usize) -> Option<(Inline, usize)> {
    let text_end = find_bracket_close(chars, open + 1)?;
    if text_end == open + 1 || chars.get(text_end + 1) != Some(&'(') {
        return None;
    }

    let href_start = text_end + 2;
    let href_len = chars[href_start..].iter().position(|&c| c == ')')?;
    let href = collect(&chars[href_start..href_start + href_len])
        .trim()
        .to_string();
    if href.is_empty() {
        return None;
    }

    let children = parse_range(&chars[open + 1..text_end]);
    Some((Inline::Link { href, children }, href_start + href_len + 1))
}

fn find_bracket_close(chars: &[char], from: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '`' => match find_code_close(chars, j) {
                Some(end) => j = end + 1,
                None => j += 1,
            },
            ']' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
