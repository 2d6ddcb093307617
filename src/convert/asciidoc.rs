//! Basic AsciiDoc to markdown conversion
//!
//! Covers the subset of AsciiDoc that maps onto the Document Tree:
//! section titles, constrained bold/italic, monospace, links, flat lists,
//! listing blocks with a `[source,lang]` attribute, quote blocks and
//! thematic breaks. Header attribute entries and line comments are dropped;
//! everything else passes through unchanged.

use regex::Regex;
use std::sync::OnceLock;

use super::MarkupConverter;
use crate::error::{Error, Result};

/// Delimiter of a listing (source) block.
const LISTING_DELIMITER: &str = "----";
/// Delimiter of a literal block.
const LITERAL_DELIMITER: &str = "....";
/// Delimiter of a quote block.
const QUOTE_DELIMITER: &str = "____";
/// Sentinel wrapping protected spans while emphasis is rewritten.
const PLACEHOLDER: char = '\u{0}';

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

fn section_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(=+)\s+(.+?)\s*$").expect("hardcoded regex is valid"))
}

fn source_attribute_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[source(?:\s*,\s*([^,\]\s]+))?[^\]]*\]\s*$").expect("hardcoded regex is valid")
    })
}

fn attribute_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^:!?[\w-]+!?:").expect("hardcoded regex is valid"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:link:)?((?:https?|mailto|ftp)://[^\s\[]+|link:[^\s\[]+)\[([^\]]*)\]")
            .expect("hardcoded regex is valid")
    })
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(^|[^\w*])\*([^*\s](?:[^*\n]*[^*\s])?)\*").expect("hardcoded regex is valid")
    })
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(^|[^\w_])_([^_\s](?:[^_\n]*[^_\s])?)_").expect("hardcoded regex is valid")
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Converter
// ─────────────────────────────────────────────────────────────────────────────

/// Default converter for `adoc` sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiDocConverter;

impl MarkupConverter for AsciiDocConverter {
    fn to_markdown(&self, source: &str) -> Result<String> {
        convert(source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimited {
    Listing,
    Literal,
    Quote,
}

fn convert(source: &str) -> Result<String> {
    let mut output: Vec<String> = Vec::new();
    let mut pending_language: Option<String> = None;
    let mut open_block: Option<(Delimited, usize)> = None;
    let mut ordered_number = 0u32;

    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim_end();

        // Inside a delimited block
        if let Some((kind, _)) = open_block {
            let closes = match kind {
                Delimited::Listing => trimmed == LISTING_DELIMITER,
                Delimited::Literal => trimmed == LITERAL_DELIMITER,
                Delimited::Quote => trimmed == QUOTE_DELIMITER,
            };
            if closes {
                if kind != Delimited::Quote {
                    output.push("```".to_string());
                }
                open_block = None;
            } else if kind == Delimited::Quote {
                if !trimmed.trim().is_empty() {
                    output.push(format!("> {}", convert_inline(trimmed.trim())));
                }
            } else {
                output.push(line.to_string());
            }
            continue;
        }

        if let Some(caps) = source_attribute_re().captures(trimmed) {
            pending_language = Some(caps.get(1).map_or("", |m| m.as_str()).to_string());
            continue;
        }

        let kind = match trimmed {
            LISTING_DELIMITER => Some(Delimited::Listing),
            LITERAL_DELIMITER => Some(Delimited::Literal),
            QUOTE_DELIMITER => Some(Delimited::Quote),
            _ => None,
        };
        if let Some(kind) = kind {
            if kind != Delimited::Quote {
                let language = pending_language.take().unwrap_or_default();
                output.push(format!("```{}", language));
            }
            open_block = Some((kind, index + 1));
            ordered_number = 0;
            continue;
        }
        pending_language = None;

        if trimmed.starts_with("//") || attribute_entry_re().is_match(trimmed) {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix(". ") {
            ordered_number += 1;
            output.push(format!("{}. {}", ordered_number, convert_inline(item.trim())));
            continue;
        }
        ordered_number = 0;

        output.push(convert_line(trimmed));
    }

    if let Some((kind, line)) = open_block {
        return Err(Error::Conversion {
            format: "adoc".to_string(),
            message: format!("unterminated {:?} block opened at line {}", kind, line),
        });
    }

    Ok(output.join("\n"))
}

/// Convert a single line outside delimited blocks.
fn convert_line(line: &str) -> String {
    if line == "'''" {
        return "---".to_string();
    }
    if let Some(caps) = section_title_re().captures(line) {
        let depth = caps[1].len();
        return format!("{} {}", "#".repeat(depth), convert_inline(&caps[2]));
    }
    if let Some(item) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
        return format!("- {}", convert_inline(item.trim()));
    }
    convert_inline(line)
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Rewrite inline AsciiDoc markup as markdown.
///
/// Monospace spans and links are set aside first so emphasis rewriting never
/// touches code or URLs.
fn convert_inline(text: &str) -> String {
    // Stray sentinels in the input would be read back as span indices
    let text = text.replace(PLACEHOLDER, "");
    let mut protected: Vec<String> = Vec::new();

    let mut protect = |replacement: String| {
        protected.push(replacement);
        format!("{PLACEHOLDER}{}{PLACEHOLDER}", protected.len() - 1)
    };

    // Monospace spans pass through verbatim
    let mut staged = String::new();
    let mut rest = text.as_str();
    while let Some(start) = rest.find('`') {
        let Some(len) = rest[start + 1..].find('`') else {
            break;
        };
        staged.push_str(&rest[..start]);
        staged.push_str(&protect(rest[start..start + len + 2].to_string()));
        rest = &rest[start + len + 2..];
    }
    staged.push_str(rest);

    let staged = link_re()
        .replace_all(&staged, |caps: &regex::Captures| {
            let target = caps[1].trim_start_matches("link:");
            let label = if caps[2].is_empty() { target } else { &caps[2] };
            protect(format!("[{}]({})", label, target))
        })
        .into_owned();

    let staged = bold_re().replace_all(&staged, "$1**$2**");
    let staged = italic_re().replace_all(&staged, "$1*$2*");

    restore(&staged, &protected)
}

fn restore(text: &str, protected: &[String]) -> String {
    let mut output = String::with_capacity(text.len());
    let mut parts = text.split(PLACEHOLDER);
    if let Some(first) = parts.next() {
        output.push_str(first);
    }
    // Placeholders alternate: index, literal text, index, ...
    let mut is_index = true;
    for part in parts {
        if is_index {
            match part.parse::<usize>().ok().and_then(|i| protected.get(i)) {
                Some(original) => output.push_str(original),
                None => output.push_str(part),
            }
        } else {
            output.push_str(part);
        }
        is_index = !is_index;
    }
    output
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
