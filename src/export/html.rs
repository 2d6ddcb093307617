//! HTML rendering of the Document Tree
//!
//! This is the bridge towards a rich-text host: markdown is parsed into the
//! Document Tree and written out as HTML, with HTML metacharacters escaped
//! and code blocks tagged with a `language-<lang>` class.

use std::path::Path;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::markdown::{parse_markdown, Block, CodeBlock, Document, Inline, ListItem};
use crate::markdown::{DEFAULT_CODE_LANGUAGE, LANGUAGE_CLASS_PREFIX};

/// URL schemes dropped from links when `safe_links` is on.
const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Language class used for code blocks without a tag
    pub default_code_language: String,
    /// Render links with a script-capable scheme as plain content
    pub safe_links: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            default_code_language: String::from(DEFAULT_CODE_LANGUAGE),
            safe_links: true,
        }
    }
}

impl HtmlOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_code_language: settings.default_code_language.clone(),
            safe_links: settings.safe_links,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Render a Document Tree as an HTML fragment.
pub fn render_html(doc: &Document, options: &HtmlOptions) -> String {
    doc.blocks
        .iter()
        .map(|block| render_block(block, options))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse markdown and render it with default options.
pub fn markdown_to_html(markdown: &str) -> String {
    render_html(&parse_markdown(markdown), &HtmlOptions::default())
}

/// Generate a complete HTML document from markdown content.
pub fn generate_html_document(markdown: &str, title: Option<&str>, options: &HtmlOptions) -> String {
    let body = render_html(&parse_markdown(markdown), options);
    let doc_title = title.unwrap_or("Exported Document");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="markmode">
    <title>{title}</title>
    <style>
{base_css}
    </style>
</head>
<body>
    <article class="markdown-body">
{body}
    </article>
</body>
</html>"#,
        title = html_escape(doc_title),
        base_css = BASE_CSS,
        body = body,
    )
}

/// Export a markdown file to a standalone HTML file.
pub fn export_to_html_file(source_path: &Path, output_path: &Path, options: &HtmlOptions) -> Result<()> {
    let markdown = std::fs::read_to_string(source_path).map_err(|e| Error::FileRead {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    let title = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Document");

    let html = generate_html_document(&markdown, Some(title), options);

    std::fs::write(output_path, html).map_err(|e| Error::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Blocks
// ─────────────────────────────────────────────────────────────────────────────

fn render_block(block: &Block, options: &HtmlOptions) -> String {
    match block {
        Block::Paragraph(content) => format!("<p>{}</p>", render_inlines(content, options)),
        Block::Heading { level, content } => {
            let n = level.as_u8();
            format!("<h{n}>{}</h{n}>", render_inlines(content, options))
        }
        Block::BulletList(items) => format!("<ul>\n{}\n</ul>", render_items(items, options)),
        Block::OrderedList { start, items } => {
            let start_attr = if *start == 1 {
                String::new()
            } else {
                format!(" start=\"{}\"", start)
            };
            format!("<ol{}>\n{}\n</ol>", start_attr, render_items(items, options))
        }
        Block::Blockquote(content) => format!(
            "<blockquote>\n<p>{}</p>\n</blockquote>",
            render_inlines(content, options)
        ),
        Block::CodeBlock(code) => render_code_block(code, options),
        Block::HorizontalRule => "<hr>".to_string(),
    }
}

fn render_items(items: &[ListItem], options: &HtmlOptions) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", render_inlines(&item.content, options)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_code_block(code: &CodeBlock, options: &HtmlOptions) -> String {
    let class = code
        .language_class()
        .unwrap_or_else(|| format!("{}{}", LANGUAGE_CLASS_PREFIX, options.default_code_language));
    format!(
        "<pre><code class=\"{}\">{}</code></pre>",
        html_escape(&class),
        html_escape(&code.text)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Inlines
// ─────────────────────────────────────────────────────────────────────────────

fn render_inlines(inlines: &[Inline], options: &HtmlOptions) -> String {
    let mut html = String::new();
    for inline in inlines {
        render_inline(inline, options, &mut html);
    }
    html
}

fn render_inline(inline: &Inline, options: &HtmlOptions, html: &mut String) {
    match inline {
        Inline::Text(text) => html.push_str(&html_escape(text)),
        Inline::Bold(children) => wrap("<strong>", "</strong>", children, options, html),
        Inline::Italic(children) => wrap("<em>", "</em>", children, options, html),
        Inline::BoldItalic(children) => {
            wrap("<strong><em>", "</em></strong>", children, options, html)
        }
        Inline::Code(code) => {
            html.push_str("<code>");
            html.push_str(&html_escape(code));
            html.push_str("</code>");
        }
        Inline::Link { href, children } => {
            if options.safe_links && is_unsafe_href(href) {
                html.push_str(&render_inlines(children, options));
            } else {
                let open = format!("<a href=\"{}\">", html_escape(href));
                wrap(&open, "</a>", children, options, html);
            }
        }
        Inline::LineBreak => html.push_str("<br>\n"),
    }
}

fn wrap(open: &str, close: &str, children: &[Inline], options: &HtmlOptions, html: &mut String) {
    html.push_str(open);
    for child in children {
        render_inline(child, options, html);
    }
    html.push_str(close);
}

fn is_unsafe_href(href: &str) -> bool {
    let normalized: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    UNSAFE_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

/// HTML-escape a string.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Base CSS for the standalone document.
const BASE_CSS: &str = r#"
body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
}

.markdown-body {
    max-width: 900px;
    margin: 0 auto;
    padding: 32px 24px;
}

.markdown-body pre {
    padding: 16px;
    overflow: auto;
    border-radius: 6px;
    background: #f6f8fa;
}

.markdown-body blockquote {
    margin: 0;
    padding: 0 1em;
    border-left: 0.25em solid #d0d7de;
    color: #57606a;
}
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
