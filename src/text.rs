//! Best-effort markup-to-text projection.
//!
//! Not an HTML parser: it removes script/style regions, turns block-level
//! boundaries into line breaks, drops everything between `<` and `>`, and
//! normalizes the result into blank-line separated paragraphs. Character
//! references are left alone; callers decode them with [`decode_entities`].

use std::borrow::Cow;

use memchr::memmem;

use crate::util::unescape;

/// Elements whose content is never text.
const NON_TEXT_TAGS: &[&str] = &["script", "style"];

/// Elements that start a new line.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr",
];

/// Project markup to plain text with paragraphs separated by blank lines.
pub fn html_to_text(html: &str) -> String {
    let mut html = html.to_string();
    for tag in NON_TEXT_TAGS {
        html = remove_element(&html, tag);
    }

    for tag in BLOCK_TAGS {
        html = html.replace(&format!("<{tag}"), &format!("\n<{tag}"));
        html = html.replace(&format!("</{tag}>"), "\n");
    }

    normalize_paragraphs(&strip_tags(&html))
}

/// Decode character and entity references in projected text.
///
/// Unknown references are kept verbatim. Not idempotent: `&amp;lt;` decodes
/// to `&lt;`, so apply it once, after projection.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    unescape(text)
}

/// Remove every `<tag ...>...</tag>` region (ASCII case-insensitive).
///
/// Each pass removes the first opener through the next matching closer.
/// An opener without a closer stops the removal and is left in place.
pub fn remove_element(html: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = html.to_string();

    loop {
        // ASCII lowercasing keeps byte offsets aligned with `out`
        let lower = out.to_ascii_lowercase();
        let Some(start) = memmem::find(lower.as_bytes(), open.as_bytes()) else {
            break;
        };
        let Some(rel_end) = memmem::find(&lower.as_bytes()[start..], close.as_bytes()) else {
            break;
        };
        let end = start + rel_end + close.len();
        out.replace_range(start..end, "");
    }
    out
}

/// Keep only characters outside `<...>` delimiters.
pub fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Trim every line, drop blank ones, and join with a blank line.
pub fn normalize_paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
