//! Chapter title inference from the opening lines of a chapter.

use crate::model::fallback_title;
use crate::patterns::{BARE_NUMERAL_RE, CHAPTER_LINE_RE, ROMAN_DOT_TITLE_RE, ROMAN_LINE_RE};

/// How many leading non-empty lines are considered.
const HEAD_LINES: usize = 5;

/// Derive a title from chapter text.
///
/// Recognizes Project Gutenberg style headings (a Roman numeral line followed
/// by an upper-case title line), "Chapter N" lines, "IV. Title" lines and bare
/// numerals. Falls back to `Chapter {fallback}`.
pub fn infer_title(text: &str, fallback: usize) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(HEAD_LINES)
        .collect();

    let Some(&first) = lines.first() else {
        return fallback_title(fallback);
    };

    if let Some(&second) = lines.get(1)
        && ROMAN_LINE_RE.is_match(first)
    {
        let len = second.chars().count();
        return if (6..100).contains(&len) {
            format!("Chapter {first}: {}", title_case(second))
        } else {
            format!("Chapter {first}")
        };
    }

    if CHAPTER_LINE_RE.is_match(first) && first.chars().count() < 80 {
        return first.to_string();
    }

    if let Some(caps) = ROMAN_DOT_TITLE_RE.captures(first) {
        return format!("Chapter {}: {}", &caps[1], title_case(&caps[2]));
    }

    if let Some(caps) = BARE_NUMERAL_RE.captures(first) {
        return format!("Chapter {}", &caps[1]);
    }

    let len = first.chars().count();
    if len > 3 && len < 60 {
        return title_case(first);
    }

    fallback_title(fallback)
}

/// Title-case shouting headings; leave everything else alone.
///
/// Only input that is entirely upper case and longer than 10 characters is
/// rewritten (lower-cased, each word capitalized, whitespace collapsed).
pub fn title_case(s: &str) -> String {
    if s != s.to_uppercase() || s.chars().count() <= 10 {
        return s.to_string();
    }

    s.to_lowercase()
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
