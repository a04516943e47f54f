//! Cached heuristic patterns.
//!
//! Uses LazyLock to compile patterns once on first use, so classification
//! and segmentation never rebuild them per call.

use regex_lite::Regex;
use std::sync::LazyLock;

// === Entry classification ===

/// Lower-case phrases marking front/back matter in navigation labels.
pub const SKIP_PHRASES: &[&str] = &[
    "transcriber",
    "note",
    "copyright",
    "dedication",
    "epigraph",
    "acknowledgment",
    "about the author",
    "about the book",
    "the full project gutenberg",
    "project gutenberg",
    "license",
    "the modern library",
    "footnotes",
    "endnotes",
    "index",
    "bibliography",
    "contents",
    "table of contents",
];

/// Leading numeral (small Roman or Arabic) followed by a word: "IV. The Storm", "12 Rules"
pub static NUMBERED_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(I{1,3}|IV|V|VI{0,3}|IX|X{0,3}|[0-9]+)\s*\.?\s+\w").unwrap()
});

/// Label starting with "Chapter"/"Part" as a word
pub static CHAPTER_OR_PART_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(chapter|part)\s+").unwrap());

// === Plain-text segmentation ===

/// A line made of three whitespace-padded asterisks
pub static STAR_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\*\s*\*\s*\*\s*\n").unwrap());

/// Chapter heading families, most specific first.
pub static HEADING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "Chapter 1" / "CHAPTER IV"
        r"(?m)^(Chapter|CHAPTER)\s+(\d+|[IVXLC]+)",
        // "I. Title text"
        r"(?m)^([IVXLC]+)\.\s+[A-Z]",
        // "1. Title text"
        r"(?m)^(\d+)\.\s+[A-Z]",
        // Roman numeral alone on its line
        r"(?m)^([IVXLC]+)\.\s*$",
        // Number alone on its line
        r"(?m)^(\d+)\.\s*$",
        // "Part 1" / "Part II"
        r"(?m)^Part\s+(\d+|[IVXLC]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// === Title inference ===

pub static ROMAN_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[IVXLC]+$").unwrap());

pub static CHAPTER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Chapter|CHAPTER)\s+(\d+|[IVXLC]+)").unwrap());

/// "IV. The Long Night" -> ("IV", "The Long Night")
pub static ROMAN_DOT_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([IVXLC]+)\.\s+(.+)$").unwrap());

/// "IV", "IV.", "12", "12."
pub static BARE_NUMERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([IVXLC]+|\d+)\.?$").unwrap());
