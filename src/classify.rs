//! Chapter-like entry classification.
//!
//! Navigation documents list front and back matter (copyright, dedication,
//! contents, notes) alongside real chapters. These rules keep the entries
//! that look like narrative content.

use crate::model::FlatTocEntry;
use crate::patterns::{CHAPTER_OR_PART_PREFIX_RE, NUMBERED_HEADING_RE, SKIP_PHRASES};

/// Labels longer than this with a space read as descriptive headings.
const DESCRIPTIVE_TITLE_CHARS: usize = 20;

/// Why an entry was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The label contains a front/back-matter phrase.
    SkipPhrase(&'static str),
    /// The label is too short to be a heading.
    TooShort,
    /// Mentions "chapter" or "part".
    Keyword,
    /// Starts with a numeral followed by a word.
    Numbered,
    /// Nested below the top level.
    Nested,
    /// Long label with spaces.
    Descriptive,
    /// None of the acceptance rules matched.
    Unrecognized,
}

impl Verdict {
    pub fn is_chapter(self) -> bool {
        matches!(
            self,
            Verdict::Keyword | Verdict::Numbered | Verdict::Nested | Verdict::Descriptive
        )
    }
}

/// Judge a single entry.
pub fn classify_entry(entry: &FlatTocEntry) -> Verdict {
    let title = entry.title.as_str();
    let lower = title.to_lowercase();

    if let Some(phrase) = SKIP_PHRASES.iter().find(|p| lower.contains(*p)) {
        return Verdict::SkipPhrase(*phrase);
    }

    let chars = title.chars().count();
    if chars < 2 {
        return Verdict::TooShort;
    }

    if lower.contains("chapter")
        || lower.contains("part")
        || CHAPTER_OR_PART_PREFIX_RE.is_match(title)
    {
        Verdict::Keyword
    } else if NUMBERED_HEADING_RE.is_match(title) {
        Verdict::Numbered
    } else if entry.level >= 2 {
        Verdict::Nested
    } else if chars > DESCRIPTIVE_TITLE_CHARS && title.contains(' ') {
        Verdict::Descriptive
    } else {
        Verdict::Unrecognized
    }
}

/// Keep the chapter-like entries, in their original order.
pub fn filter_chapter_entries(entries: &[FlatTocEntry]) -> Vec<FlatTocEntry> {
    entries
        .iter()
        .filter(|entry| {
            let verdict = classify_entry(entry);
            if !verdict.is_chapter() {
                tracing::debug!(title = %entry.title, ?verdict, "skipping navigation entry");
            }
            verdict.is_chapter()
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, level: usize) -> FlatTocEntry {
        FlatTocEntry {
            title: title.to_string(),
            level,
            href: "x.xhtml".to_string(),
            play_order: None,
        }
    }

    #[test]
    fn test_rejects_front_matter() {
        assert_eq!(
            classify_entry(&entry("Copyright Notice", 1)),
            Verdict::SkipPhrase("copyright")
        );
        assert!(!classify_entry(&entry("Table of Contents", 1)).is_chapter());
        assert!(!classify_entry(&entry("About the Author", 1)).is_chapter());
        assert!(!classify_entry(&entry("THE FULL PROJECT GUTENBERG LICENSE", 1)).is_chapter());
        assert!(!classify_entry(&entry("Transcriber's Note", 1)).is_chapter());
    }

    #[test]
    fn test_skip_phrase_beats_nesting() {
        assert!(!classify_entry(&entry("Footnotes", 3)).is_chapter());
    }

    #[test]
    fn test_rejects_short_titles() {
        assert_eq!(classify_entry(&entry("I", 2)), Verdict::TooShort);
        assert_eq!(classify_entry(&entry("", 1)), Verdict::TooShort);
    }

    #[test]
    fn test_accepts_chapter_headings() {
        assert_eq!(
            classify_entry(&entry("Chapter One: The Beginning", 1)),
            Verdict::Keyword
        );
        assert_eq!(classify_entry(&entry("PART TWO", 1)), Verdict::Keyword);
        assert_eq!(classify_entry(&entry("IV. The Storm", 1)), Verdict::Numbered);
        assert_eq!(classify_entry(&entry("12 Rules", 1)), Verdict::Numbered);
        assert_eq!(classify_entry(&entry("Prologue", 2)), Verdict::Nested);
        assert_eq!(
            classify_entry(&entry("How Candide Was Brought Up", 1)),
            Verdict::Descriptive
        );
    }

    #[test]
    fn test_rejects_unrecognized_top_level() {
        assert_eq!(classify_entry(&entry("Prologue", 1)), Verdict::Unrecognized);
        assert_eq!(classify_entry(&entry("Cover", 1)), Verdict::Unrecognized);
        // Long but no space
        assert_eq!(
            classify_entry(&entry("Supercalifragilisticexpialidocious", 1)),
            Verdict::Unrecognized
        );
    }

    #[test]
    fn test_filter_preserves_order() {
        let entries = vec![
            entry("Cover", 1),
            entry("Chapter 2", 1),
            entry("Dedication", 1),
            entry("Chapter 1", 1),
        ];
        let kept = filter_chapter_entries(&entries);
        let titles: Vec<_> = kept.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Chapter 2", "Chapter 1"]);
    }
}
