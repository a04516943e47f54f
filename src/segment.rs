//! Plain-text segmentation.
//!
//! When a book has no usable navigation document, its plain-text rendering
//! is split into chapters by the first strategy in [`STRATEGIES`] that
//! produces a confident result. If none does, the whole text becomes a
//! single chapter.

use crate::config::SegmentConfig;
use crate::model::Chapter;
use crate::patterns::{HEADING_PATTERNS, STAR_SEPARATOR_RE};
use crate::title::infer_title;

/// Form feed, emitted by converters for `--chapter-mark pagebreak`.
pub const PAGE_BREAK: char = '\x0C';

/// A splitting strategy: `None` means "not confident, try the next one".
pub type SplitFn = fn(&str, &SegmentConfig) -> Option<Vec<String>>;

/// A named entry in the strategy table.
#[derive(Clone, Copy)]
pub struct SplitStrategy {
    pub name: &'static str,
    pub split: SplitFn,
}

/// Strategies in priority order.
pub const STRATEGIES: &[SplitStrategy] = &[
    SplitStrategy {
        name: "page-break",
        split: split_page_breaks,
    },
    SplitStrategy {
        name: "star-separator",
        split: split_star_separators,
    },
    SplitStrategy {
        name: "heading-pattern",
        split: split_heading_patterns,
    },
];

/// Split text into chapters with dense indices and inferred titles.
pub fn segment_text(text: &str, config: &SegmentConfig) -> Vec<Chapter> {
    split_parts(text, config)
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(index, part)| Chapter::new(index, infer_title(part, index + 1), part))
        .collect()
}

/// Run the strategy table; the whole text is the fallback.
pub fn split_parts(text: &str, config: &SegmentConfig) -> Vec<String> {
    for strategy in STRATEGIES {
        if let Some(parts) = (strategy.split)(text, config) {
            tracing::debug!(strategy = strategy.name, parts = parts.len(), "text split");
            return parts;
        }
    }
    tracing::debug!("no split strategy matched, keeping text whole");
    vec![text.to_string()]
}

/// Split on form feeds. Confident whenever there is more than one part.
pub fn split_page_breaks(text: &str, _config: &SegmentConfig) -> Option<Vec<String>> {
    let parts: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();
    (parts.len() > 1).then_some(parts)
}

/// Split on `* * *` lines, dropping short parts (front matter, TOC).
///
/// Confident only with at least `min_parts` separators and `min_parts`
/// surviving parts; two scene breaks in an otherwise unbroken text are
/// not chapter structure.
pub fn split_star_separators(text: &str, config: &SegmentConfig) -> Option<Vec<String>> {
    if STAR_SEPARATOR_RE.find_iter(text).count() < config.min_parts {
        return None;
    }
    let parts: Vec<String> = STAR_SEPARATOR_RE
        .split(text)
        .map(str::trim)
        .filter(|part| part.chars().count() >= config.star_min_part_chars)
        .map(str::to_string)
        .collect();
    (parts.len() >= config.min_parts).then_some(parts)
}

/// Split at chapter headings, trying each pattern family in turn.
///
/// Text before the first heading is preamble and dropped; every other span
/// must be longer than `heading_min_part_chars` to count.
pub fn split_heading_patterns(text: &str, config: &SegmentConfig) -> Option<Vec<String>> {
    HEADING_PATTERNS.iter().find_map(|pattern| {
        let starts: Vec<usize> = pattern.find_iter(text).map(|m| m.start()).collect();
        if starts.len() < config.min_parts {
            return None;
        }

        let ends = starts.iter().skip(1).copied().chain([text.len()]);
        let parts: Vec<String> = starts
            .iter()
            .zip(ends)
            .map(|(&start, end)| text[start..end].trim())
            .filter(|part| part.chars().count() > config.heading_min_part_chars)
            .map(str::to_string)
            .collect();

        (parts.len() >= config.min_parts).then_some(parts)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(seed: &str, words: usize) -> String {
        vec![seed; words].join(" ")
    }

    #[test]
    fn test_page_breaks() {
        let text = "One\n\nfirst\x0CTwo\n\nsecond\x0C\x0CThree";
        let chapters = segment_text(text, &SegmentConfig::default());
        let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(chapters.len(), 3);
        assert_eq!(titles, ["Chapter 1", "Chapter 2", "Three"]);
        let indices: Vec<_> = chapters.iter().map(|c| c.index).collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn test_star_separators() {
        let body = para("lorem", 120);
        let text = format!("Front\n* * *\n{body}\n  *  *  *\n{body}\n***\n{body}\n");
        let parts = split_star_separators(&text, &SegmentConfig::default()).unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p == &body));
    }

    #[test]
    fn test_two_star_separators_fall_back_to_whole_text() {
        let body = para("lorem", 120);
        let text = format!("{body}\n* * *\n{body}\n* * *\n{body}");
        let config = SegmentConfig::default();
        assert!(split_star_separators(&text, &config).is_none());
        assert_eq!(split_parts(&text, &config), vec![text.clone()]);
        assert_eq!(segment_text(&text, &config).len(), 1);
    }

    #[test]
    fn test_star_separators_with_short_parts_not_confident() {
        let body = para("lorem", 120);
        let text = format!("{body}\n* * *\nshort\n* * *\nshort\n* * *\n{body}");
        assert!(split_star_separators(&text, &SegmentConfig::default()).is_none());
    }

    #[test]
    fn test_heading_patterns() {
        let body = para("word", 40);
        let text = format!(
            "Title page\n\nChapter 1\n\n{body}\n\nChapter 2\n\n{body}\n\nChapter 3\n\n{body}\n"
        );
        let chapters = segment_text(&text, &SegmentConfig::default());
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].title, "Chapter 1");
        assert_eq!(chapters[2].title, "Chapter 3");
        assert!(!chapters[0].content.contains("Title page"));
        let indices: Vec<_> = chapters.iter().map(|c| c.index).collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn test_heading_at_start_of_text_is_kept() {
        let body = para("word", 40);
        let text = format!("Chapter 1\n{body}\nChapter 2\n{body}\nChapter 3\n{body}");
        let parts = split_heading_patterns(&text, &SegmentConfig::default()).unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].starts_with("Chapter 1"));
    }

    #[test]
    fn test_heading_short_parts_dropped() {
        let body = para("word", 40);
        let text = format!("I.\nshort\nII.\n{body}\nIII.\n{body}\nIV.\n{body}");
        let parts = split_heading_patterns(&text, &SegmentConfig::default()).unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].starts_with("II."));
    }

    #[test]
    fn test_later_pattern_family_used_when_earlier_fails() {
        let body = para("word", 40);
        let text = format!("1. Arrival\n{body}\n2. Departure\n{body}\n3. Return\n{body}");
        let chapters = segment_text(&text, &SegmentConfig::default());
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[1].title, "2. Departure");
    }

    #[test]
    fn test_too_few_headings_keeps_whole_text() {
        let body = para("word", 40);
        let text = format!("Chapter 1\n{body}\nChapter 2\n{body}");
        let chapters = segment_text(&text, &SegmentConfig::default());
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].index, 0);
        assert_eq!(chapters[0].title, "Chapter 1");
    }

    #[test]
    fn test_configurable_thresholds() {
        let text = "Chapter 1\nshort\nChapter 2\nshort\n";
        let config = SegmentConfig {
            min_parts: 2,
            star_min_part_chars: 500,
            heading_min_part_chars: 5,
        };
        assert_eq!(split_heading_patterns(text, &config).map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_empty_text() {
        assert!(segment_text("", &SegmentConfig::default()).is_empty());
        assert!(segment_text(" \n\x0C\n ", &SegmentConfig::default()).is_empty());
    }

    #[test]
    fn test_strategy_order() {
        let names: Vec<_> = STRATEGIES.iter().map(|s| s.name).collect();
        assert_eq!(names, ["page-break", "star-separator", "heading-pattern"]);
    }
}
