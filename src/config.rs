//! Tunable thresholds for extraction.
//!
//! The defaults are empirical: they work well on Project Gutenberg and
//! commercial EPUBs, but nothing derives them, so every one is overridable.

use crate::convert::ChapterMark;

/// Thresholds for plain-text segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentConfig {
    /// A split strategy must produce at least this many parts to be trusted.
    pub min_parts: usize,
    /// Star-separated parts shorter than this (trimmed, in chars) are dropped.
    pub star_min_part_chars: usize,
    /// Heading-split parts must be longer than this (trimmed, in chars).
    pub heading_min_part_chars: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_parts: 3,
            star_min_part_chars: 500,
            heading_min_part_chars: 100,
        }
    }
}

/// Configuration for [`Extractor`](crate::Extractor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Chapters the book's own NCX must yield before it is trusted.
    pub min_nav_chapters: usize,
    /// NCX chapters with fewer words are treated as navigation noise.
    pub min_chapter_words: usize,
    /// Keep the raw markup slice on each chapter.
    pub keep_html: bool,
    /// XPath handed to the converter for chapter detection.
    pub chapter_xpath: Option<String>,
    /// How the converter marks chapter starts in plain-text output.
    pub chapter_mark: ChapterMark,
    pub segment: SegmentConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_nav_chapters: 3,
            min_chapter_words: 50,
            keep_html: false,
            chapter_xpath: None,
            chapter_mark: ChapterMark::default(),
            segment: SegmentConfig::default(),
        }
    }
}

impl ExtractConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_nav_chapters(mut self, count: usize) -> Self {
        self.min_nav_chapters = count;
        self
    }

    pub fn with_min_chapter_words(mut self, words: usize) -> Self {
        self.min_chapter_words = words;
        self
    }

    pub fn with_keep_html(mut self, keep: bool) -> Self {
        self.keep_html = keep;
        self
    }

    pub fn with_chapter_xpath(mut self, xpath: impl Into<String>) -> Self {
        self.chapter_xpath = Some(xpath.into());
        self
    }

    pub fn with_chapter_mark(mut self, mark: ChapterMark) -> Self {
        self.chapter_mark = mark;
        self
    }

    pub fn with_segment(mut self, segment: SegmentConfig) -> Self {
        self.segment = segment;
        self
    }
}
