//! Strategy orchestration.
//!
//! [`Extractor`] tries each [`Strategy`] in [`STRATEGIES`] order and returns
//! the first result that clears its confidence bar:
//!
//! 1. [`Strategy::OriginalNcx`]: the book's own NCX, filtered through the
//!    entry classifier. EPUB input only.
//! 2. [`Strategy::ConvertedNcx`]: the NCX of a converter-generated EPUB,
//!    every entry taken as a chapter.
//! 3. [`Strategy::PlainText`]: a converter-generated text rendering, split
//!    by the segmenter.
//!
//! Recoverable failures move on to the next strategy; cancellation stops
//! the pipeline.

use std::io::{Read, Seek};
use std::path::Path;

use crate::archive::{Archive, ZipArchiveSource};
use crate::cancel::CancellationToken;
use crate::classify::filter_chapter_entries;
use crate::config::ExtractConfig;
use crate::convert::{ConvertOptions, Converter, EbookConvert};
use crate::error::{Error, Result};
use crate::locate::read_chapter_markup;
use crate::model::{Chapter, ContentRef, FlatTocEntry, NavDocument, count_words, fallback_title};
use crate::ncx::parse_ncx_bytes;
use crate::segment::segment_text;
use crate::text::{decode_entities, html_to_text};
use crate::util::decode_text;

/// A way of finding chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    OriginalNcx,
    ConvertedNcx,
    PlainText,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::OriginalNcx => "original-ncx",
            Strategy::ConvertedNcx => "converted-ncx",
            Strategy::PlainText => "plain-text",
        }
    }

    /// Whether the strategy needs an external converter.
    pub fn needs_converter(self) -> bool {
        !matches!(self, Strategy::OriginalNcx)
    }
}

/// Strategies in priority order.
pub const STRATEGIES: &[Strategy] = &[
    Strategy::OriginalNcx,
    Strategy::ConvertedNcx,
    Strategy::PlainText,
];

/// How a navigation document is turned into chapters.
#[derive(Debug, Clone, Copy)]
struct NcxPass {
    /// Run entries through the classifier first.
    classify: bool,
    /// End each chapter at the next entry's anchor.
    bounded: bool,
    min_words: usize,
    required: usize,
}

/// Chapter extraction pipeline.
pub struct Extractor {
    config: ExtractConfig,
    converter: Option<Box<dyn Converter>>,
    cancel: CancellationToken,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

impl Extractor {
    /// Create an extractor without a converter.
    ///
    /// Without one only EPUB input is handled, through its own NCX.
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            converter: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }

    /// Extract chapters from an ebook file.
    ///
    /// Returns the first confident strategy's chapters, or the last
    /// strategy error. Fails with [`Error::ToolNotFound`] when no strategy
    /// applies (non-EPUB input without a converter).
    pub fn extract(&self, path: impl AsRef<Path>) -> Result<Vec<Chapter>> {
        let path = path.as_ref();
        let _span = tracing::info_span!("extract", path = %path.display()).entered();

        let is_epub = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("epub"));
        let scratch = match self.converter {
            Some(_) => Some(tempfile::Builder::new().prefix("chapterize-").tempdir()?),
            None => None,
        };

        let mut last_error = None;
        for &strategy in STRATEGIES {
            self.cancel.check()?;

            let result = match (strategy, &self.converter, &scratch) {
                (Strategy::OriginalNcx, _, _) if is_epub => self.original_ncx(path),
                (Strategy::ConvertedNcx, Some(converter), Some(dir)) => {
                    self.converted_ncx(converter.as_ref(), path, &dir.path().join("book.epub"))
                }
                (Strategy::PlainText, Some(converter), Some(dir)) => {
                    self.plain_text(converter.as_ref(), path, &dir.path().join("book.txt"))
                }
                _ => {
                    tracing::debug!(strategy = strategy.name(), "strategy not applicable");
                    continue;
                }
            };

            match result {
                Ok(chapters) => {
                    tracing::info!(
                        strategy = strategy.name(),
                        chapters = chapters.len(),
                        "chapters extracted"
                    );
                    return Ok(chapters);
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(strategy = strategy.name(), error = %e, "strategy failed");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::ToolNotFound(EbookConvert::PROGRAM.into())))
    }

    /// Extract chapters from an EPUB's own NCX.
    pub fn extract_from_epub<R: Read + Seek>(&self, reader: R) -> Result<Vec<Chapter>> {
        let mut archive = ZipArchiveSource::new(reader)?;
        self.extract_from_archive(&mut archive)
    }

    /// Extract chapters from an archive's own NCX.
    pub fn extract_from_archive<A: Archive + ?Sized>(
        &self,
        archive: &mut A,
    ) -> Result<Vec<Chapter>> {
        let pass = NcxPass {
            classify: true,
            bounded: true,
            min_words: self.config.min_chapter_words,
            required: self.config.min_nav_chapters,
        };
        self.chapters_from_ncx(archive, pass)
    }

    /// Segment already-converted plain text. Never fails; empty input gives
    /// no chapters.
    pub fn extract_from_text(&self, text: &str) -> Vec<Chapter> {
        segment_text(text, &self.config.segment)
    }

    /// Like [`extract_from_text`](Self::extract_from_text), decoding raw
    /// bytes first: UTF-8, falling back to Windows-1252.
    pub fn extract_from_text_bytes(&self, bytes: &[u8]) -> Vec<Chapter> {
        self.extract_from_text(&decode_text(bytes, None))
    }

    /// The flattened navigation entries of an EPUB file.
    pub fn table_of_contents(&self, path: impl AsRef<Path>) -> Result<Vec<FlatTocEntry>> {
        let mut archive = ZipArchiveSource::open(path)?;
        let (_, nav) = read_nav_document(&mut archive)?;
        Ok(nav.flatten())
    }

    fn original_ncx(&self, path: &Path) -> Result<Vec<Chapter>> {
        let mut archive = ZipArchiveSource::open(path)?;
        self.extract_from_archive(&mut archive)
    }

    fn converted_ncx(
        &self,
        converter: &dyn Converter,
        source: &Path,
        dest: &Path,
    ) -> Result<Vec<Chapter>> {
        let options = ConvertOptions {
            chapter_xpath: self.config.chapter_xpath.clone(),
        };
        converter.to_epub(source, dest, &options, &self.cancel)?;
        self.cancel.check()?;

        let mut archive = ZipArchiveSource::open(dest)?;
        let pass = NcxPass {
            classify: false,
            bounded: false,
            min_words: 0,
            required: 1,
        };
        self.chapters_from_ncx(&mut archive, pass)
    }

    fn plain_text(
        &self,
        converter: &dyn Converter,
        source: &Path,
        dest: &Path,
    ) -> Result<Vec<Chapter>> {
        converter.to_text(source, dest, self.config.chapter_mark, &self.cancel)?;
        self.cancel.check()?;

        let bytes = std::fs::read(dest)?;
        let chapters = self.extract_from_text_bytes(&bytes);
        if chapters.is_empty() {
            return Err(Error::InsufficientData {
                found: 0,
                required: 1,
            });
        }
        Ok(chapters)
    }

    fn chapters_from_ncx<A: Archive + ?Sized>(
        &self,
        archive: &mut A,
        pass: NcxPass,
    ) -> Result<Vec<Chapter>> {
        let (ncx_name, nav) = read_nav_document(archive)?;
        let mut entries = nav.flatten();
        let listed = entries.len();
        if pass.classify {
            entries = filter_chapter_entries(&entries);
        }
        tracing::debug!(ncx = %ncx_name, listed, kept = entries.len(), "navigation entries");

        let refs: Vec<ContentRef> = entries.iter().map(|e| ContentRef::parse(&e.href)).collect();
        let mut chapters = Vec::new();

        for (position, (entry, start)) in entries.iter().zip(&refs).enumerate() {
            self.cancel.check()?;

            let next = if pass.bounded {
                refs.get(position + 1)
            } else {
                None
            };
            let markup = match read_chapter_markup(archive, &ncx_name, start, next) {
                Ok(markup) => markup,
                Err(e) => {
                    tracing::debug!(href = %entry.href, error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let content = decode_entities(&html_to_text(&markup)).into_owned();
            let words = count_words(&content);
            if words < pass.min_words {
                tracing::debug!(title = %entry.title, words, "skipping short entry");
                continue;
            }

            let title = if entry.title.is_empty() {
                fallback_title(position + 1)
            } else {
                entry.title.clone()
            };
            let mut chapter = Chapter::new(chapters.len(), title, content);
            if self.config.keep_html {
                chapter = chapter.with_html(markup);
            }
            chapters.push(chapter);
        }

        if chapters.len() < pass.required {
            return Err(Error::InsufficientData {
                found: chapters.len(),
                required: pass.required,
            });
        }
        Ok(chapters)
    }
}

/// Find, read and parse an archive's NCX. Returns its entry name too.
fn read_nav_document<A: Archive + ?Sized>(archive: &mut A) -> Result<(String, NavDocument)> {
    let name = archive
        .find_by_suffix(".ncx")
        .map(str::to_string)
        .ok_or_else(|| Error::NotFound("NCX navigation document".into()))?;
    let bytes = archive.read(&name)?;
    let nav = parse_ncx_bytes(&bytes)?;
    Ok((name, nav))
}
