//! # chapterize
//!
//! Chapter boundary detection and title inference for ebooks.
//!
//! ## Features
//!
//! - Parse EPUB 2 NCX navigation documents into a tree and flatten it
//! - Slice content files between navigation anchors and project markup to text
//! - Tell real chapters from front and back matter
//! - Split converted plain text into chapters when there's no usable TOC
//! - Infer readable chapter titles from opening lines
//! - Fall back through calibre's `ebook-convert` for non-EPUB input
//!
//! ## Quick Start
//!
//! ```no_run
//! use chapterize::{EbookConvert, ExtractConfig, Extractor};
//!
//! let extractor = Extractor::new(ExtractConfig::default())
//!     .with_converter(EbookConvert::locate().unwrap());
//!
//! for chapter in extractor.extract("book.epub").unwrap() {
//!     println!("{}: {} words", chapter.title, chapter.word_count);
//! }
//! ```
//!
//! ## Plain Text
//!
//! Text that has already been converted can be segmented directly:
//!
//! ```
//! use chapterize::Extractor;
//!
//! let text = "I\n\nTHE ARRIVAL OF SPRING\n\nIt rained.\x0CII\n\nTHE DEPARTURE\n\nIt stopped.";
//! let chapters = Extractor::default().extract_from_text(text);
//!
//! assert_eq!(chapters.len(), 2);
//! assert_eq!(chapters[0].title, "Chapter I: The Arrival Of Spring");
//! assert_eq!(chapters[1].title, "Chapter II: The Departure");
//! ```

pub mod archive;
pub mod cancel;
pub mod classify;
pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod locate;
pub mod model;
pub mod ncx;
pub mod segment;
pub mod text;
pub mod title;

pub(crate) mod patterns;
pub(crate) mod util;

pub use archive::{Archive, MemoryArchive, ZipArchiveSource};
pub use cancel::CancellationToken;
pub use classify::{Verdict, classify_entry, filter_chapter_entries};
pub use config::{ExtractConfig, SegmentConfig};
pub use convert::{ChapterMark, ConvertOptions, Converter, EbookConvert};
pub use error::{Error, Result};
pub use extract::{Extractor, Strategy};
pub use locate::locate_content;
pub use model::{Chapter, ContentRef, FlatTocEntry, NavDocument, NavPoint, count_words};
pub use ncx::{flatten_ncx, parse_ncx, parse_ncx_bytes};
pub use segment::segment_text;
pub use text::{decode_entities, html_to_text};
pub use title::infer_title;
