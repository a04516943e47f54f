//! Core data model for chapter extraction.
//!
//! This module contains:
//! - Navigation tree and its flattened projection
//! - Content references (file path + fragment)
//! - The extracted chapter value

mod chapter;
mod href;
mod toc;

pub use chapter::{Chapter, count_words};
pub(crate) use chapter::fallback_title;
pub use href::{ContentRef, normalize_path, resolve_relative};
pub(crate) use href::is_path_suffix;
pub use toc::{FlatTocEntry, NavDocument, NavPoint};
