//! Error types for chapter extraction.

use thiserror::Error;

/// Errors that can occur while locating chapters.
///
/// Apart from [`Error::Cancelled`], every variant is recoverable from the
/// point of view of [`Extractor`](crate::Extractor): it moves on to the next
/// strategy instead of giving up.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The navigation document could not be decoded.
    #[error("Invalid navigation document: {0}")]
    Parse(String),

    /// A content file or navigation document is missing from the archive.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A strategy produced fewer chapters than it needs to be trusted.
    #[error("Found {found} chapters, need at least {required}")]
    InsufficientData { found: usize, required: usize },

    /// The external converter failed or produced no output.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction cancelled")]
    Cancelled,
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl Error {
    /// Whether the orchestrator may fall back to another strategy.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
