//! External ebook conversion.
//!
//! Books that aren't EPUB, or whose navigation is unusable, are run through
//! calibre's `ebook-convert`: once to an EPUB with a generated NCX, and if
//! that fails, to plain text with chapter marks.

use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};

/// Headings calibre treats as chapter starts unless told otherwise.
pub const DEFAULT_CHAPTER_XPATH: &str = "//h:h1|//h:h2|//h:h3";

/// Converter runs are killed after this long.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Keep at most this much of the converter's stderr in error messages.
const STDERR_TAIL: usize = 2048;

/// How chapter starts are marked in plain-text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterMark {
    /// Form feed before each chapter.
    #[default]
    PageBreak,
    /// A horizontal rule line.
    Rule,
    Both,
    None,
}

impl ChapterMark {
    /// The value passed to `--chapter-mark`.
    pub fn as_arg(self) -> &'static str {
        match self {
            ChapterMark::PageBreak => "pagebreak",
            ChapterMark::Rule => "rule",
            ChapterMark::Both => "both",
            ChapterMark::None => "none",
        }
    }
}

impl fmt::Display for ChapterMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

impl FromStr for ChapterMark {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pagebreak" => Ok(ChapterMark::PageBreak),
            "rule" => Ok(ChapterMark::Rule),
            "both" => Ok(ChapterMark::Both),
            "none" => Ok(ChapterMark::None),
            other => Err(format!(
                "unknown chapter mark '{other}' (expected pagebreak, rule, both or none)"
            )),
        }
    }
}

/// Options for EPUB conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// XPath selecting chapter headings; [`DEFAULT_CHAPTER_XPATH`] if unset.
    pub chapter_xpath: Option<String>,
}

impl ConvertOptions {
    pub fn chapter_xpath(&self) -> &str {
        self.chapter_xpath.as_deref().unwrap_or(DEFAULT_CHAPTER_XPATH)
    }
}

/// Something that can turn an ebook into an EPUB or plain text.
///
/// Implementations write their output to `dest` and must honour `cancel`
/// while they wait.
pub trait Converter {
    /// Convert to EPUB, generating a navigation document from headings.
    fn to_epub(
        &self,
        source: &Path,
        dest: &Path,
        options: &ConvertOptions,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Convert to plain text with chapter starts marked by `mark`.
    fn to_text(
        &self,
        source: &Path,
        dest: &Path,
        mark: ChapterMark,
        cancel: &CancellationToken,
    ) -> Result<()>;
}

/// calibre's `ebook-convert` command-line tool.
#[derive(Debug, Clone)]
pub struct EbookConvert {
    program: PathBuf,
    timeout: Duration,
}

impl EbookConvert {
    pub const PROGRAM: &'static str = "ebook-convert";

    /// Find `ebook-convert` on `PATH`.
    pub fn locate() -> Result<Self> {
        let program =
            which::which(Self::PROGRAM).map_err(|_| Error::ToolNotFound(Self::PROGRAM.into()))?;
        tracing::debug!(program = %program.display(), "found converter");
        Ok(Self::with_program(program))
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments for an EPUB conversion with forced TOC generation.
    pub fn epub_args(source: &Path, dest: &Path, options: &ConvertOptions) -> Vec<OsString> {
        vec![
            source.into(),
            dest.into(),
            "--chapter".into(),
            options.chapter_xpath().into(),
            "--use-auto-toc".into(),
            "--level1-toc".into(),
            "//h:h1".into(),
            "--level2-toc".into(),
            "//h:h2".into(),
        ]
    }

    /// Arguments for a plain-text conversion.
    pub fn text_args(source: &Path, dest: &Path, mark: ChapterMark) -> Vec<OsString> {
        vec![
            source.into(),
            dest.into(),
            "--chapter-mark".into(),
            mark.as_arg().into(),
        ]
    }

    fn run(&self, args: &[OsString], dest: &Path, cancel: &CancellationToken) -> Result<()> {
        cancel.check()?;

        // stderr goes to a file so a chatty converter can't fill the pipe
        let mut stderr = tempfile::tempfile()?;
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr.try_clone()?))
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    Error::ToolNotFound(self.program.display().to_string())
                }
                _ => Error::Io(e),
            })?;

        let started = Instant::now();
        tracing::debug!(program = %self.program.display(), ?args, "converter started");

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if cancel.is_cancelled() {
                stop(&mut child);
                return Err(Error::Cancelled);
            }
            if started.elapsed() >= self.timeout {
                stop(&mut child);
                return Err(Error::Conversion(format!(
                    "{} timed out after {:?}",
                    self.program.display(),
                    self.timeout
                )));
            }
            thread::sleep(POLL_INTERVAL);
        };

        tracing::debug!(%status, elapsed = ?started.elapsed(), "converter finished");

        if !status.success() {
            return Err(Error::Conversion(format!(
                "{} exited with {status}: {}",
                self.program.display(),
                stderr_tail(&mut stderr)
            )));
        }
        if !dest.is_file() {
            return Err(Error::Conversion(format!(
                "{} produced no output at {}",
                self.program.display(),
                dest.display()
            )));
        }
        Ok(())
    }
}

impl Converter for EbookConvert {
    fn to_epub(
        &self,
        source: &Path,
        dest: &Path,
        options: &ConvertOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.run(&Self::epub_args(source, dest, options), dest, cancel)
    }

    fn to_text(
        &self,
        source: &Path,
        dest: &Path,
        mark: ChapterMark,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.run(&Self::text_args(source, dest, mark), dest, cancel)
    }
}

fn stop(child: &mut Child) {
    // Already-exited children make kill fail; either way reap it
    let _ = child.kill();
    let _ = child.wait();
}

fn stderr_tail(file: &mut File) -> String {
    let mut buf = Vec::new();
    if file.seek(SeekFrom::Start(0)).is_err() || file.read_to_end(&mut buf).is_err() {
        return String::new();
    }
    let text = String::from_utf8_lossy(&buf);
    let text = text.trim();
    let cut = text.len().saturating_sub(STDERR_TAIL);
    let start = (cut..=text.len())
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(text.len());
    text[start..].to_string()
}
