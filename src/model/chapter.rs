/// A chapter extracted from an ebook.
///
/// Chapters are built once at the end of the pipeline and never mutated.
/// Indices are assigned densely in emission order, so they never mirror the
/// source's own numbering or play order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Position in the extracted sequence (0-based).
    pub index: usize,
    /// Title from the navigation label or inferred from the text. Never empty.
    pub title: String,
    /// Plain-text content, paragraphs separated by blank lines.
    pub content: String,
    /// Raw markup slice the content was projected from, when requested.
    pub html: Option<String>,
    pub word_count: usize,
    pub char_count: usize,
}

impl Chapter {
    /// Create a chapter, deriving word and character counts from `content`.
    ///
    /// An empty `title` is replaced with `Chapter {index + 1}`.
    pub fn new(index: usize, title: impl Into<String>, content: impl Into<String>) -> Self {
        let mut title = title.into();
        if title.trim().is_empty() {
            title = fallback_title(index + 1);
        }
        let content = content.into();
        Self {
            index,
            title,
            word_count: count_words(&content),
            char_count: content.chars().count(),
            content,
            html: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Returns true if the chapter has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The first `max_chars` characters of content as a preview.
    ///
    /// Prefers to cut at a space within the last 20 characters of the
    /// window, and appends `...` whenever the content was shortened.
    pub fn summary(&self, max_chars: usize) -> String {
        let Some((cut, _)) = self.content.char_indices().nth(max_chars) else {
            return self.content.clone();
        };
        let window = &self.content[..cut];
        let floor = max_chars.saturating_sub(20);

        let break_at = window
            .char_indices()
            .enumerate()
            .filter(|&(n, (_, c))| n > floor && c == ' ')
            .map(|(_, (i, _))| i)
            .last();

        match break_at {
            Some(i) => format!("{}...", &window[..i]),
            None => format!("{window}..."),
        }
    }
}

/// Positional title used when nothing better is known.
pub(crate) fn fallback_title(number: usize) -> String {
    format!("Chapter {number}")
}

/// Count words: maximal runs of characters other than space, tab, newline
/// and carriage return.
pub fn count_words(text: &str) -> usize {
    text.split([' ', '\t', '\n', '\r'])
        .filter(|word| !word.is_empty())
        .count()
}
