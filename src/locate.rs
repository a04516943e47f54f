//! Fragment-bounded slicing of content documents.
//!
//! A navigation entry points at `file.xhtml#anchor`. Several entries often
//! share one file, so a chapter's markup runs from its own anchor up to the
//! next entry's anchor. This is string search, not DOM traversal: the
//! boundary is the `<` of the first element carrying the anchor as its `id`
//! or `name` attribute.

use memchr::{memmem, memrchr};

use crate::archive::Archive;
use crate::error::Result;
use crate::model::ContentRef;
use crate::util::decode_document;

/// Byte range of a chapter within its content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: usize,
    pub end: usize,
    /// Whether the start fragment was found. `false` means the slice fell
    /// back to the whole file.
    pub anchored: bool,
}

/// Extract the markup between `start`'s fragment and `next`'s fragment.
///
/// - No start fragment, or a fragment that can't be found: the whole file.
/// - `next` in the same file with a fragment found after the start: the
///   slice ends there; otherwise it runs to end of file.
pub fn locate_content<'a>(html: &'a str, start: &ContentRef, next: Option<&ContentRef>) -> &'a str {
    let slice = locate_slice(html, start, next);
    &html[slice.start..slice.end]
}

/// Like [`locate_content`], but returns the byte range.
pub fn locate_slice(html: &str, start: &ContentRef, next: Option<&ContentRef>) -> Slice {
    let whole = Slice {
        start: 0,
        end: html.len(),
        anchored: false,
    };
    if !start.has_fragment() {
        return whole;
    }
    let Some(begin) = find_anchor(html, &start.fragment, 0) else {
        return whole;
    };

    let end = next
        .filter(|next| next.has_fragment() && start.same_file(next))
        .and_then(|next| find_anchor(html, &next.fragment, begin + 1))
        .unwrap_or(html.len());

    Slice {
        start: begin,
        end,
        anchored: true,
    }
}

/// Read a content file out of an archive and slice it.
///
/// `base` is the archive path of the navigation document; references are
/// resolved relative to it first, then by suffix. Fails with
/// [`Error::NotFound`](crate::Error::NotFound) when the file is missing.
pub fn read_chapter_markup<A: Archive + ?Sized>(
    archive: &mut A,
    base: &str,
    start: &ContentRef,
    next: Option<&ContentRef>,
) -> Result<String> {
    let html = read_content_file(archive, base, start)?;
    Ok(locate_content(&html, start, next).to_string())
}

/// Read and decode the content file a reference points at.
pub fn read_content_file<A: Archive + ?Sized>(
    archive: &mut A,
    base: &str,
    reference: &ContentRef,
) -> Result<String> {
    let relative = crate::model::resolve_relative(base, &reference.path);
    let (_, bytes) = match archive.read_resolved(&relative) {
        Ok(found) => found,
        Err(_) => archive.read_resolved(&reference.path)?,
    };
    Ok(decode_document(&bytes).into_owned())
}

/// Offset of the element carrying `id`/`name` = `fragment`, at or after `from`.
///
/// The returned offset is the element's opening `<`. Attributes must be
/// preceded by whitespace so `data-id="x"` doesn't count.
pub fn find_anchor(html: &str, fragment: &str, from: usize) -> Option<usize> {
    let haystack = html.as_bytes().get(from..)?;
    let patterns = [
        format!("id=\"{fragment}\""),
        format!("id='{fragment}'"),
        format!("name=\"{fragment}\""),
        format!("name='{fragment}'"),
    ];

    patterns
        .iter()
        .filter_map(|pattern| {
            memmem::find_iter(haystack, pattern.as_bytes())
                .find(|&pos| attribute_boundary(haystack, pos))
        })
        .min()
        .map(|pos| {
            let attr = from + pos;
            // Back up to the tag that owns the attribute
            memrchr(b'<', &html.as_bytes()[from..attr])
                .map(|lt| from + lt)
                .unwrap_or(attr)
        })
}

fn attribute_boundary(haystack: &[u8], pos: usize) -> bool {
    pos.checked_sub(1)
        .and_then(|i| haystack.get(i))
        .is_some_and(|b| b.is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;
    use crate::error::Error;

    const DOC: &str = r#"<html><body>
<h2 id="ch1">One</h2><p>First.</p>
<h2 id='ch2'>Two</h2><p>Second.</p>
<a name="ch3"></a><h2>Three</h2><p>Third.</p>
</body></html>"#;

    fn r(href: &str) -> ContentRef {
        ContentRef::parse(href)
    }

    #[test]
    fn test_no_fragment_returns_whole_file() {
        assert_eq!(locate_content(DOC, &r("c.xhtml"), None), DOC);
        assert_eq!(locate_content(DOC, &r("c.xhtml"), Some(&r("c.xhtml#ch2"))), DOC);
    }

    #[test]
    fn test_missing_fragment_returns_whole_file() {
        let slice = locate_slice(DOC, &r("c.xhtml#nope"), Some(&r("c.xhtml#ch2")));
        assert_eq!((slice.start, slice.end, slice.anchored), (0, DOC.len(), false));
    }

    #[test]
    fn test_bounded_by_next_fragment() {
        let text = locate_content(DOC, &r("c.xhtml#ch1"), Some(&r("c.xhtml#ch2")));
        assert!(text.starts_with(r#"<h2 id="ch1">"#));
        assert!(text.contains("First."));
        assert!(!text.contains("Two"));
    }

    #[test]
    fn test_single_quoted_and_name_anchors() {
        let text = locate_content(DOC, &r("c.xhtml#ch2"), Some(&r("c.xhtml#ch3")));
        assert!(text.starts_with("<h2 id='ch2'>"));
        assert!(text.contains("Second."));
        assert!(!text.contains("Third."));

        let text = locate_content(DOC, &r("c.xhtml#ch3"), None);
        assert!(text.starts_with(r#"<a name="ch3">"#));
        assert!(text.contains("Third."));
    }

    #[test]
    fn test_next_in_other_file_runs_to_end() {
        let text = locate_content(DOC, &r("c.xhtml#ch2"), Some(&r("d.xhtml#ch3")));
        assert!(text.contains("Third."));
        assert!(text.ends_with("</html>"));
    }

    #[test]
    fn test_next_without_fragment_runs_to_end() {
        let text = locate_content(DOC, &r("c.xhtml#ch2"), Some(&r("c.xhtml")));
        assert!(text.contains("Third."));
    }

    #[test]
    fn test_end_anchor_before_start_is_ignored() {
        let text = locate_content(DOC, &r("c.xhtml#ch2"), Some(&r("c.xhtml#ch1")));
        assert!(text.starts_with("<h2 id='ch2'>"));
        assert!(text.ends_with("</html>"));
    }

    #[test]
    fn test_consecutive_slices_do_not_overlap() {
        let a = locate_slice(DOC, &r("c.xhtml#ch1"), Some(&r("c.xhtml#ch2")));
        let b = locate_slice(DOC, &r("c.xhtml#ch2"), Some(&r("c.xhtml#ch3")));
        let c = locate_slice(DOC, &r("c.xhtml#ch3"), None);
        assert_eq!(a.end, b.start);
        assert_eq!(b.end, c.start);
        assert_eq!(c.end, DOC.len());
    }

    #[test]
    fn test_data_attributes_are_not_anchors() {
        let html = r#"<p data-id="x">decoy</p><p id="x">real</p>"#;
        let start = find_anchor(html, "x", 0).unwrap();
        assert!(html[start..].starts_with(r#"<p id="x">"#));
    }

    #[test]
    fn test_earliest_pattern_wins() {
        let html = r#"<a name="x"></a><p id="x">later</p>"#;
        assert_eq!(find_anchor(html, "x", 0), Some(0));
    }

    #[test]
    fn test_read_chapter_markup_relative_to_ncx() {
        let mut archive = MemoryArchive::new()
            .with_entry("OEBPS/toc.ncx", "<ncx/>")
            .with_entry("OEBPS/text/ch1.xhtml", DOC);

        let html = read_chapter_markup(
            &mut archive,
            "OEBPS/toc.ncx",
            &r("text/ch1.xhtml#ch2"),
            Some(&r("text/ch1.xhtml#ch3")),
        )
        .unwrap();
        assert!(html.contains("Second."));
        assert!(!html.contains("Third."));
    }

    #[test]
    fn test_read_chapter_markup_missing_file() {
        let mut archive = MemoryArchive::new().with_entry("OEBPS/toc.ncx", "<ncx/>");
        let err = read_chapter_markup(&mut archive, "OEBPS/toc.ncx", &r("gone.xhtml"), None)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
