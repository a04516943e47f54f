use percent_encoding::percent_decode_str;

/// A reference into the book: content file path plus optional fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRef {
    /// File path as written in the reference (not yet normalized).
    pub path: String,
    /// Fragment identifier, empty when absent.
    pub fragment: String,
}

impl ContentRef {
    /// Split an href on its first `#`.
    pub fn parse(href: &str) -> Self {
        let (path, fragment) = href.split_once('#').unwrap_or((href, ""));
        Self {
            path: path.to_string(),
            fragment: fragment.to_string(),
        }
    }

    pub fn has_fragment(&self) -> bool {
        !self.fragment.is_empty()
    }

    /// The path with `.`/`..` segments resolved and percent-escapes decoded.
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.path)
    }

    /// Whether both references point into the same content file.
    ///
    /// Tolerates archive prefix mismatches (`OEBPS/ch1.xhtml` vs
    /// `ch1.xhtml`). A reference with an empty path (`#note`) points into
    /// the current file.
    pub fn same_file(&self, other: &ContentRef) -> bool {
        if self.path.is_empty() || other.path.is_empty() {
            return true;
        }
        let a = self.normalized_path();
        let b = other.normalized_path();
        a == b || is_path_suffix(&a, &b) || is_path_suffix(&b, &a)
    }
}

/// Normalize an archive path: decode percent-escapes, unify separators and
/// resolve `.` and `..` segments. Leading `..` beyond the root are dropped.
pub fn normalize_path(path: &str) -> String {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let unified = decoded.replace('\\', "/");

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Join a relative href onto the directory of a base path.
pub fn resolve_relative(base_file: &str, href: &str) -> String {
    match base_file.rsplit_once('/') {
        Some((dir, _)) if !href.starts_with('/') => normalize_path(&format!("{dir}/{href}")),
        _ => normalize_path(href),
    }
}

/// Whether `path` ends with `suffix`.
///
/// Plain string suffix, so `chapter1.xhtml` also matches `xchapter1.xhtml`;
/// callers try exact matches first.
pub(crate) fn is_path_suffix(path: &str, suffix: &str) -> bool {
    !suffix.is_empty() && path.ends_with(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_first_hash() {
        let r = ContentRef::parse("text/ch1.xhtml#sec#2");
        assert_eq!(r.path, "text/ch1.xhtml");
        assert_eq!(r.fragment, "sec#2");
        assert!(r.has_fragment());

        let r = ContentRef::parse("ch1.xhtml");
        assert_eq!(r.path, "ch1.xhtml");
        assert!(!r.has_fragment());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("OEBPS/./text/../ch1.xhtml"), "OEBPS/ch1.xhtml");
        assert_eq!(normalize_path("../ch1.xhtml"), "ch1.xhtml");
        assert_eq!(normalize_path("Text\\ch%201.xhtml"), "Text/ch 1.xhtml");
        assert_eq!(normalize_path("/abs/ch1.xhtml"), "abs/ch1.xhtml");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative("OEBPS/toc.ncx", "text/ch1.xhtml"), "OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_relative("toc.ncx", "ch1.xhtml"), "ch1.xhtml");
        assert_eq!(resolve_relative("OEBPS/nav/toc.ncx", "../ch1.xhtml"), "OEBPS/ch1.xhtml");
    }

    #[test]
    fn test_same_file() {
        let a = ContentRef::parse("OEBPS/ch1.xhtml#a");
        assert!(a.same_file(&ContentRef::parse("ch1.xhtml#b")));
        assert!(a.same_file(&ContentRef::parse("./OEBPS/ch1.xhtml")));
        assert!(a.same_file(&ContentRef::parse("#c")));
        assert!(!a.same_file(&ContentRef::parse("ch2.xhtml#a")));
    }
}
