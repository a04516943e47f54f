//! NCX navigation document parsing.
//!
//! The NCX (`application/x-dtbncx+xml`) is the EPUB 2 table of contents and
//! is still shipped by most EPUB 3 books. Only the parts needed to locate
//! chapters are read: `docTitle`, and for each `navPoint` its label, content
//! `src`, `playOrder` and nested points.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::model::{FlatTocEntry, NavDocument, NavPoint};
use crate::util::{decode_document, local_name, resolve_entity, unescape};

/// Parse NCX bytes, decoding them according to their declared encoding.
pub fn parse_ncx_bytes(bytes: &[u8]) -> Result<NavDocument> {
    parse_ncx(&decode_document(bytes))
}

/// Parse and flatten in one step.
pub fn flatten_ncx(content: &str) -> Result<Vec<FlatTocEntry>> {
    Ok(parse_ncx(content)?.flatten())
}

/// Parse an NCX document into a navigation tree.
///
/// Fails with [`Error::Parse`] when the XML is malformed or the root element
/// is not `ncx`.
pub fn parse_ncx(content: &str) -> Result<NavDocument> {
    // Untrimmed so whitespace around entity references survives; labels
    // are trimmed on flatten.
    let mut reader = Reader::from_str(content);

    let mut state = ParseState::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::Parse(format!("at byte {}: {e}", reader.buffer_position())))?;

        match event {
            Event::Start(e) => {
                state.open(local_name(e.name().as_ref()))?;
                match local_name(e.name().as_ref()) {
                    b"navPoint" => state.stack.push(NavPointState::new(play_order(&e))),
                    b"docTitle" => state.in_doc_title = true,
                    b"navLabel" => state.in_label = true,
                    b"text" => {
                        state.target = if state.in_label {
                            TextTarget::Label
                        } else if state.in_doc_title {
                            TextTarget::DocTitle
                        } else {
                            TextTarget::None
                        };
                    }
                    b"content" => state.set_src(&e),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                state.check_root(local_name(e.name().as_ref()))?;
                if local_name(e.name().as_ref()) == b"content" {
                    state.set_src(&e);
                }
            }
            Event::Text(e) => state.push_text(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => state.push_text(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                match resolve_entity(&entity) {
                    Some(resolved) => state.push_text(&resolved),
                    None => state.push_text(&format!("&{entity};")),
                }
            }
            Event::End(e) => {
                state.depth = state.depth.saturating_sub(1);
                match local_name(e.name().as_ref()) {
                    b"text" => state.target = TextTarget::None,
                    b"navLabel" => state.in_label = false,
                    b"docTitle" => state.in_doc_title = false,
                    b"navPoint" => state.close_nav_point(),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    state.finish()
}

#[derive(Clone, Copy, PartialEq)]
enum TextTarget {
    None,
    DocTitle,
    Label,
}

struct NavPointState {
    children: Vec<NavPoint>,
    text: Option<String>,
    src: Option<String>,
    play_order: Option<usize>,
}

impl NavPointState {
    fn new(play_order: Option<usize>) -> Self {
        Self {
            children: Vec::new(),
            text: None,
            src: None,
            play_order,
        }
    }
}

struct ParseState {
    /// Bottom entry collects the root nav points.
    stack: Vec<NavPointState>,
    doc_title: Option<String>,
    in_doc_title: bool,
    in_label: bool,
    target: TextTarget,
    seen_root: bool,
    depth: usize,
}

impl ParseState {
    fn new() -> Self {
        Self {
            stack: vec![NavPointState::new(None)],
            doc_title: None,
            in_doc_title: false,
            in_label: false,
            target: TextTarget::None,
            seen_root: false,
            depth: 0,
        }
    }

    fn check_root(&mut self, local: &[u8]) -> Result<()> {
        if self.seen_root {
            return Ok(());
        }
        if local != b"ncx" {
            return Err(Error::Parse(format!(
                "expected <ncx> root, found <{}>",
                String::from_utf8_lossy(local)
            )));
        }
        self.seen_root = true;
        Ok(())
    }

    fn open(&mut self, local: &[u8]) -> Result<()> {
        self.check_root(local)?;
        self.depth += 1;
        Ok(())
    }

    fn set_src(&mut self, e: &BytesStart<'_>) {
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"src"
                && let Some(state) = self.stack.last_mut()
            {
                state.src = Some(unescape(&String::from_utf8_lossy(&attr.value)).into_owned());
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        let slot = match self.target {
            TextTarget::None => return,
            TextTarget::DocTitle => &mut self.doc_title,
            TextTarget::Label => match self.stack.last_mut() {
                Some(state) => &mut state.text,
                None => return,
            },
        };
        match slot {
            Some(existing) => existing.push_str(text),
            None => *slot = Some(text.to_string()),
        }
    }

    fn close_nav_point(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(state) = self.stack.pop() else {
            return;
        };
        let Some(parent) = self.stack.last_mut() else {
            return;
        };

        if state.text.is_none() && state.src.is_none() {
            // Nothing to point at; keep the subtree reachable
            parent.children.extend(state.children);
        } else {
            let mut point = NavPoint::new(
                state.text.unwrap_or_default(),
                state.src.unwrap_or_default(),
            );
            point.children = state.children;
            point.play_order = state.play_order;
            parent.children.push(point);
        }
    }

    fn finish(mut self) -> Result<NavDocument> {
        if !self.seen_root {
            return Err(Error::Parse("document has no root element".into()));
        }
        if self.depth > 0 || self.stack.len() != 1 {
            return Err(Error::Parse("unexpected end of document".into()));
        }
        Ok(NavDocument {
            title: self.doc_title.map(|t| t.trim().to_string()),
            nav_points: self.stack.pop().map(|s| s.children).unwrap_or_default(),
        })
    }
}

fn play_order(e: &BytesStart<'_>) -> Option<usize> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"playOrder")
        .and_then(|attr| std::str::from_utf8(&attr.value).ok()?.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ncx_flat() {
        let ncx = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <docTitle><text>A Test Book</text></docTitle>
  <navMap>
    <navPoint id="np1" playOrder="1">
      <navLabel><text>Chapter 1</text></navLabel>
      <content src="ch1.xhtml"/>
    </navPoint>
    <navPoint id="np2" playOrder="2">
      <navLabel><text>Chapter 2</text></navLabel>
      <content src="ch2.xhtml"/>
    </navPoint>
  </navMap>
</ncx>"#;

        let doc = parse_ncx(ncx).unwrap();

        assert_eq!(doc.title.as_deref(), Some("A Test Book"));
        assert_eq!(doc.nav_points.len(), 2);
        assert_eq!(doc.nav_points[0].label, "Chapter 1");
        assert_eq!(doc.nav_points[0].href, "ch1.xhtml");
        assert_eq!(doc.nav_points[0].play_order, Some(1));
        assert_eq!(doc.nav_points[1].label, "Chapter 2");
        assert_eq!(doc.nav_points[1].play_order, Some(2));
    }

    #[test]
    fn test_parse_ncx_nested() {
        let ncx = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <navMap>
    <navPoint id="part1" playOrder="1">
      <navLabel><text>Part I</text></navLabel>
      <content src="part1.xhtml"/>
      <navPoint id="ch1" playOrder="2">
        <navLabel><text>Chapter 1</text></navLabel>
        <content src="ch1.xhtml"/>
      </navPoint>
      <navPoint id="ch2" playOrder="3">
        <navLabel><text>Chapter 2</text></navLabel>
        <content src="ch1.xhtml#ch2"/>
      </navPoint>
    </navPoint>
  </navMap>
</ncx>"#;

        let doc = parse_ncx(ncx).unwrap();

        assert_eq!(doc.nav_points.len(), 1);
        assert_eq!(doc.nav_points[0].label, "Part I");
        assert_eq!(doc.nav_points[0].children.len(), 2);
        assert_eq!(doc.nav_points[0].children[1].href, "ch1.xhtml#ch2");

        let flat = doc.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].level, 1);
        assert_eq!(flat[1].level, 2);
        assert_eq!(flat[2].level, 2);
    }

    #[test]
    fn test_parse_ncx_prefixed_and_entities() {
        let ncx = r#"<ncx:ncx xmlns:ncx="http://www.daisy.org/z3986/2005/ncx/">
  <ncx:navMap>
    <ncx:navPoint playOrder=" 7 ">
      <ncx:navLabel><ncx:text>War &amp; Peace &#8212; Book One</ncx:text></ncx:navLabel>
      <ncx:content src="text/ch%201.xhtml#a&amp;b"></ncx:content>
    </ncx:navPoint>
  </ncx:navMap>
</ncx:ncx>"#;

        let doc = parse_ncx(ncx).unwrap();
        let point = &doc.nav_points[0];
        assert_eq!(point.label, "War & Peace \u{2014} Book One");
        assert_eq!(point.href, "text/ch%201.xhtml#a&b");
        assert_eq!(point.play_order, Some(7));
    }

    #[test]
    fn test_unknown_entity_kept_verbatim() {
        let ncx = r#"<ncx><navMap><navPoint>
            <navLabel><text>Caf&eacute; &amp; Bar</text></navLabel><content src="1.xhtml"/>
        </navPoint></navMap></ncx>"#;
        let doc = parse_ncx(ncx).unwrap();
        assert_eq!(doc.nav_points[0].label, "Caf&eacute; & Bar");
    }

    #[test]
    fn test_bad_play_order_is_none() {
        let ncx = r#"<ncx><navMap><navPoint playOrder="first">
            <navLabel><text>One</text></navLabel><content src="1.xhtml"/>
        </navPoint></navMap></ncx>"#;
        let doc = parse_ncx(ncx).unwrap();
        assert_eq!(doc.nav_points[0].play_order, None);
    }

    #[test]
    fn test_empty_nav_point_hoists_children() {
        let ncx = r#"<ncx><navMap>
  <navPoint>
    <navPoint><navLabel><text>Inner</text></navLabel><content src="in.xhtml"/></navPoint>
  </navPoint>
</navMap></ncx>"#;

        let doc = parse_ncx(ncx).unwrap();
        assert_eq!(doc.nav_points.len(), 1);
        assert_eq!(doc.nav_points[0].label, "Inner");
    }

    #[test]
    fn test_label_without_src_is_kept() {
        let ncx = r#"<ncx><navMap><navPoint><navLabel><text>Orphan</text></navLabel></navPoint></navMap></ncx>"#;
        let doc = parse_ncx(ncx).unwrap();
        assert_eq!(doc.nav_points[0].label, "Orphan");
        assert_eq!(doc.nav_points[0].href, "");
    }

    #[test]
    fn test_wrong_root_is_parse_error() {
        let err = parse_ncx("<html><body/></html>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_mismatched_tags_is_parse_error() {
        let err = parse_ncx("<ncx><navMap><navPoint></navMap></ncx>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_truncated_document_is_parse_error() {
        let err = parse_ncx("<ncx><navMap><navPoint>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(matches!(parse_ncx("").unwrap_err(), Error::Parse(_)));
    }

    #[test]
    fn test_parse_ncx_bytes_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(
            b"<ncx><navMap><navPoint><navLabel><text>One</text></navLabel><content src=\"1.xhtml\"/></navPoint></navMap></ncx>",
        );
        let doc = parse_ncx_bytes(&bytes).unwrap();
        assert_eq!(doc.nav_points[0].label, "One");
    }

    #[test]
    fn test_flatten_ncx() {
        let flat = flatten_ncx(
            r#"<ncx><navMap><navPoint><navLabel><text>  One  </text></navLabel><content src="1.xhtml"/></navPoint></navMap></ncx>"#,
        )
        .unwrap();
        assert_eq!(flat[0].title, "One");
        assert_eq!(flat[0].level, 1);
    }
}
