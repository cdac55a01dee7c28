//! In-place XML edits that keep the original text intact.
//!
//! Appending a child is done by splicing text at the end of the root element
//! rather than re-serializing the document, so existing markup stays
//! byte-for-byte identical.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// Where the root element of a document ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RootEnd {
    /// Byte offset of the root's closing tag.
    Close(usize),
    /// The root is self-closing and spans `start..end`.
    SelfClosing { start: usize, end: usize, name: String },
}

/// Locate the end of the root element.
///
/// Returns `None` if the document has no root element.
pub(crate) fn find_root_end(xml: &str) -> Result<Option<RootEnd>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;

    loop {
        let before = position(&reader);
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(Some(RootEnd::Close(before)));
                }
            }
            Event::Empty(e) if depth == 0 => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                return Ok(Some(RootEnd::SelfClosing {
                    start: before,
                    end: position(&reader),
                    name,
                }));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Insert `child` as the last child of the root element.
///
/// Returns the new document and the new root end.
pub(crate) fn append_child(xml: &str, end: &RootEnd, child: &str) -> (String, RootEnd) {
    let mut out = String::with_capacity(xml.len() + child.len() + 16);
    match end {
        RootEnd::Close(at) => {
            out.push_str(&xml[..*at]);
            out.push_str(child);
            out.push_str(&xml[*at..]);
            (out, RootEnd::Close(at + child.len()))
        }
        RootEnd::SelfClosing { start, end, name } => {
            let open = xml[*start..*end].trim_end_matches("/>").trim_end();
            out.push_str(&xml[..*start]);
            out.push_str(open);
            out.push('>');
            out.push_str(child);
            let close_at = out.len();
            out.push_str("</");
            out.push_str(name);
            out.push('>');
            out.push_str(&xml[*end..]);
            (out, RootEnd::Close(close_at))
        }
    }
}

fn position(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_append_before_close() {
        let xml = "<?xml version=\"1.0\"?>\n<Root a=\"1\"><A/>\n</Root>\n";
        let end = find_root_end(xml).unwrap().unwrap();
        let (out, end) = append_child(xml, &end, "<B/>");

        assert_eq!(out, "<?xml version=\"1.0\"?>\n<Root a=\"1\"><A/>\n<B/></Root>\n");
        let (out, _) = append_child(&out, &end, "<C/>");
        assert_eq!(out, "<?xml version=\"1.0\"?>\n<Root a=\"1\"><A/>\n<B/><C/></Root>\n");
    }

    #[test]
    fn test_append_expands_self_closing_root() {
        let xml = r#"<Root xmlns="urn:x" />"#;
        let end = find_root_end(xml).unwrap().unwrap();
        let (out, end) = append_child(xml, &end, "<B/>");

        assert_eq!(out, r#"<Root xmlns="urn:x"><B/></Root>"#);
        assert_eq!(find_root_end(&out).unwrap(), Some(end));
    }

    #[test]
    fn test_nested_close_tags_ignored() {
        let xml = "<Root><A><B></B></A></Root>";
        assert_eq!(find_root_end(xml).unwrap(), Some(RootEnd::Close(20)));
    }

    #[test]
    fn test_no_root() {
        assert_eq!(find_root_end("").unwrap(), None);
        assert_eq!(find_root_end("<?xml version=\"1.0\"?>").unwrap(), None);
    }

    #[test]
    fn test_mismatched_tags_error() {
        assert!(find_root_end("<Root><A></Root>").is_err());
    }
}
