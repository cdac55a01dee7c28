//! Relationship manifest parsing and part-name helpers.
//!
//! A relationship manifest (`*.rels`) lists cross-references from one part to
//! others:
//!
//! ```xml
//! <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
//!   <Relationship Id="rId1" Type="…/styles" Target="styles.xml"/>
//! </Relationships>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Namespace of relationship manifests.
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Error while parsing a relationship manifest.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelsError {
    /// XML parsing error.
    #[error("XML parse error")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// The document has no `<Relationships>` root.
    #[error("missing <Relationships> root element")]
    MissingRoot,

    /// Elements are not closed before the end of input.
    #[error("unbalanced elements at end of input")]
    Unbalanced,

    /// A `<Relationship>` element lacks a required attribute.
    #[error("relationship is missing the {0} attribute")]
    MissingAttribute(&'static str),
}

/// One entry of a relationship manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Identifier referenced from the source part (e.g., "rId7").
    pub id: String,
    /// Relationship type URI.
    pub rel_type: String,
    /// Target, relative to the source part's directory unless external.
    pub target: String,
    /// `External` for hyperlinks and other out-of-package targets.
    pub target_mode: Option<String>,
}

impl Relationship {
    /// Returns `true` if the target points outside the package.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.target_mode.as_deref() == Some("External")
    }
}

/// Parse all `<Relationship>` entries of a manifest, in document order.
///
/// # Errors
///
/// Returns an error if the XML is malformed, the root is missing, or an entry
/// lacks `Id`, `Type` or `Target`.
pub fn parse_relationships(xml: &str) -> Result<Vec<Relationship>, RelsError> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 0 && e.local_name().as_ref() == b"Relationships" {
                    seen_root = true;
                } else if e.local_name().as_ref() == b"Relationship" {
                    entries.push(relationship_from(&e)?);
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 && e.local_name().as_ref() == b"Relationships" {
                    seen_root = true;
                } else if e.local_name().as_ref() == b"Relationship" {
                    entries.push(relationship_from(&e)?);
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(RelsError::Unbalanced);
    }
    if !seen_root {
        return Err(RelsError::MissingRoot);
    }
    Ok(entries)
}

fn relationship_from(e: &BytesStart<'_>) -> Result<Relationship, RelsError> {
    let mut id = None;
    let mut rel_type = None;
    let mut target = None;
    let mut target_mode = None;

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        match attr.key.as_ref() {
            b"Id" => id = Some(value),
            b"Type" => rel_type = Some(value),
            b"Target" => target = Some(value),
            b"TargetMode" => target_mode = Some(value),
            _ => {}
        }
    }

    Ok(Relationship {
        id: id.ok_or(RelsError::MissingAttribute("Id"))?,
        rel_type: rel_type.ok_or(RelsError::MissingAttribute("Type"))?,
        target: target.ok_or(RelsError::MissingAttribute("Target"))?,
        target_mode,
    })
}

/// Directory portion of a part name (`word/document.xml` → `word`).
#[must_use]
pub fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Relationship manifest name for a part.
///
/// `word/document.xml` → `word/_rels/document.xml.rels`
#[must_use]
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against its source part.
///
/// Absolute targets (leading `/`) are package-rooted; relative ones are joined
/// to the source part's directory with `.` and `..` segments folded.
#[must_use]
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(rooted) = target.strip_prefix('/') {
        return rooted.to_owned();
    }

    let mut segments: Vec<&str> = part_dir(source_part)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    for segment in target.split('/') {
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

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/></Relationships>"#;

    #[test]
    fn test_parse_relationships() {
        let rels = parse_relationships(DOCUMENT_RELS).unwrap();

        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].id, "rId1");
        assert_eq!(rels[0].target, "styles.xml");
        assert!(!rels[0].is_external());
        assert_eq!(rels[1].target, "https://example.com/?a=1&b=2");
        assert!(rels[1].is_external());
    }

    #[test]
    fn test_parse_empty_root() {
        let xml = format!(r#"<Relationships xmlns="{RELATIONSHIPS_NS}"/>"#);
        assert!(parse_relationships(&xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_missing_root() {
        let err = parse_relationships("<Other/>").unwrap_err();
        assert!(matches!(err, RelsError::MissingRoot));
    }

    #[test]
    fn test_parse_truncated() {
        let err = parse_relationships(r#"<Relationships><Relationship Id="rId1""#).unwrap_err();
        assert!(matches!(err, RelsError::XmlParse(_) | RelsError::Unbalanced));
    }

    #[test]
    fn test_parse_unclosed_root() {
        let err = parse_relationships("<Relationships>").unwrap_err();
        assert!(matches!(err, RelsError::XmlParse(_) | RelsError::Unbalanced));
    }

    #[test]
    fn test_parse_missing_attribute() {
        let xml = r#"<Relationships><Relationship Id="rId1" Target="a.xml"/></Relationships>"#;
        let err = parse_relationships(xml).unwrap_err();
        assert!(matches!(err, RelsError::MissingAttribute("Type")));
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(
            rels_path_for("word/document.xml"),
            "word/_rels/document.xml.rels"
        );
        assert_eq!(rels_path_for("word/header1.xml"), "word/_rels/header1.xml.rels");
        assert_eq!(rels_path_for("root.xml"), "_rels/root.xml.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("word/document.xml", "media/image1.png"),
            "word/media/image1.png"
        );
        assert_eq!(
            resolve_target("word/document.xml", "../customXml/item1.xml"),
            "customXml/item1.xml"
        );
        assert_eq!(
            resolve_target("word/document.xml", "/word/media/a.png"),
            "word/media/a.png"
        );
    }
}
