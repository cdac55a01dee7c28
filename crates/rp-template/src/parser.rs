//! Tag scanning.
//!
//! Splits part XML into literal text and `{tag}` segments.

/// Segment of a part's XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied through unchanged.
    Literal(&'a str),
    /// Tag between delimiters, with surrounding whitespace trimmed.
    Tag {
        /// Tag text without the delimiters.
        text: &'a str,
        /// Byte offset of the opening delimiter.
        start: usize,
    },
}

/// Split XML into literal and tag segments, in order.
///
/// Tags are only recognized in character data: element markup (including
/// attribute values), comments, CDATA sections and processing instructions
/// are copied through unchanged. A tag is `{` followed by text without `{`,
/// `}` or `<` and then `}`. Tags therefore never span XML markup; an
/// unmatched or interrupted `{` is kept as literal text. Empty tags (`{}`)
/// are literal.
#[must_use]
pub fn parse_tags(xml: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(offset) = xml[pos..].find(['{', '<']) {
        let open = pos + offset;
        if xml.as_bytes()[open] == b'<' {
            pos = markup_end(xml, open);
            continue;
        }

        let after = open + 1;
        let stop = xml[after..]
            .find(['{', '}', '<'])
            .map(|i| (after + i, xml.as_bytes()[after + i]));

        match stop {
            Some((close, b'}')) if !xml[after..close].trim().is_empty() => {
                if literal_start < open {
                    segments.push(Segment::Literal(&xml[literal_start..open]));
                }
                segments.push(Segment::Tag {
                    text: xml[after..close].trim(),
                    start: open,
                });
                pos = close + 1;
                literal_start = pos;
            }
            _ => pos = after,
        }
    }

    if literal_start < xml.len() {
        segments.push(Segment::Literal(&xml[literal_start..]));
    }
    segments
}

/// Offset just past the markup that starts with `<` at `start`.
///
/// Unterminated markup runs to the end of the input.
fn markup_end(xml: &str, start: usize) -> usize {
    let rest = &xml[start..];
    let terminator = [("<!--", "-->"), ("<![CDATA[", "]]>"), ("<?", "?>")]
        .into_iter()
        .find(|(open, _)| rest.starts_with(*open));
    if let Some((open, close)) = terminator {
        return rest[open.len()..]
            .find(close)
            .map_or(xml.len(), |i| start + open.len() + i + close.len());
    }

    let mut quote = None;
    for (i, b) in rest.bytes().enumerate().skip(1) {
        match (quote, b) {
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            (None, b'>') => return start + i + 1,
            _ => {}
        }
    }
    xml.len()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(parse_tags("<w:t>Hi</w:t>"), vec![Segment::Literal("<w:t>Hi</w:t>")]);
    }

    #[test]
    fn test_tags_and_literals() {
        let xml = "<w:t>Name: {name} {%chart}</w:t>";
        assert_eq!(
            parse_tags(xml),
            vec![
                Segment::Literal("<w:t>Name: "),
                Segment::Tag {
                    text: "name",
                    start: 11
                },
                Segment::Literal(" "),
                Segment::Tag {
                    text: "%chart",
                    start: 18
                },
                Segment::Literal("</w:t>"),
            ]
        );
    }

    #[test]
    fn test_tag_interrupted_by_markup_is_literal() {
        let xml = "<w:t>{na</w:t><w:t>me}</w:t>";
        assert_eq!(parse_tags(xml), vec![Segment::Literal(xml)]);
    }

    #[test]
    fn test_unmatched_and_nested_braces() {
        assert_eq!(
            parse_tags("a { b {c} d"),
            vec![
                Segment::Literal("a { b "),
                Segment::Tag { text: "c", start: 6 },
                Segment::Literal(" d"),
            ]
        );
        assert_eq!(parse_tags("{}"), vec![Segment::Literal("{}")]);
        assert_eq!(parse_tags("x {"), vec![Segment::Literal("x {")]);
    }

    #[test]
    fn test_attribute_braces_are_literal() {
        let xml = r#"<a:ext uri="{28A0092B-C50C-407E-A947-70E740481C1C}"/><w:t>{%chart}</w:t>"#;
        assert_eq!(
            parse_tags(xml),
            vec![
                Segment::Literal(r#"<a:ext uri="{28A0092B-C50C-407E-A947-70E740481C1C}"/><w:t>"#),
                Segment::Tag {
                    text: "%chart",
                    start: 58
                },
                Segment::Literal("</w:t>"),
            ]
        );
    }

    #[test]
    fn test_quoted_angle_bracket_stays_in_markup() {
        let xml = r#"<w:p w:rsid='a>{b}'/>{c}"#;
        assert_eq!(
            parse_tags(xml),
            vec![
                Segment::Literal(r#"<w:p w:rsid='a>{b}'/>"#),
                Segment::Tag { text: "c", start: 21 },
            ]
        );
    }

    #[test]
    fn test_comments_and_cdata_are_literal() {
        let xml = "<!-- don't {x} --><![CDATA[{y}]]><?pi {z}?>{w}";
        assert_eq!(
            parse_tags(xml),
            vec![
                Segment::Literal("<!-- don't {x} --><![CDATA[{y}]]><?pi {z}?>"),
                Segment::Tag { text: "w", start: 43 },
            ]
        );
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(
            parse_tags("{ %chart }"),
            vec![Segment::Tag {
                text: "%chart",
                start: 0
            }]
        );
    }
}
