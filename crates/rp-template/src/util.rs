//! XML text helpers.

/// Escape text for use as XML character data or an attribute value.
///
/// # Example
///
/// ```
/// use rp_template::escape_xml;
///
/// assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
/// ```
#[must_use]
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape_xml("Chart 1"), "Chart 1");
    }

    #[test]
    fn test_escape_unicode_untouched() {
        assert_eq!(escape_xml("Évaluation ✓ 2026"), "Évaluation ✓ 2026");
    }
}
