//! Render context: the values a template instance is rendered from.

use std::collections::BTreeMap;

/// A value bound to a placeholder name.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit absence (`null`).
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(f64),
    /// Text.
    Text(String),
    /// Raw bytes, e.g. an encoded chart image.
    Bytes(Vec<u8>),
    /// Ordered list.
    List(Vec<Value>),
    /// Nested scope.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Byte content, if this is a [`Value::Bytes`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text representation for plain substitution.
    ///
    /// Returns `None` for values that have no inline text form.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => Some(String::new()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Text(s) => Some(s.clone()),
            Self::Bytes(_) | Self::List(_) | Self::Map(_) => None,
        }
    }

    /// Short type name for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// Error resolving a placeholder name against a context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Name is empty or contains an empty path segment.
    #[error("invalid placeholder name: {0:?}")]
    InvalidName(String),

    /// A dotted path steps through a value that is not a map.
    #[error("cannot resolve {name:?}: {segment:?} is not a map")]
    NotAMap {
        /// Full placeholder name.
        name: String,
        /// Segment whose value is not a map.
        segment: String,
    },
}

/// Binding of placeholder names to values for one template instantiation.
///
/// Owned by the caller of the render pass; modules only read from it.
///
/// # Example
///
/// ```
/// use rp_template::{RenderContext, Value};
///
/// let ctx = RenderContext::new()
///     .with_value("teacher", "Ada")
///     .with_value("chart", vec![0x89, b'P', b'N', b'G']);
///
/// assert_eq!(ctx.resolve("teacher").unwrap(), Some(&Value::from("Ada")));
/// assert_eq!(ctx.resolve("missing").unwrap(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    root: BTreeMap<String, Value>,
}

impl RenderContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object.
    ///
    /// Non-object JSON yields an empty context.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match Value::from(json) {
            Value::Map(root) => Self { root },
            _ => Self::default(),
        }
    }

    /// Bind a value (builder style).
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Bind a value at the top level, replacing any previous binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.root.insert(name.into(), value.into());
    }

    /// Resolve a placeholder name.
    ///
    /// Dotted names (`teacher.chart`) walk nested maps. An absent key at any
    /// level resolves to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the name is malformed or a path segment
    /// resolves to a non-map value.
    pub fn resolve(&self, name: &str) -> Result<Option<&Value>, ResolveError> {
        let name = name.trim();
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return Err(ResolveError::InvalidName(name.to_owned()));
        }

        let mut segments = name.split('.');
        let Some(first) = segments.next() else {
            return Err(ResolveError::InvalidName(name.to_owned()));
        };
        let mut current = match self.root.get(first) {
            Some(value) => value,
            None => return Ok(None),
        };
        let mut previous = first;

        for segment in segments {
            let Value::Map(map) = current else {
                return Err(ResolveError::NotAMap {
                    name: name.to_owned(),
                    segment: previous.to_owned(),
                });
            };
            match map.get(segment) {
                Some(value) => current = value,
                None => return Ok(None),
            }
            previous = segment;
        }

        Ok(Some(current))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_resolve_top_level() {
        let ctx = RenderContext::new().with_value("name", "Ada");
        assert_eq!(ctx.resolve("name").unwrap(), Some(&Value::from("Ada")));
        assert_eq!(ctx.resolve(" name ").unwrap(), Some(&Value::from("Ada")));
    }

    #[test]
    fn test_resolve_dotted_path() {
        let ctx = RenderContext::from_json(json!({
            "teacher": { "name": "Ada", "scores": { "mean": 4.5 } }
        }));

        assert_eq!(
            ctx.resolve("teacher.scores.mean").unwrap(),
            Some(&Value::Number(4.5))
        );
        assert_eq!(ctx.resolve("teacher.missing").unwrap(), None);
        assert_eq!(ctx.resolve("nobody.name").unwrap(), None);
    }

    #[test]
    fn test_resolve_through_non_map() {
        let ctx = RenderContext::new().with_value("teacher", "Ada");
        let err = ctx.resolve("teacher.name").unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotAMap {
                name: "teacher.name".to_owned(),
                segment: "teacher".to_owned(),
            }
        );
    }

    #[test]
    fn test_resolve_invalid_names() {
        let ctx = RenderContext::new();
        assert!(matches!(ctx.resolve(""), Err(ResolveError::InvalidName(_))));
        assert!(matches!(ctx.resolve("a..b"), Err(ResolveError::InvalidName(_))));
        assert!(matches!(ctx.resolve(".a"), Err(ResolveError::InvalidName(_))));
    }

    #[test]
    fn test_from_json_non_object() {
        assert_eq!(RenderContext::from_json(json!([1, 2])), RenderContext::new());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Number(3.0).to_text().as_deref(), Some("3"));
        assert_eq!(Value::Number(2.5).to_text().as_deref(), Some("2.5"));
        assert_eq!(Value::Null.to_text().as_deref(), Some(""));
        assert_eq!(Value::Bool(true).to_text().as_deref(), Some("true"));
        assert_eq!(Value::Bytes(vec![1]).to_text(), None);
    }

    #[test]
    fn test_json_arrays_stay_lists() {
        let ctx = RenderContext::from_json(json!({ "chart": [137, 80, 78, 71] }));
        let value = ctx.resolve("chart").unwrap().unwrap();
        assert_eq!(value.kind(), "list");
        assert!(value.as_bytes().is_none());
    }
}
