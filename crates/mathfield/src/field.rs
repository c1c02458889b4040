//! Storage adapter for math text fields.
//!
//! A stored field is the JSON serialization of a [`MathValue`]. Values coming
//! from storage or from application code arrive in a handful of shapes; they
//! are sorted into a [`FieldInput`] once and then handled exhaustively.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::renderer::MathRenderer;
use crate::value::MathValue;

/// Every shape a field value can arrive in.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    /// SQL `NULL`, or no value at all
    Null,
    /// Either a serialized pair or bare raw text
    Text(String),
    /// An already decoded object, expected to be `{raw, html}`
    Mapping(Map<String, Value>),
    /// Anything else (numbers, arrays, booleans)
    Other(Value),
}

impl From<Value> for FieldInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldInput::Null,
            Value::String(text) => FieldInput::Text(text),
            Value::Object(map) => FieldInput::Mapping(map),
            other => FieldInput::Other(other),
        }
    }
}

impl From<Option<String>> for FieldInput {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldInput::Null, FieldInput::Text)
    }
}

impl From<String> for FieldInput {
    fn from(text: String) -> Self {
        FieldInput::Text(text)
    }
}

impl From<&str> for FieldInput {
    fn from(text: &str) -> Self {
        FieldInput::Text(text.to_owned())
    }
}

impl From<MathValue> for FieldInput {
    fn from(value: MathValue) -> Self {
        let (raw, html) = value.into_parts();
        let mut map = Map::new();
        map.insert("raw".into(), Value::String(raw));
        map.insert("html".into(), Value::String(html));
        FieldInput::Mapping(map)
    }
}

pub const DESCRIPTION: &str = "Field that allows you to write LaTeX and display it as HTML.";

/// Shown next to form inputs for math fields.
pub const HELP_TEXT: &str =
    "Type text as you would normally, or write LaTeX by surrounding it with $ characters.";

/// A text field holding LaTeX-bearing text and its rendered HTML.
#[derive(Debug, Clone, Default)]
pub struct MathField<R> {
    renderer: R,
    max_length: Option<usize>,
}

impl<R: MathRenderer> MathField<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            max_length: None,
        }
    }

    /// Limit passed through to form layers; the adapter itself doesn't enforce it.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Storage → value.
    ///
    /// Bare text (anything that isn't a serialized pair) is rendered on the
    /// spot. Shapes that can't hold text at all decode to an empty pair.
    ///
    /// A mapping must have exactly the keys `raw` and `html`; anything else is
    /// rejected with
    /// [`MalformedStoredValue`](crate::MathFieldError::MalformedStoredValue)
    /// rather than passed through.
    pub fn decode(&self, input: impl Into<FieldInput>) -> Result<Option<MathValue>> {
        match input.into() {
            FieldInput::Null => Ok(None),
            FieldInput::Text(text) if text.is_empty() => Ok(Some(MathValue::default())),
            FieldInput::Text(text) => match MathValue::from_storage(&text) {
                Some(value) => Ok(Some(value)),
                None => {
                    tracing::debug!("stored value is bare text, rendering");
                    MathValue::construct(text, None, &self.renderer).map(Some)
                }
            },
            FieldInput::Mapping(map) => MathValue::from_json(&Value::Object(map)).map(Some),
            FieldInput::Other(other) => {
                tracing::warn!(value = %other, "unrecognized math field value, using empty pair");
                Ok(Some(MathValue::default()))
            }
        }
    }

    /// Value → storage.
    ///
    /// Serialized pairs are validated and passed through, bare text is
    /// rendered first. Objects with keys other than exactly `raw` and `html`
    /// are rejected.
    pub fn encode(&self, input: impl Into<FieldInput>) -> Result<String> {
        match input.into() {
            FieldInput::Null => MathValue::default().to_storage(),
            FieldInput::Text(text) if text.is_empty() => MathValue::default().to_storage(),
            FieldInput::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(json @ Value::Object(_)) => {
                    MathValue::from_json(&json)?;
                    Ok(text)
                }
                // not JSON, or JSON that isn't an object: the user's own text
                _ => self.encode_parts(text, None),
            },
            FieldInput::Mapping(map) => MathValue::from_json(&Value::Object(map))?.to_storage(),
            FieldInput::Other(other) => {
                tracing::warn!(value = %other, "unrecognized math field value, storing empty pair");
                MathValue::default().to_storage()
            }
        }
    }

    /// Store `raw`, trusting `html` verbatim when given.
    pub fn encode_parts(&self, raw: impl Into<String>, html: Option<&str>) -> Result<String> {
        MathValue::construct(raw, html, &self.renderer)?.to_storage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counting {
        calls: Cell<usize>,
    }

    impl MathRenderer for Counting {
        fn render(&self, fragments: &[String]) -> Result<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            Ok(fragments.iter().map(|f| format!("<m>{f}</m>")).collect())
        }
    }

    fn field() -> MathField<Counting> {
        MathField::new(Counting::default())
    }

    #[test]
    fn decode_null() {
        assert_eq!(field().decode(FieldInput::Null).unwrap(), None);
        assert_eq!(field().decode(None::<String>).unwrap(), None);
        assert_eq!(field().decode(Value::Null).unwrap(), None);
    }

    #[test]
    fn decode_empty_string() {
        assert_eq!(field().decode("").unwrap(), Some(MathValue::default()));
    }

    #[test]
    fn decode_stored_pair_without_rendering() {
        let field = field();
        let value = field.decode(r#"{"raw": "a", "html": "b"}"#).unwrap();
        assert_eq!(value, Some(MathValue::new("a", "b")));
        assert_eq!(field.renderer().calls.get(), 0);
    }

    #[test]
    fn decode_bare_text_renders() {
        let field = field();
        let value = field.decode("area is $r^2$").unwrap().unwrap();
        assert_eq!(value, MathValue::new("area is $r^2$", "area is <m>r^2</m>"));
        assert_eq!(field.renderer().calls.get(), 1);
    }

    #[test]
    fn decode_json_that_is_not_a_pair_is_bare_text() {
        let field = field();
        let value = field.decode(r#"{"raw": "a"}"#).unwrap().unwrap();
        assert_eq!(value.raw(), r#"{"raw": "a"}"#);
        assert_eq!(field.renderer().calls.get(), 0);
    }

    #[test]
    fn decode_mapping() {
        let value = field()
            .decode(json!({"raw": "x", "html": "<i>x</i>"}))
            .unwrap();
        assert_eq!(value, Some(MathValue::new("x", "<i>x</i>")));
    }

    #[test]
    fn decode_malformed_mapping() {
        let err = field().decode(json!({"raw": "x", "extra": 1})).unwrap_err();
        assert!(err.is_malformed());
        let err = field().decode(json!({"raw": "x"})).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn decode_other_shapes_fall_back_to_empty() {
        for other in [json!(42), json!([1, 2]), json!(true)] {
            assert_eq!(field().decode(other).unwrap(), Some(MathValue::default()));
        }
    }

    #[test]
    fn encode_empty_shapes() {
        let empty = r#"{"raw":"","html":""}"#;
        assert_eq!(field().encode(FieldInput::Null).unwrap(), empty);
        assert_eq!(field().encode("").unwrap(), empty);
        assert_eq!(field().encode(json!(3.5)).unwrap(), empty);
    }

    #[test]
    fn encode_passes_valid_pair_through() {
        let stored = r#"{"raw": "a", "html": "b"}"#;
        assert_eq!(field().encode(stored).unwrap(), stored);
    }

    #[test]
    fn encode_rejects_wrong_keys() {
        let err = field().encode(r#"{"raw": "a", "title": "b"}"#).unwrap_err();
        assert!(err.is_malformed());
        let err = field().encode(json!({"html": "b"})).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn encode_bare_text_renders() {
        let field = field();
        let stored = field.encode("$x$ & y").unwrap();
        insta::assert_snapshot!(stored, @r#"{"raw":"$x$ & y","html":"<m>x</m> &amp; y"}"#);
    }

    #[test]
    fn encode_json_scalar_is_text() {
        assert_eq!(field().encode("42").unwrap(), r#"{"raw":"42","html":"42"}"#);
    }

    #[test]
    fn encode_parts_trusts_html() {
        let field = field();
        let stored = field.encode_parts("x=$2$", Some("precomputed")).unwrap();
        assert_eq!(stored, r#"{"raw":"x=$2$","html":"precomputed"}"#);
        assert_eq!(field.renderer().calls.get(), 0);
    }

    #[test]
    fn round_trip() {
        let field = field();
        for value in [
            MathValue::new("", ""),
            MathValue::new("a", "b"),
            MathValue::new("$x$ \\$", "<m>x</m> $"),
            MathValue::new("\"quoted\"\n", "&quot;quoted&quot;\n"),
        ] {
            let stored = field.encode(value.clone()).unwrap();
            assert_eq!(field.decode(stored).unwrap(), Some(value));
        }
        assert_eq!(field.renderer().calls.get(), 0);
    }

    #[test]
    fn max_length_passes_through() {
        let field = field().with_max_length(280);
        assert_eq!(field.max_length(), Some(280));
        assert!(HELP_TEXT.contains('$'));
    }
}
