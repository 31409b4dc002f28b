//! Document normalization
//!
//! Both sides of a comparison are brought into one canonical form: a
//! `serde_json::Value` tree with object key order preserved. Input may be JSON
//! text or anything already decoded that serializes to a JSON-native shape.
//! Record arrays are not sorted here; the comparator matches their elements by
//! discovered key, which makes element order irrelevant without a rewrite.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CompareError, CompareResult};

/// Length of the excerpt reported around a parse failure
const FRAGMENT_CONTEXT: usize = 24;

/// Parse JSON text into a value tree
///
/// The error names the offending fragment of the input so a failure in a large
/// response is locatable without re-parsing by hand.
pub fn parse_document(text: &str) -> CompareResult<Value> {
    serde_json::from_str(text).map_err(|source| {
        let offset = offset_of(text, source.line(), source.column());
        CompareError::Parse {
            offset,
            fragment: fragment_at(text, offset),
            source,
        }
    })
}

/// Convert an already-decoded structure into a value tree
///
/// Fails with [`CompareError::UnsupportedShape`] when the structure cannot be
/// represented as JSON (non-finite floats, non-string map keys, ...). Such a
/// subtree is never skipped: hiding it could hide a genuine mismatch.
pub fn to_document<T: Serialize>(value: &T) -> CompareResult<Value> {
    serde_json::to_value(value).map_err(|source| CompareError::UnsupportedShape { source })
}

/// Display text for a scalar, as it appears in diff entries and built keys
///
/// Strings render bare (no quotes), `null` renders as the text `null`, numbers
/// and booleans use their canonical JSON text.
pub fn scalar_display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Display text for any value: scalars per [`scalar_display`], containers as
/// compact JSON
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None => "null".to_string(),
        Some(v) => scalar_display(v),
    }
}

/// Whether a value is a scalar (not an object or array)
pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn offset_of(text: &str, line: usize, column: usize) -> usize {
    // serde_json reports 1-based line/column
    let mut offset = 0;
    for (i, l) in text.split('\n').enumerate() {
        if i + 1 == line {
            return (offset + column.saturating_sub(1)).min(text.len());
        }
        offset += l.len() + 1;
    }
    text.len()
}

fn fragment_at(text: &str, offset: usize) -> String {
    let start = offset.saturating_sub(FRAGMENT_CONTEXT / 2);
    let end = (offset + FRAGMENT_CONTEXT).min(text.len());
    let mut start = start.min(text.len());
    // keep slice boundaries on char boundaries
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = end;
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_document() {
        let value = parse_document(r#"{"data":[{"id":1}]}"#).unwrap();
        assert_eq!(value, json!({"data": [{"id": 1}]}));
    }

    #[test]
    fn test_parse_error_names_fragment() {
        let err = parse_document(r#"{"data": [1, 2, oops]}"#).unwrap_err();
        match err {
            CompareError::Parse { fragment, .. } => {
                assert!(fragment.contains("oops"), "fragment was '{fragment}'");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_to_document_rejects_non_finite() {
        let err = to_document(&f64::NAN).unwrap_err();
        assert!(matches!(err, CompareError::UnsupportedShape { .. }));
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(scalar_display(&json!(null)), "null");
        assert_eq!(scalar_display(&json!("R1")), "R1");
        assert_eq!(scalar_display(&json!(100)), "100");
        assert_eq!(scalar_display(&json!(0.95)), "0.95");
        assert_eq!(scalar_display(&json!(true)), "true");
    }

    #[test]
    fn test_display_container_is_compact_json() {
        assert_eq!(display_value(Some(&json!({"a": 1}))), r#"{"a":1}"#);
        assert_eq!(display_value(None), "null");
    }
}
