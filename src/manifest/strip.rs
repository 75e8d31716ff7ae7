use crate::manifest::errors::ManifestError;
use crate::manifest::package::render;
use serde_json::{Map, Value};

/// Remove every reference to `needle` from a JSON value.
///
/// Strings containing `needle` are dropped, as are array elements and object
/// properties that reduce to a drop. A non-empty container emptied by
/// stripping is dropped itself; `None` means the whole value was dropped.
///
/// ```
/// use serde_json::json;
/// use uplift::manifest::strip_manifest_references;
///
/// let value = json!({"a": "keep", "b": "drop-ref-x", "c": ["keep2", "drop-ref-x-2"]});
/// assert_eq!(
///     strip_manifest_references(&value, "ref"),
///     Some(json!({"a": "keep", "c": ["keep2"]}))
/// );
/// ```
pub fn strip_manifest_references(value: &Value, needle: &str) -> Option<Value> {
    match value {
        Value::String(text) if text.contains(needle) => None,
        Value::Array(items) => {
            let kept: Vec<Value> = items
                .iter()
                .filter_map(|item| strip_manifest_references(item, needle))
                .collect();
            if kept.is_empty() && !items.is_empty() {
                return None;
            }
            Some(Value::Array(kept))
        }
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .iter()
                .filter_map(|(key, item)| {
                    strip_manifest_references(item, needle).map(|item| (key.clone(), item))
                })
                .collect();
            if kept.is_empty() && !map.is_empty() {
                return None;
            }
            Some(Value::Object(kept))
        }
        other => Some(other.clone()),
    }
}

/// Strip `needle` from a JSON document, returning it byte-identical when
/// nothing references it.
pub fn strip_manifest_text(text: &str, needle: &str) -> Result<String, ManifestError> {
    let value: Value = serde_json::from_str(text)?;
    let stripped = strip_manifest_references(&value, needle).unwrap_or_else(|| match value {
        Value::Array(_) => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    });
    if stripped == value {
        return Ok(text.to_string());
    }
    render(&stripped, text)
}
