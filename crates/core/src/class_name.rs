//! Class display-name extraction.
//!
//! The class service has gone through several schema revisions, so a class
//! document may carry its display name under any of [`CLASS_NAME_FIELDS`]
//! and its identifier as `_id`, `id`, or an extended-JSON `{"$oid": ...}`
//! object. These helpers accept all of them.

use serde_json::Value;

/// Candidate name fields, in priority order.
pub const CLASS_NAME_FIELDS: &[&str] = &[
    "no_kelas",
    "name",
    "class_name",
    "nama_kelas",
    "nama",
    "title",
];

/// First non-empty name field of a class document.
///
/// Strings and numbers are accepted; empty strings and zero are skipped.
pub fn extract_class_name(doc: &Value) -> Option<String> {
    CLASS_NAME_FIELDS
        .iter()
        .filter_map(|field| doc.get(field))
        .find_map(name_value)
}

fn name_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Identifier of a class document as a string, if it has one.
pub fn document_id(doc: &Value) -> Option<String> {
    let raw = match doc.get("_id") {
        Some(Value::Null) | None => doc.get("id")?,
        Some(v) => v,
    };
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Scan a class listing for `id` and return its display name.
///
/// Returns `None` if the listing is not an array, no entry matches, or the
/// matching entry has no usable name.
pub fn find_class_name(listing: &Value, id: &str) -> Option<String> {
    listing
        .as_array()?
        .iter()
        .find(|doc| document_id(doc).as_deref() == Some(id))
        .and_then(extract_class_name)
}
