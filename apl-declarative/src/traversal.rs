//! Dot-path lookups against a JSON value.
//!
//! Rules and templates address an event by dotted path (`payload.tool_name`,
//! `metadata.user_region`) against whatever shape the event serializes to,
//! rather than against typed Rust fields, so a manifest author never needs
//! to know the event type's Rust representation.

use serde_json::Value;

/// Resolves a dot-separated path against a JSON value.
///
/// Each segment is looked up as an object key; `None` is returned as soon
/// as a segment is missing, the current value is not an object, or the
/// path is empty. Array indices are not supported, matching the paths a
/// policy manifest actually writes.
#[must_use]
pub fn get_nested_value<'a>(root: &'a Value, dot_path: &str) -> Option<&'a Value> {
    if dot_path.is_empty() {
        return None;
    }

    let mut current = root;
    for part in dot_path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resolves_a_nested_path() {
        let root = json!({"payload": {"tool_name": "search"}});
        assert_eq!(get_nested_value(&root, "payload.tool_name"), Some(&json!("search")));
    }

    #[test]
    fn a_missing_segment_yields_none() {
        let root = json!({"payload": {}});
        assert_eq!(get_nested_value(&root, "payload.tool_name"), None);
    }

    #[test]
    fn an_empty_path_yields_none() {
        let root = json!({"a": 1});
        assert_eq!(get_nested_value(&root, ""), None);
    }

    #[test]
    fn traversing_through_a_scalar_yields_none() {
        let root = json!({"a": 1});
        assert_eq!(get_nested_value(&root, "a.b"), None);
    }
}
