//! `{{dotted.path}}` substitution against a JSON value.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::traversal::get_nested_value;

static TEMPLATE_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.+?)\}\}").expect("static pattern is valid"));

/// Renders `{{dotted.path}}` placeholders in `template` by resolving each
/// path against `root`. A path that resolves to nothing renders as an empty
/// string rather than leaving the placeholder in place.
#[must_use]
pub fn render(template: &str, root: &Value) -> String {
    if !template.contains("{{") {
        return template.to_owned();
    }

    TEMPLATE_VARIABLE
        .replace_all(template, |captures: &regex::Captures<'_>| {
            let path = captures[1].trim();
            match get_nested_value(root, path) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_a_single_placeholder() {
        let root = json!({"payload": {"tool_name": "search"}});
        assert_eq!(render("Blocked tool {{payload.tool_name}}", &root), "Blocked tool search");
    }

    #[test]
    fn an_unresolved_path_renders_empty() {
        let root = json!({});
        assert_eq!(render("value={{missing.path}}", &root), "value=");
    }

    #[test]
    fn a_template_with_no_placeholders_is_returned_unchanged() {
        assert_eq!(render("plain text", &json!({})), "plain text");
    }

    #[test]
    fn numeric_values_are_stringified_without_quotes() {
        let root = json!({"metadata": {"token_count": 42}});
        assert_eq!(render("count={{metadata.token_count}}", &root), "count=42");
    }

    #[test]
    fn a_path_resolving_to_an_explicit_null_renders_empty() {
        let root = json!({"metadata": {"user_region": null}});
        assert_eq!(render("region={{metadata.user_region}}", &root), "region=");
    }
}
