//! The `when` clause's condition operators.

use regex::RegexBuilder;
use serde_json::Value;

/// Evaluates one condition against a resolved value.
///
/// - `null` condition matches only a `null` value.
/// - An object condition is a map of operator name to argument; every
///   recognized operator must match (an unrecognized key is ignored rather
///   than rejected, so a manifest can carry forward-compatible hints).
/// - Any other condition is a direct equality check.
#[must_use]
pub fn evaluate(value: &Value, condition: &Value) -> bool {
    match condition {
        Value::Null => value.is_null(),
        Value::Object(fields) => evaluate_object(value, fields),
        other => value == other,
    }
}

fn evaluate_object(value: &Value, fields: &serde_json::Map<String, Value>) -> bool {
    let mut matched_any_operator = false;
    let mut all_matched = true;

    for (operator, argument) in fields {
        let Some(result) = apply_operator(operator, value, argument) else {
            continue;
        };
        matched_any_operator = true;
        all_matched &= result;
    }

    if matched_any_operator {
        all_matched
    } else {
        value == &Value::Object(fields.clone())
    }
}

fn apply_operator(operator: &str, value: &Value, argument: &Value) -> Option<bool> {
    Some(match operator {
        "equals" => value == argument,
        "matches" => matches_regex(value, argument),
        "contains" => contains(value, argument),
        "gt" => compare(value, argument, |a, b| a > b),
        "gte" => compare(value, argument, |a, b| a >= b),
        "lt" => compare(value, argument, |a, b| a < b),
        "lte" => compare(value, argument, |a, b| a <= b),
        "in" => membership(value, argument),
        "not" => !evaluate(value, argument),
        "any" => any_of(value, argument),
        "all" => all_of(value, argument),
        _ => return None,
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches_regex(value: &Value, pattern: &Value) -> bool {
    if value.is_null() {
        return false;
    }
    let Value::String(pattern) = pattern else {
        return false;
    };
    let Ok(regex) = RegexBuilder::new(pattern).case_insensitive(true).build() else {
        return false;
    };
    let haystack = stringify(value);
    regex.find(&haystack).is_some_and(|m| m.start() == 0)
}

fn contains(value: &Value, needle: &Value) -> bool {
    match value {
        Value::String(s) => needle.as_str().is_some_and(|n| s.contains(n)),
        Value::Array(items) => items.contains(needle),
        Value::Object(fields) => needle.as_str().is_some_and(|n| fields.contains_key(n)),
        _ => false,
    }
}

fn compare(value: &Value, threshold: &Value, op: impl Fn(f64, f64) -> bool) -> bool {
    match (value.as_f64(), threshold.as_f64()) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn membership(value: &Value, allowed: &Value) -> bool {
    allowed.as_array().is_some_and(|items| items.contains(value))
}

fn any_of(value: &Value, conditions: &Value) -> bool {
    conditions.as_array().is_some_and(|items| items.iter().any(|c| evaluate(value, c)))
}

fn all_of(value: &Value, conditions: &Value) -> bool {
    conditions.as_array().is_some_and(|items| items.iter().all(|c| evaluate(value, c)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_condition_matches_only_null() {
        assert!(evaluate(&Value::Null, &Value::Null));
        assert!(!evaluate(&json!("x"), &Value::Null));
    }

    #[test]
    fn bare_value_condition_is_equality() {
        assert!(evaluate(&json!("search"), &json!("search")));
        assert!(!evaluate(&json!("search"), &json!("fetch")));
    }

    #[test]
    fn matches_anchors_at_the_start_like_python_re_match() {
        assert!(evaluate(&json!("hello world"), &json!({"matches": "hello"})));
        assert!(!evaluate(&json!("say hello"), &json!({"matches": "hello"})));
    }

    #[test]
    fn matches_is_case_insensitive_and_coerces_non_strings() {
        assert!(evaluate(&json!(42), &json!({"matches": "^42$"})));
        assert!(evaluate(&json!("HELLO"), &json!({"matches": "hello"})));
    }

    #[test]
    fn matches_against_null_is_false() {
        assert!(!evaluate(&Value::Null, &json!({"matches": ".*"})));
    }

    #[test]
    fn gt_requires_both_sides_numeric() {
        assert!(evaluate(&json!(10), &json!({"gt": 5})));
        assert!(!evaluate(&json!("ten"), &json!({"gt": 5})));
    }

    #[test]
    fn membership_checks_the_in_list() {
        assert!(evaluate(&json!("us"), &json!({"in": ["us", "eu"]})));
        assert!(!evaluate(&json!("apac"), &json!({"in": ["us", "eu"]})));
    }

    #[test]
    fn not_negates_the_inner_condition() {
        assert!(evaluate(&json!("x"), &json!({"not": {"equals": "y"}})));
    }

    #[test]
    fn any_and_all_compose_sub_conditions() {
        let cond_any = json!({"any": [{"equals": "a"}, {"equals": "b"}]});
        assert!(evaluate(&json!("b"), &cond_any));

        let cond_all = json!({"all": [{"gt": 0}, {"lt": 10}]});
        assert!(evaluate(&json!(5), &cond_all));
        assert!(!evaluate(&json!(50), &cond_all));
    }

    #[test]
    fn multiple_operators_in_one_object_all_must_match() {
        let cond = json!({"gt": 0, "lt": 10});
        assert!(evaluate(&json!(5), &cond));
        assert!(!evaluate(&json!(50), &cond));
    }
}
