//! Evaluates one YAML rule's `when`/`then` pair against an event.

use apl_types::{Decision, Escalation, Modification, ModificationOperation, Verdict};
use serde_json::Value;

use crate::condition;
use crate::schema::YamlRule;
use crate::template;
use crate::traversal::get_nested_value;

/// Evaluates `rule` against an event already flattened to JSON.
///
/// Returns `None` if any condition in `when` fails to match, in which case
/// the caller should fall through to the next rule. A rule with an empty or
/// absent `when` clause matches unconditionally.
#[must_use]
pub fn evaluate_rule(rule: &YamlRule, event: &Value) -> Option<Verdict> {
    if !all_conditions_match(&rule.when, event) {
        return None;
    }
    Some(build_verdict(&rule.then, event))
}

fn all_conditions_match(when: &Value, event: &Value) -> bool {
    let Some(fields) = when.as_object() else {
        return when.is_null();
    };

    fields.iter().all(|(dot_path, expected)| {
        let actual = get_nested_value(event, dot_path).cloned().unwrap_or(Value::Null);
        condition::evaluate(&actual, expected)
    })
}

fn build_verdict(then: &Value, event: &Value) -> Verdict {
    let decision = then
        .get("decision")
        .cloned()
        .and_then(|v| serde_json::from_value::<Decision>(v).ok())
        .unwrap_or(Decision::Allow);

    let confidence = then.get("confidence").and_then(Value::as_f64).unwrap_or(1.0);

    let raw_reasoning = then.get("reasoning").and_then(Value::as_str).unwrap_or_default();
    let rendered_reasoning = template::render(raw_reasoning, event);

    let modifications = then
        .get("modification")
        .map(|data| build_modification(data, event))
        .into_iter()
        .collect();

    let escalation = then.get("escalation").map(|data| build_escalation(data, event));

    Verdict {
        decision,
        confidence,
        reasoning: (!rendered_reasoning.is_empty()).then_some(rendered_reasoning),
        modifications,
        escalation,
        policy_name: None,
        policy_version: None,
        evaluation_ms: None,
        trace: None,
    }
}

fn build_modification(data: &Value, event: &Value) -> Modification {
    let target = data.get("target").and_then(Value::as_str).unwrap_or_default().to_owned();
    let operation = data
        .get("operation")
        .cloned()
        .and_then(|v| serde_json::from_value::<ModificationOperation>(v).ok())
        .unwrap_or(ModificationOperation::Replace);
    let path = data.get("path").and_then(Value::as_str).map(str::to_owned);

    let raw_value = data.get("value").cloned().unwrap_or(Value::Null);
    let value = match raw_value {
        Value::String(raw) => Value::String(template::render(&raw, event)),
        other => other,
    };

    Modification {
        target,
        operation,
        value,
        path,
    }
}

fn build_escalation(data: &Value, event: &Value) -> Escalation {
    let kind = data.get("type").and_then(Value::as_str).unwrap_or_default().to_owned();
    let raw_prompt = data.get("prompt").and_then(Value::as_str).unwrap_or_default();
    let rendered_prompt = template::render(raw_prompt, event);
    let fallback_action = data.get("fallback_action").and_then(Value::as_str).map(str::to_owned);
    let timeout_ms = data.get("timeout_ms").and_then(Value::as_u64);
    let options = data.get("options").and_then(Value::as_array).map(|items| {
        items.iter().filter_map(Value::as_str).map(str::to_owned).collect()
    });

    Escalation {
        kind,
        prompt: (!rendered_prompt.is_empty()).then_some(rendered_prompt),
        fallback_action,
        timeout_ms,
        options,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rule(when: Value, then: Value) -> YamlRule {
        YamlRule { when, then }
    }

    #[test]
    fn a_rule_with_no_when_clause_always_matches() {
        let event = json!({"payload": {"tool_name": "search"}});
        let verdict = evaluate_rule(&rule(Value::Null, json!({"decision": "deny"})), &event).unwrap();
        assert_eq!(verdict.decision, Decision::Deny);
    }

    #[test]
    fn a_failing_condition_yields_none() {
        let event = json!({"payload": {"tool_name": "search"}});
        let when = json!({"payload.tool_name": "fetch"});
        assert!(evaluate_rule(&rule(when, json!({"decision": "deny"})), &event).is_none());
    }

    #[test]
    fn reasoning_is_rendered_from_the_event() {
        let event = json!({"payload": {"tool_name": "shell_exec"}});
        let when = json!({"payload.tool_name": "shell_exec"});
        let then = json!({"decision": "deny", "reasoning": "blocked {{payload.tool_name}}"});

        let verdict = evaluate_rule(&rule(when, then), &event).unwrap();
        assert_eq!(verdict.reasoning.as_deref(), Some("blocked shell_exec"));
    }

    #[test]
    fn a_modification_value_is_rendered_when_it_is_a_string() {
        let event = json!({"metadata": {"user_region": "eu"}});
        let then = json!({
            "decision": "modify",
            "modification": {
                "target": "output",
                "operation": "replace",
                "value": "region={{metadata.user_region}}",
            },
        });

        let verdict = evaluate_rule(&rule(Value::Null, then), &event).unwrap();
        assert_eq!(verdict.modifications.len(), 1);
        assert_eq!(verdict.modifications[0].value, json!("region=eu"));
    }

    #[test]
    fn a_non_string_modification_value_passes_through_unrendered() {
        let then = json!({
            "decision": "modify",
            "modification": {"target": "output", "operation": "replace", "value": 42},
        });

        let verdict = evaluate_rule(&rule(Value::Null, then), &json!({})).unwrap();
        assert_eq!(verdict.modifications[0].value, json!(42));
    }

    #[test]
    fn an_escalation_carries_its_rendered_prompt() {
        let then = json!({
            "decision": "escalate",
            "escalation": {"type": "human_confirm", "prompt": "confirm {{payload.tool_name}}"},
        });
        let event = json!({"payload": {"tool_name": "wire_transfer"}});

        let verdict = evaluate_rule(&rule(Value::Null, then), &event).unwrap();
        let escalation = verdict.escalation.unwrap();
        assert_eq!(escalation.kind, "human_confirm");
        assert_eq!(escalation.prompt.as_deref(), Some("confirm wire_transfer"));
    }
}
