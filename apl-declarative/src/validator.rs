//! Structural validation of a YAML manifest, without building a server.
//!
//! Used by manifest authors and CI to catch typos (an unknown event type,
//! a missing `rules` block) before a deploy, without paying for the
//! handler-registration machinery [`crate::YamlPolicyLoader`] goes through.

use std::path::Path;

use apl_types::{Decision, EventType};
use serde_yaml_ng::Value;

/// Checks a YAML manifest's structure without registering anything.
#[derive(Default)]
pub struct YamlPolicyValidator;

impl YamlPolicyValidator {
    /// Creates a validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reads and validates the manifest at `path`, returning every problem
    /// found. An empty list means the manifest is structurally sound.
    #[must_use]
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Vec<String> {
        let Ok(raw) = std::fs::read_to_string(path.as_ref()) else {
            return vec![format!("failed to read {}", path.as_ref().display())];
        };
        self.validate_str(&raw)
    }

    /// Validates `raw` as a YAML manifest, returning every problem found.
    #[must_use]
    pub fn validate_str(&self, raw: &str) -> Vec<String> {
        let mut errors = Vec::new();

        let data: Value = match serde_yaml_ng::from_str(raw) {
            Ok(value) => value,
            Err(parse_error) => {
                errors.push(format!("YAML parse error: {parse_error}"));
                return errors;
            }
        };

        let Some(root) = data.as_mapping() else {
            errors.push("root must be a mapping".to_owned());
            return errors;
        };

        if !root.contains_key("name") {
            errors.push("missing required field: name".to_owned());
        }

        let Some(policies) = root.get("policies") else {
            errors.push("missing required field: policies".to_owned());
            return errors;
        };
        let Some(policies) = policies.as_sequence() else {
            errors.push("'policies' must be a list".to_owned());
            return errors;
        };

        for (index, policy) in policies.iter().enumerate() {
            validate_policy(policy, index, &mut errors);
        }

        errors
    }
}

fn validate_policy(policy: &Value, index: usize, errors: &mut Vec<String>) {
    let prefix = format!("policies[{index}]");
    let Some(policy) = policy.as_mapping() else {
        errors.push(format!("{prefix}: must be a mapping"));
        return;
    };

    if !policy.contains_key("name") {
        errors.push(format!("{prefix}: missing required field 'name'"));
    }

    validate_events(policy, &prefix, errors);
    validate_rules(policy, &prefix, errors);
}

fn validate_events(policy: &serde_yaml_ng::Mapping, prefix: &str, errors: &mut Vec<String>) {
    let Some(events) = policy.get("events") else {
        errors.push(format!("{prefix}: missing required field 'events'"));
        return;
    };
    let Some(events) = events.as_sequence() else {
        return;
    };

    for (index, event) in events.iter().enumerate() {
        let is_valid = event.as_str().is_some_and(|name| name.parse::<EventType>().is_ok());
        if !is_valid {
            let shown = event.as_str().unwrap_or("<non-string>");
            errors.push(format!("{prefix}.events[{index}]: invalid event type '{shown}'"));
        }
    }
}

fn validate_rules(policy: &serde_yaml_ng::Mapping, prefix: &str, errors: &mut Vec<String>) {
    let Some(rules) = policy.get("rules") else {
        errors.push(format!("{prefix}: missing required field 'rules'"));
        return;
    };
    let Some(rules) = rules.as_sequence() else {
        return;
    };

    for (index, rule) in rules.iter().enumerate() {
        let rule_prefix = format!("{prefix}.rules[{index}]");
        validate_rule(rule, &rule_prefix, errors);
    }
}

fn validate_rule(rule: &Value, prefix: &str, errors: &mut Vec<String>) {
    let Some(rule) = rule.as_mapping() else {
        errors.push(format!("{prefix}: must be a mapping"));
        return;
    };

    if !rule.contains_key("when") {
        errors.push(format!("{prefix}: missing required field 'when'"));
    }

    match rule.get("then") {
        None => errors.push(format!("{prefix}: missing required field 'then'")),
        Some(then) => {
            if let Some(then) = then.as_mapping() {
                if let Some(decision) = then.get("decision").and_then(Value::as_str) {
                    let parsed: Result<Decision, _> =
                        serde_json::from_value(serde_json::Value::String(decision.to_owned()));
                    if parsed.is_err() {
                        errors.push(format!("{prefix}.then.decision: invalid decision '{decision}'"));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_well_formed_manifest_has_no_errors() {
        let manifest = r#"
name: guardrails
policies:
  - name: block-shell
    events: ["tool.pre_invoke"]
    rules:
      - when:
          payload.tool_name: shell_exec
        then:
          decision: deny
"#;
        assert!(YamlPolicyValidator::new().validate_str(manifest).is_empty());
    }

    #[test]
    fn an_unknown_event_type_is_reported() {
        let manifest = r#"
name: guardrails
policies:
  - name: p
    events: ["bogus.event"]
    rules: []
"#;
        let errors = YamlPolicyValidator::new().validate_str(manifest);
        assert!(errors.iter().any(|e| e.contains("invalid event type")));
    }

    #[test]
    fn a_missing_policies_field_is_reported() {
        let errors = YamlPolicyValidator::new().validate_str("name: x");
        assert!(errors.iter().any(|e| e.contains("missing required field: policies")));
    }

    #[test]
    fn an_invalid_decision_in_then_is_reported() {
        let manifest = r#"
name: guardrails
policies:
  - name: p
    events: ["tool.pre_invoke"]
    rules:
      - when: {}
        then:
          decision: maybe
"#;
        let errors = YamlPolicyValidator::new().validate_str(manifest);
        assert!(errors.iter().any(|e| e.contains("invalid decision")));
    }
}
