//! A policy's reply to one event.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::escalation::Escalation;
use crate::modification::{Modification, ModificationOperation};
use crate::Decision;

fn default_confidence() -> f64 {
    1.0
}

/// A policy's reply for one event.
///
/// Verdicts are produced by a policy handler, enriched with timing and
/// attribution by the invoker, and reduced to one final verdict per event
/// by a composition strategy. Two wire shapes for the modification list
/// have circulated historically — a single `modification` object and a
/// `modifications` array. This type always *emits* the array form and
/// *accepts* either on ingest, so older single-object servers still
/// interoperate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Verdict {
    /// The primary action.
    pub decision: Decision,
    /// How confident the policy is in this verdict, in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// A human-readable explanation, surfaced in logs and denial messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Rewrites to apply when `decision == Decision::Modify`.
    #[serde(
        default,
        alias = "modification",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_modifications"
    )]
    pub modifications: Vec<Modification>,
    /// Escalation details when `decision == Decision::Escalate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,
    /// The policy that produced this verdict, stamped by the invoker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,
    /// The policy's declared version, stamped by the invoker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_version: Option<String>,
    /// Wall-clock time the handler took, in milliseconds, stamped by the
    /// invoker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_ms: Option<f64>,
    /// Free-form debugging detail a policy chooses to attach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Map<String, Value>>,
}

fn deserialize_modifications<'de, D>(deserializer: D) -> Result<Vec<Modification>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        One(Modification),
        Many(Vec<Modification>),
        Absent(Option<Modification>),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::One(modification) => vec![modification],
        Repr::Many(modifications) => modifications,
        Repr::Absent(None) => Vec::new(),
        Repr::Absent(Some(modification)) => vec![modification],
    })
}

impl Verdict {
    fn bare(decision: Decision) -> Self {
        Self {
            decision,
            confidence: default_confidence(),
            reasoning: None,
            modifications: Vec::new(),
            escalation: None,
            policy_name: None,
            policy_version: None,
            evaluation_ms: None,
            trace: None,
        }
    }

    /// An unconditional allow, optionally explained.
    #[must_use]
    pub fn allow(reasoning: impl Into<Option<String>>) -> Self {
        Self {
            reasoning: reasoning.into(),
            ..Self::bare(Decision::Allow)
        }
    }

    /// A denial with a required reason.
    #[must_use]
    pub fn deny(reasoning: impl Into<String>) -> Self {
        Self {
            reasoning: Some(reasoning.into()),
            ..Self::bare(Decision::Deny)
        }
    }

    /// An allow-with-rewrite, carrying one modification.
    #[must_use]
    pub fn modify(target: impl Into<String>, operation: ModificationOperation, value: Value) -> Self {
        Self {
            modifications: vec![Modification {
                target: target.into(),
                operation,
                value,
                path: None,
            }],
            ..Self::bare(Decision::Modify)
        }
    }

    /// A deferral to a human or higher-authority process.
    #[must_use]
    pub fn escalate(escalation: Escalation) -> Self {
        Self {
            escalation: Some(escalation),
            ..Self::bare(Decision::Escalate)
        }
    }

    /// A non-blocking audit outcome, optionally carrying trace detail.
    #[must_use]
    pub fn observe(trace: impl Into<Option<Map<String, Value>>>) -> Self {
        Self {
            trace: trace.into(),
            ..Self::bare(Decision::Observe)
        }
    }

    /// Whether this verdict's `decision` blocks the action.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.decision.is_blocking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_has_default_confidence_and_no_reasoning() {
        let verdict = Verdict::allow(None);
        assert_eq!(verdict.confidence, 1.0);
        assert!(verdict.reasoning.is_none());
    }

    #[test]
    fn modify_round_trips_through_the_plural_wire_shape() {
        let verdict = Verdict::modify(
            crate::modification::targets::OUTPUT,
            ModificationOperation::Replace,
            Value::String("redacted".into()),
        );
        let json = serde_json::to_value(&verdict).unwrap();
        assert!(json["modifications"].is_array());
        assert!(json.get("modification").is_none());

        let parsed: Verdict = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.modifications.len(), 1);
    }

    #[test]
    fn singular_modification_object_is_accepted_on_ingest() {
        let parsed: Verdict = serde_json::from_value(serde_json::json!({
            "decision": "modify",
            "modification": {
                "target": "output",
                "operation": "replace",
                "value": "redacted",
            },
        }))
        .unwrap();
        assert_eq!(parsed.modifications.len(), 1);
        assert_eq!(parsed.modifications[0].target, "output");
    }

    #[test]
    fn verdict_with_no_modification_field_deserializes_to_empty_vec() {
        let parsed: Verdict = serde_json::from_value(serde_json::json!({"decision": "allow"})).unwrap();
        assert!(parsed.modifications.is_empty());
    }

    #[test]
    fn escalate_carries_the_escalation_detail() {
        let verdict = Verdict::escalate(Escalation::new("human_confirm"));
        assert_eq!(verdict.decision, Decision::Escalate);
        assert_eq!(verdict.escalation.unwrap().kind, "human_confirm");
    }
}
