//! Instructions to defer an action to a human or higher-authority process.

use serde::{Deserialize, Serialize};

/// An instruction carried by a `Decision::Escalate` verdict.
///
/// `kind` is a policy-defined tag (e.g. `"human_confirm"`, `"human_review"`)
/// rather than a closed enum, since escalation workflows are defined by
/// whatever host consumes them, not by the core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Escalation {
    /// The escalation workflow this belongs to.
    #[serde(rename = "type")]
    pub kind: String,
    /// A human-readable prompt describing what needs approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// What to do if the escalation is never resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_action: Option<String>,
    /// How long to wait for resolution before falling back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// The choices offered to whoever resolves the escalation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Escalation {
    /// Creates an escalation of the given kind with no other fields set.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            prompt: None,
            fallback_action: None,
            timeout_ms: None,
            options: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_field_renames_on_the_wire() {
        let escalation = Escalation::new("human_confirm");
        let json = serde_json::to_value(&escalation).unwrap();
        assert_eq!(json["type"], "human_confirm");
        assert!(json.get("prompt").is_none());
    }
}
