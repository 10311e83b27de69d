//! Instructions for rewriting an in-flight action.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known `target` names understood by the lifecycle executor.
///
/// `target` is deliberately an open string rather than a closed enum: a
/// policy server is free to address targets the executor doesn't know
/// about, and an executor that doesn't recognize a target simply ignores
/// the modification rather than failing the action.
pub mod targets {
    /// Rewrites the request messages.
    pub const INPUT: &str = "input";
    /// Rewrites the prompt about to be sent to the model.
    pub const LLM_PROMPT: &str = "llm_prompt";
    /// Rewrites the response text.
    pub const OUTPUT: &str = "output";
    /// Rewrites a tool's arguments.
    pub const TOOL_ARGS: &str = "tool_args";
    /// Rewrites a tool's result.
    pub const TOOL_RESULT: &str = "tool_result";
    /// Rewrites a proposed plan.
    pub const PLAN: &str = "plan";
    /// Rewrites a handoff payload.
    pub const HANDOFF_PAYLOAD: &str = "handoff_payload";
}

/// How a [`Modification`] applies its `value` to the target.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationOperation {
    /// Replace the target wholesale with `value`.
    Replace,
    /// Append `value` to the target.
    Append,
    /// Apply `value` as a partial patch to the target.
    Patch,
    /// Replace the target with a redacted form of itself (`value` carries
    /// the redacted replacement, e.g. `"[SSN REDACTED]"`).
    Redact,
}

/// An instruction to mutate an agent input or output before it is consumed
/// downstream. Never applied to the originating [`crate::Event`] itself —
/// only to the mutable context the lifecycle executor threads through an
/// action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Modification {
    /// Which part of the action this modification addresses.
    pub target: String,
    /// How `value` should be applied.
    pub operation: ModificationOperation,
    /// The replacement, appended, or patch value.
    pub value: Value,
    /// Optional sub-path within the target, for `patch` operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Modification {
    /// Convenience constructor for a whole-value replacement.
    #[must_use]
    pub fn replace(target: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            target: target.into(),
            operation: ModificationOperation::Replace,
            value: value.into(),
            path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_omits_path_when_absent() {
        let modification = Modification::replace(targets::OUTPUT, "redacted");
        let json = serde_json::to_value(&modification).unwrap();
        assert!(json.get("path").is_none());
        assert_eq!(json["operation"], "replace");
    }
}
