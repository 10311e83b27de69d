//! Stage-specific data carried by an [`crate::Event`].
//!
//! Every field is optional; which ones are populated depends on the event's
//! `EventType`. This stays a flat record rather than a tagged union because
//! the wire format requires a flat JSON object and declarative rules address
//! fields by dot-path regardless of which event type produced them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stage-specific payload fields, populated per [`crate::EventType`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventPayload {
    /// Name of the tool being invoked or that was invoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Arguments passed to the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<Value>,
    /// The tool's result, once it has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<Value>,
    /// An error raised by the tool, if it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_error: Option<String>,
    /// The model identifier being called.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    /// The prompt about to be sent to the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_prompt: Option<String>,
    /// The model's response text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_response: Option<String>,
    /// Tokens consumed by the call, if known at this stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_tokens_used: Option<u64>,
    /// Plain-text output about to be sent downstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    /// Structured output about to be sent downstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_structured: Option<Value>,
    /// A proposed plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Value>,
    /// The agent a handoff is directed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_agent: Option<String>,
    /// The agent a handoff originates from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_agent: Option<String>,
    /// The payload being handed off between agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff_payload: Option<Value>,
}

impl EventPayload {
    /// An empty payload, for event types that carry no stage-specific data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for `tool_name`/`tool_args`, matching the
    /// calling convention used by the policy layer's decorator helper.
    #[must_use]
    pub fn with_tool_call(mut self, name: impl Into<String>, args: Value) -> Self {
        self.tool_name = Some(name.into());
        self.tool_args = Some(args);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_serializes_to_empty_object() {
        let payload = EventPayload::new();
        assert_eq!(serde_json::to_value(&payload).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn only_populated_fields_are_emitted() {
        let payload = EventPayload::new().with_tool_call("delete_file", serde_json::json!({"path": "/x"}));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["tool_name"], "delete_file");
        assert!(json.get("llm_model").is_none());
    }
}
