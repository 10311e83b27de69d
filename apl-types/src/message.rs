//! Chat-completion-compatible conversation messages.

use serde::{Deserialize, Serialize};

/// The speaker of a [`Message`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// System instructions.
    System,
    /// The end user.
    User,
    /// The model's own reply.
    Assistant,
    /// A tool's result, correlated by `tool_call_id`.
    Tool,
}

/// A single entry in a chat-completion-style conversation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Who is speaking.
    pub role: MessageRole,
    /// The message body, always flattened to a plain string on emission.
    pub content: MessageContent,
    /// The function/tool name this message corresponds to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Correlates a `tool` message with the call that produced it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool calls requested by an assistant message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    /// Builds a minimal message with no tool metadata.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
            name: None,
            tool_call_id: None,
            tool_calls: None,
        }
    }

    /// Returns the message body as a single string, concatenating any
    /// multi-part content the way ingestion from an external SDK would.
    #[must_use]
    pub fn content_text(&self) -> String {
        self.content.as_text()
    }
}

/// A tool invocation requested by an assistant message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique id for correlating the eventual `tool` response message.
    pub id: String,
    /// The call kind; always `"function"` on the wire today.
    #[serde(rename = "type")]
    pub kind: String,
    /// The function being called.
    pub function: FunctionCall,
}

/// The function half of a [`ToolCall`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionCall {
    /// The function name.
    pub name: String,
    /// The JSON-encoded argument string, preserved verbatim.
    pub arguments: String,
}

/// A message body: either a plain string or a sequence of typed parts.
///
/// External SDKs commonly emit `content` as a list of `{type, text}` parts
/// for multi-modal messages; on ingestion those text parts are concatenated,
/// and on emission a single string is always produced.
#[derive(Clone, Debug)]
pub enum MessageContent {
    /// A plain string body.
    Text(String),
    /// Multiple typed parts, as received from an external SDK.
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Flattens the content to a single string, concatenating text parts.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// One typed part of a multi-part message body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentPart {
    /// The part kind, e.g. `"text"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The text payload, present when `kind == "text"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Serialize for MessageContent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_text())
    }
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Parts(Vec<ContentPart>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Ok(MessageContent::Text(text)),
            Repr::Parts(parts) => Ok(MessageContent::Parts(parts)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_message_round_trips() {
        let message = Message::new(MessageRole::User, "hi");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn multi_part_content_concatenates_on_ingest() {
        let parsed: Message = serde_json::from_value(serde_json::json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "hello "},
                {"type": "text", "text": "world"},
            ],
        }))
        .unwrap();
        assert_eq!(parsed.content_text(), "hello world");
    }

    #[test]
    fn assistant_message_with_tool_calls() {
        let message = Message {
            role: MessageRole::Assistant,
            content: MessageContent::Text(String::new()),
            name: None,
            tool_call_id: None,
            tool_calls: Some(vec![ToolCall {
                id: "tc-1".into(),
                kind: "function".into(),
                function: FunctionCall {
                    name: "search".into(),
                    arguments: "{\"q\":\"test\"}".into(),
                },
            }]),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["tool_calls"][0]["function"]["name"], "search");
        assert_eq!(json["tool_calls"][0]["function"]["arguments"], "{\"q\":\"test\"}");
    }
}
