//! The mutable state a lifecycle executor threads through one action.

use apl_types::{targets, Message, Modification};
use serde_json::Value;

/// Rewrites a chunk of raw SDK messages back into the kwargs a call
/// expects, after the executor's normalized [`Message`] list has been
/// modified by a policy.
pub type MessageAdapter = Box<dyn FnMut(&[Message]) -> Value + Send>;

/// Applies new response text back onto the underlying SDK response object
/// `R`, so a caller that already holds `R` sees the rewritten text.
pub type ResponseTextApplier<R> = Box<dyn FnMut(&mut R, &str) + Send>;

/// State carried across one walk of an event sequence.
///
/// Holds both the raw request shape a host SDK expects and the normalized
/// view the policy layer evaluates against, plus whichever of tool,
/// plan, or handoff fields apply to the action in progress. Unused
/// fields are simply left at their default; which ones a given event
/// sequence reads is fixed by [`crate::sequences`] and the payload
/// builder in [`crate::executor`].
pub struct LifecycleContext<R> {
    /// The request messages exactly as the host SDK passed them in.
    pub raw_messages: Value,
    /// The normalized conversation, kept in sync with `raw_messages` via
    /// `message_adapter_to_raw` whenever a policy rewrites it.
    pub messages: Vec<Message>,
    /// The kwargs the call was originally invoked with.
    pub original_kwargs: Value,
    /// The kwargs actually passed onward, after any modification.
    pub modified_kwargs: Value,
    /// The model identifier this action targets, if known.
    pub model_name: Option<String>,
    /// The SDK's own response object, if the action has produced one yet.
    pub response: Option<R>,
    /// The response text extracted from `response`, or accumulated from a
    /// stream.
    pub response_text: Option<String>,
    /// The tool being invoked, for tool actions.
    pub tool_name: Option<String>,
    /// The tool's arguments, for tool actions.
    pub tool_args: Option<Value>,
    /// The tool's result, once it has run.
    pub tool_result: Option<Value>,
    /// A plan proposed by the agent.
    pub proposed_plan: Option<Value>,
    /// The agent a handoff originates from.
    pub handoff_source: Option<String>,
    /// The agent a handoff is directed to.
    pub handoff_target: Option<String>,
    /// The payload being handed off.
    pub handoff_payload: Option<Value>,
    response_text_applier: Option<ResponseTextApplier<R>>,
    message_adapter_to_raw: Option<MessageAdapter>,
}

impl<R> LifecycleContext<R> {
    /// Builds an empty context around `original_kwargs`, with no messages,
    /// tool, plan, or handoff data set yet.
    #[must_use]
    pub fn new(original_kwargs: Value) -> Self {
        Self {
            raw_messages: Value::Null,
            messages: Vec::new(),
            modified_kwargs: original_kwargs.clone(),
            original_kwargs,
            model_name: None,
            response: None,
            response_text: None,
            tool_name: None,
            tool_args: None,
            tool_result: None,
            proposed_plan: None,
            handoff_source: None,
            handoff_target: None,
            handoff_payload: None,
            response_text_applier: None,
            message_adapter_to_raw: None,
        }
    }

    /// Attaches the normalized message list, replacing any already set.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Registers the callback that writes rewritten messages back into the
    /// kwargs the host SDK expects.
    #[must_use]
    pub fn with_message_adapter(mut self, adapter: MessageAdapter) -> Self {
        self.message_adapter_to_raw = Some(adapter);
        self
    }

    /// Registers the callback that writes rewritten text back onto the
    /// SDK's own response object.
    #[must_use]
    pub fn with_response_text_applier(mut self, applier: ResponseTextApplier<R>) -> Self {
        self.response_text_applier = Some(applier);
        self
    }

    /// Applies one modification per the target table: `input`/`llm_prompt`
    /// rewrite the request messages, `output` rewrites response text and
    /// invokes the response-text-applier, `tool_args`/`tool_result`/`plan`/
    /// `handoff_payload` overwrite the matching context field. A target
    /// this executor does not recognize is ignored rather than failing
    /// the action.
    pub fn apply_modification(&mut self, modification: &Modification) {
        match modification.target.as_str() {
            t if t == targets::INPUT || t == targets::LLM_PROMPT => {
                if let Ok(messages) = serde_json::from_value::<Vec<Message>>(modification.value.clone()) {
                    self.messages = messages;
                    if let Some(adapter) = self.message_adapter_to_raw.as_mut() {
                        self.modified_kwargs = adapter(&self.messages);
                    }
                }
            }
            t if t == targets::OUTPUT => {
                let text = value_as_text(&modification.value);
                self.response_text = Some(text.clone());
                if let (Some(applier), Some(response)) =
                    (self.response_text_applier.as_mut(), self.response.as_mut())
                {
                    applier(response, &text);
                }
            }
            t if t == targets::TOOL_ARGS => self.tool_args = Some(modification.value.clone()),
            t if t == targets::TOOL_RESULT => self.tool_result = Some(modification.value.clone()),
            t if t == targets::PLAN => self.proposed_plan = Some(modification.value.clone()),
            t if t == targets::HANDOFF_PAYLOAD => self.handoff_payload = Some(modification.value.clone()),
            _ => {}
        }
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apl_types::MessageRole;

    #[test]
    fn output_modification_updates_text_and_invokes_applier() {
        let applied = std::sync::Arc::new(std::sync::Mutex::new(None));
        let applied_clone = applied.clone();
        let mut context = LifecycleContext::<String>::new(Value::Null)
            .with_response_text_applier(Box::new(move |response, text| {
                *response = text.to_owned();
                *applied_clone.lock().unwrap() = Some(text.to_owned());
            }));
        context.response = Some(String::new());

        context.apply_modification(&Modification::replace(targets::OUTPUT, "redacted"));

        assert_eq!(context.response_text.as_deref(), Some("redacted"));
        assert_eq!(context.response.as_deref(), Some("redacted"));
        assert_eq!(applied.lock().unwrap().as_deref(), Some("redacted"));
    }

    #[test]
    fn input_modification_replaces_messages_and_adapts_kwargs() {
        let mut context = LifecycleContext::<()>::new(Value::Null).with_message_adapter(Box::new(|messages| {
            serde_json::json!({"messages": messages.iter().map(Message::content_text).collect::<Vec<_>>()})
        }));

        let new_messages = serde_json::to_value(vec![Message::new(MessageRole::User, "rewritten")]).unwrap();
        context.apply_modification(&Modification::replace(targets::INPUT, new_messages));

        assert_eq!(context.messages.len(), 1);
        assert_eq!(context.modified_kwargs["messages"][0], "rewritten");
    }

    #[test]
    fn unrecognized_target_is_ignored() {
        let mut context = LifecycleContext::<()>::new(Value::Null);
        context.apply_modification(&Modification::replace("something_unknown", "x"));
        assert!(context.tool_args.is_none());
    }
}
