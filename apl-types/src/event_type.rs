//! The closed set of lifecycle points an agent runtime can emit.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A lifecycle point in an agent action, identified by a dotted wire name.
///
/// The dotted string is the canonical wire form; `Display`/`FromStr` and
/// serde both route through it so `EventType::TOOL_PRE_INVOKE.to_string()`
/// always equals the value used in a declarative manifest's `events:` list.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventType {
    /// A new session began.
    SessionStart,
    /// A session ended.
    SessionEnd,
    /// Raw input arrived from the user.
    InputReceived,
    /// Input passed whatever validation the host performs.
    InputValidated,
    /// The model is about to be called.
    LlmPreRequest,
    /// The model returned a response.
    LlmPostResponse,
    /// A tool is about to execute.
    ToolPreInvoke,
    /// A tool finished executing.
    ToolPostInvoke,
    /// Output is about to be sent to the user.
    OutputPreSend,
    /// An agent proposed a plan.
    PlanProposed,
    /// A proposed plan was approved.
    PlanApproved,
    /// An agent is about to hand off to another agent.
    AgentPreHandoff,
    /// A handoff to another agent completed.
    AgentPostHandoff,
}

impl EventType {
    /// All known event types, in declaration order.
    pub const ALL: [EventType; 13] = [
        EventType::SessionStart,
        EventType::SessionEnd,
        EventType::InputReceived,
        EventType::InputValidated,
        EventType::LlmPreRequest,
        EventType::LlmPostResponse,
        EventType::ToolPreInvoke,
        EventType::ToolPostInvoke,
        EventType::OutputPreSend,
        EventType::PlanProposed,
        EventType::PlanApproved,
        EventType::AgentPreHandoff,
        EventType::AgentPostHandoff,
    ];

    /// The canonical dotted wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventType::SessionStart => "session.start",
            EventType::SessionEnd => "session.end",
            EventType::InputReceived => "input.received",
            EventType::InputValidated => "input.validated",
            EventType::LlmPreRequest => "llm.pre_request",
            EventType::LlmPostResponse => "llm.post_response",
            EventType::ToolPreInvoke => "tool.pre_invoke",
            EventType::ToolPostInvoke => "tool.post_invoke",
            EventType::OutputPreSend => "output.pre_send",
            EventType::PlanProposed => "plan.proposed",
            EventType::PlanApproved => "plan.approved",
            EventType::AgentPreHandoff => "agent.pre_handoff",
            EventType::AgentPostHandoff => "agent.post_handoff",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == s)
            .ok_or_else(|| Error::UnknownEventType(s.to_owned()))
    }
}

impl TryFrom<String> for EventType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_variants_have_a_dotted_value() {
        for event_type in EventType::ALL {
            assert!(event_type.as_str().contains('.'));
        }
    }

    #[test]
    fn round_trips_through_string() {
        for event_type in EventType::ALL {
            let parsed: EventType = event_type.as_str().parse().expect("parse");
            assert_eq!(event_type, parsed);
        }
    }

    #[test]
    fn from_str_matches_canonical_wire_names() {
        assert_eq!(
            "input.received".parse::<EventType>().unwrap(),
            EventType::InputReceived
        );
        assert_eq!(
            "llm.pre_request".parse::<EventType>().unwrap(),
            EventType::LlmPreRequest
        );
        assert!("bogus.event".parse::<EventType>().is_err());
    }

    #[test]
    fn serializes_to_canonical_json_string() {
        let json = serde_json::to_string(&EventType::ToolPreInvoke).unwrap();
        assert_eq!(json, "\"tool.pre_invoke\"");
    }
}
