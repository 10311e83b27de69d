//! Predefined event sequences binding lifecycle points to event batches.

use apl_types::EventType;

/// Fires before a request reaches the model: raw input arrival, then the
/// about-to-call-the-model checkpoint.
pub const LLM_PRE_REQUEST: &[EventType] = &[EventType::InputReceived, EventType::LlmPreRequest];

/// Fires after the model replies: the response itself, then the
/// about-to-leave-the-process checkpoint.
pub const LLM_POST_RESPONSE: &[EventType] = &[EventType::LlmPostResponse, EventType::OutputPreSend];

/// Fires before a tool executes.
pub const TOOL_PRE_INVOKE: &[EventType] = &[EventType::ToolPreInvoke];

/// Fires after a tool executes.
pub const TOOL_POST_INVOKE: &[EventType] = &[EventType::ToolPostInvoke];

/// Fires before an agent hands off to another agent.
pub const AGENT_PRE_HANDOFF: &[EventType] = &[EventType::AgentPreHandoff];

/// Fires after a handoff between agents completes.
pub const AGENT_POST_HANDOFF: &[EventType] = &[EventType::AgentPostHandoff];

/// Fires once, when a session begins.
pub const SESSION_START: &[EventType] = &[EventType::SessionStart];

/// Fires once, when a session ends.
pub const SESSION_END: &[EventType] = &[EventType::SessionEnd];

/// Fires once, after the host's own input validation runs.
pub const INPUT_VALIDATED: &[EventType] = &[EventType::InputValidated];

/// Fires once, when an agent proposes a plan.
pub const PLAN_PROPOSED: &[EventType] = &[EventType::PlanProposed];

/// Fires once, when a proposed plan is approved.
pub const PLAN_APPROVED: &[EventType] = &[EventType::PlanApproved];

/// Every predefined sequence, for callers that need to confirm every
/// [`EventType`] is reachable through at least one of them.
pub const ALL: &[&[EventType]] = &[
    LLM_PRE_REQUEST,
    LLM_POST_RESPONSE,
    TOOL_PRE_INVOKE,
    TOOL_POST_INVOKE,
    AGENT_PRE_HANDOFF,
    AGENT_POST_HANDOFF,
    SESSION_START,
    SESSION_END,
    INPUT_VALIDATED,
    PLAN_PROPOSED,
    PLAN_APPROVED,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_type_appears_in_at_least_one_sequence() {
        for event_type in EventType::ALL {
            let covered = ALL.iter().any(|sequence| sequence.contains(&event_type));
            assert!(covered, "{event_type:?} appears in no predefined sequence");
        }
    }
}
