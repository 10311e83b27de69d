//! Walks an event sequence against a [`PolicyLayer`], mutating a
//! [`LifecycleContext`] in place as modifications arrive.

use apl_layer::PolicyLayer;
use apl_types::{Decision, Event, EventPayload, EventType, SessionMetadata};

use crate::context::LifecycleContext;
use crate::error::{Error, Result};
use crate::reentrancy::Guard;

/// Drives one or more event sequences against `layer` on behalf of one
/// session.
pub struct LifecycleExecutor<'a> {
    layer: &'a PolicyLayer,
    metadata: SessionMetadata,
}

impl<'a> LifecycleExecutor<'a> {
    /// Builds an executor bound to `layer` for the given session.
    #[must_use]
    pub fn new(layer: &'a PolicyLayer, metadata: SessionMetadata) -> Self {
        Self { layer, metadata }
    }

    /// Walks `sequence`, evaluating each event in order and applying any
    /// modifications to `context` before continuing.
    ///
    /// If the thread is already inside an evaluation window (a policy
    /// server's own LLM call re-entering the executor), this is a no-op
    /// that returns `Ok(())` immediately, per the reentrancy guard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Denied`] or [`Error::Escalated`] at the first
    /// event whose composed verdict carries that decision; events already
    /// processed have already applied their modifications to `context`.
    pub async fn run_sequence<R>(
        &self,
        sequence: &[EventType],
        context: &mut LifecycleContext<R>,
    ) -> Result<()> {
        let Some(_guard) = Guard::enter() else {
            return Ok(());
        };

        for &event_type in sequence {
            let payload = build_payload(event_type, context);
            let verdict = self
                .layer
                .evaluate(event_type, context.messages.clone(), payload, self.metadata.clone())
                .await;

            match verdict.decision {
                Decision::Deny => return Err(Error::Denied { verdict }),
                Decision::Escalate => return Err(Error::Escalated { verdict }),
                Decision::Modify => {
                    for modification in &verdict.modifications {
                        context.apply_modification(modification);
                    }
                }
                Decision::Allow | Decision::Observe => {}
            }
        }

        Ok(())
    }
}

fn build_payload<R>(event_type: EventType, context: &LifecycleContext<R>) -> EventPayload {
    let mut payload = EventPayload::new();

    match event_type {
        EventType::LlmPreRequest => {
            payload.llm_model = context.model_name.clone();
        }
        EventType::LlmPostResponse => {
            payload.llm_model = context.model_name.clone();
            payload.llm_response = context.response_text.clone();
        }
        EventType::OutputPreSend => {
            payload.output_text = context.response_text.clone();
        }
        EventType::ToolPreInvoke => {
            payload.tool_name = context.tool_name.clone();
            payload.tool_args = context.tool_args.clone();
        }
        EventType::ToolPostInvoke => {
            payload.tool_name = context.tool_name.clone();
            payload.tool_args = context.tool_args.clone();
            payload.tool_result = context.tool_result.clone();
        }
        EventType::PlanProposed | EventType::PlanApproved => {
            payload.plan = context.proposed_plan.clone();
        }
        EventType::AgentPreHandoff | EventType::AgentPostHandoff => {
            payload.source_agent = context.handoff_source.clone();
            payload.target_agent = context.handoff_target.clone();
            payload.handoff_payload = context.handoff_payload.clone();
        }
        EventType::SessionStart
        | EventType::SessionEnd
        | EventType::InputReceived
        | EventType::InputValidated => {}
    }

    payload
}

/// Builds the event an event sequence walk would send for `event_type`,
/// for callers that want to evaluate a single event directly rather than
/// via [`LifecycleExecutor::run_sequence`].
#[must_use]
pub fn build_event<R>(event_type: EventType, context: &LifecycleContext<R>, metadata: SessionMetadata) -> Event {
    Event::new(event_type, metadata)
        .with_messages(context.messages.clone())
        .with_payload(build_payload(event_type, context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apl_layer::CompositionConfig;
    use serde_json::Value;

    #[tokio::test]
    async fn a_sequence_with_no_servers_allows_every_event() {
        let layer = PolicyLayer::new(CompositionConfig::default());
        let executor = LifecycleExecutor::new(&layer, SessionMetadata::new("s1"));
        let mut context = LifecycleContext::<()>::new(Value::Null);

        executor
            .run_sequence(crate::sequences::LLM_PRE_REQUEST, &mut context)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reentrant_calls_bypass_evaluation() {
        let layer = PolicyLayer::new(CompositionConfig::default());
        let executor = LifecycleExecutor::new(&layer, SessionMetadata::new("s1"));
        let mut context = LifecycleContext::<()>::new(Value::Null);

        let _outer = Guard::enter().unwrap();
        executor
            .run_sequence(crate::sequences::LLM_PRE_REQUEST, &mut context)
            .await
            .unwrap();
    }
}
