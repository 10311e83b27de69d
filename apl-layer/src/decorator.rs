//! Wraps a tool call with a policy evaluation.

use std::future::Future;

use apl_types::{targets, Decision, EventPayload, EventType, ModificationOperation, SessionMetadata};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::layer::PolicyLayer;

/// Evaluates `event_type` for a tool call before invoking it.
///
/// Builds an event carrying `tool_name`/`tool_args`, evaluates it against
/// `layer`, then:
/// - `allow`/`observe` invokes `f` with `tool_args` unchanged.
/// - `modify` splices the verdict's `tool_args` replacement into the
///   arguments before invoking `f`, if the verdict carries one; other
///   modification targets are ignored since they address no part of a
///   tool call.
/// - `deny` returns [`Error::PolicyDenied`] without invoking `f`.
/// - `escalate` returns [`Error::PolicyEscalation`] without invoking `f`.
///
/// # Errors
///
/// Returns [`Error::PolicyDenied`] or [`Error::PolicyEscalation`] per the
/// rules above. Never fails for any other reason; a malfunctioning policy
/// server already resolves to fail-open `allow` inside the layer.
pub async fn guarded_call<F, Fut, T>(
    layer: &PolicyLayer,
    event_type: EventType,
    metadata: SessionMetadata,
    tool_name: impl Into<String>,
    mut tool_args: Value,
    f: F,
) -> Result<T>
where
    F: FnOnce(Value) -> Fut,
    Fut: Future<Output = T>,
{
    let payload = EventPayload::new().with_tool_call(tool_name, tool_args.clone());
    let verdict = layer.evaluate(event_type, Vec::new(), payload, metadata).await;

    match verdict.decision {
        Decision::Deny => Err(Error::PolicyDenied { verdict }),
        Decision::Escalate => Err(Error::PolicyEscalation { verdict }),
        Decision::Modify => {
            for modification in &verdict.modifications {
                if modification.target == targets::TOOL_ARGS
                    && modification.operation == ModificationOperation::Replace
                {
                    tool_args = modification.value.clone();
                }
            }
            Ok(f(tool_args).await)
        }
        Decision::Allow | Decision::Observe => Ok(f(tool_args).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompositionConfig;

    #[tokio::test]
    async fn no_servers_means_allow_and_the_call_proceeds() {
        let layer = PolicyLayer::new(CompositionConfig::default());
        let result = guarded_call(
            &layer,
            EventType::ToolPreInvoke,
            SessionMetadata::new("s1"),
            "delete_file",
            serde_json::json!({"path": "/tmp/x"}),
            |args| async move { args["path"].as_str().unwrap().to_owned() },
        )
        .await
        .unwrap();
        assert_eq!(result, "/tmp/x");
    }
}
