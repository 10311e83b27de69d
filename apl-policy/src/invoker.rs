//! Timed, fail-open invocation of a single registered policy.

use std::time::Duration;

use apl_types::{Event, Verdict};
use tracing::{error, warn};

use crate::registered::RegisteredPolicy;

/// Invokes one policy's handler against one event.
///
/// The handler runs on its own task so a panic inside it unwinds there,
/// not here. Both a timeout and a panic fail open to `allow`, stamped
/// with the policy's identity and elapsed time.
pub async fn invoke_policy_handler(policy: &RegisteredPolicy, event: &Event) -> Verdict {
    let start = tokio::time::Instant::now();
    let deadline = Duration::from_millis(policy.timeout_ms);
    let handler = policy.handler.clone();
    let event = event.clone();

    let task = tokio::spawn(async move { handler.handle(&event).await });

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(verdict)) => enrich(verdict, policy, elapsed_ms(start)),
        Ok(Err(join_err)) => {
            let message = panic_message(join_err);
            error!(policy = %policy.name, error = %message, "policy handler panicked");
            fail_open(policy, format!("Policy error: {message}"), elapsed_ms(start))
        }
        Err(_) => {
            let elapsed = elapsed_ms(start);
            warn!(policy = %policy.name, elapsed_ms = elapsed, "policy timed out");
            fail_open(
                policy,
                format!("Policy timed out after {}ms", policy.timeout_ms),
                elapsed,
            )
        }
    }
}

fn elapsed_ms(start: tokio::time::Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Recovers the panic payload from a [`tokio::task::JoinError`] as text, for
/// inclusion in a fail-open verdict's reasoning.
fn panic_message(join_err: tokio::task::JoinError) -> String {
    match join_err.try_into_panic() {
        Ok(payload) => {
            if let Some(message) = payload.downcast_ref::<&str>() {
                (*message).to_owned()
            } else if let Some(message) = payload.downcast_ref::<String>() {
                message.clone()
            } else {
                "non-string panic payload".to_owned()
            }
        }
        Err(join_err) => join_err.to_string(),
    }
}

fn enrich(verdict: Verdict, policy: &RegisteredPolicy, elapsed_ms: f64) -> Verdict {
    let mut verdict = verdict;
    verdict.policy_name = Some(policy.name.clone());
    verdict.policy_version = Some(policy.version.clone());
    verdict.evaluation_ms = Some(elapsed_ms);
    verdict
}

fn fail_open(policy: &RegisteredPolicy, reasoning: String, elapsed_ms: f64) -> Verdict {
    Verdict {
        policy_name: Some(policy.name.clone()),
        policy_version: Some(policy.version.clone()),
        evaluation_ms: Some(elapsed_ms),
        ..Verdict::allow(reasoning)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use apl_types::{Decision, SessionMetadata};

    use super::*;
    use crate::registered::PolicyBuilder;

    fn event() -> Event {
        Event::new(apl_types::EventType::OutputPreSend, SessionMetadata::new("s1"))
    }

    #[tokio::test]
    async fn a_slow_handler_fails_open_with_timeout_reasoning() {
        let policy = PolicyBuilder::new("slow", vec![apl_types::EventType::OutputPreSend])
            .timeout_ms(10)
            .build(|_event: &Event| async move {
                tokio::time::sleep(StdDuration::from_millis(200)).await;
                Verdict::deny("too slow to matter")
            });

        let verdict = invoke_policy_handler(&policy, &event()).await;
        assert_eq!(verdict.decision, Decision::Allow);
        assert!(verdict.reasoning.unwrap().contains("timed out"));
        assert_eq!(verdict.policy_name.as_deref(), Some("slow"));
        assert!(verdict.evaluation_ms.unwrap() >= 10.0);
    }

    #[tokio::test]
    async fn a_fast_handler_is_stamped_with_policy_metadata() {
        let policy = PolicyBuilder::new("fast", vec![apl_types::EventType::OutputPreSend])
            .version("2.0.0")
            .build(|_event: &Event| async move { Verdict::allow(None) });

        let verdict = invoke_policy_handler(&policy, &event()).await;
        assert_eq!(verdict.policy_name.as_deref(), Some("fast"));
        assert_eq!(verdict.policy_version.as_deref(), Some("2.0.0"));
        assert!(verdict.evaluation_ms.is_some());
    }

    #[tokio::test]
    async fn a_panicking_handler_fails_open_instead_of_propagating() {
        let policy = PolicyBuilder::new("panicky", vec![apl_types::EventType::OutputPreSend])
            .build(|_event: &Event| async move { panic!("boom") });

        let verdict = invoke_policy_handler(&policy, &event()).await;
        assert_eq!(verdict.decision, Decision::Allow);
        let reasoning = verdict.reasoning.unwrap();
        assert!(reasoning.contains("error"));
        assert!(reasoning.contains("boom"));
        assert_eq!(verdict.policy_name.as_deref(), Some("panicky"));
    }

    #[test]
    fn handler_is_cloneable() {
        let policy = PolicyBuilder::new("p", vec![apl_types::EventType::OutputPreSend])
            .build(|_event: &Event| async move { Verdict::allow(None) });
        let _clone: Arc<dyn crate::registered::PolicyHandler> = policy.handler.clone();
    }
}
