//! Maps event types to the policies registered against them.

use std::collections::HashMap;

use apl_types::{Event, EventType, Verdict};

use crate::error::{Error, Result};
use crate::invoker::invoke_policy_handler;
use crate::registered::RegisteredPolicy;

/// Holds every policy registered against one server and dispatches events
/// to the ones that apply.
///
/// Registration order is preserved per event type: policies fire in the
/// order they were added, and [`PolicyRegistry::evaluate_event`] returns
/// their verdicts in that same order so a composition strategy can apply
/// priority rules deterministically.
#[derive(Default)]
pub struct PolicyRegistry {
    by_name: HashMap<String, RegisteredPolicy>,
    by_event: HashMap<EventType, Vec<RegisteredPolicy>>,
}

impl PolicyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy against every event type it declared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`] if a policy with the same name is
    /// already registered, or [`Error::NoEventTypes`] if the policy was
    /// built with an empty event list.
    pub fn register(&mut self, policy: RegisteredPolicy) -> Result<()> {
        if policy.events.is_empty() {
            return Err(Error::NoEventTypes { name: policy.name });
        }
        if self.by_name.contains_key(&policy.name) {
            return Err(Error::DuplicateName { name: policy.name });
        }

        for event_type in &policy.events {
            self.by_event.entry(*event_type).or_default().push(policy.clone());
        }
        self.by_name.insert(policy.name.clone(), policy);
        Ok(())
    }

    /// Looks up a registered policy by name.
    #[must_use]
    pub fn get_policy_by_name(&self, name: &str) -> Option<&RegisteredPolicy> {
        self.by_name.get(name)
    }

    /// Returns the policies registered against one event type, in
    /// registration order.
    #[must_use]
    pub fn handlers_for_event_type(&self, event_type: EventType) -> &[RegisteredPolicy] {
        self.by_event.get(&event_type).map_or(&[], Vec::as_slice)
    }

    /// Returns every registered policy, in an unspecified order.
    pub fn all_policies(&self) -> impl Iterator<Item = &RegisteredPolicy> {
        self.by_name.values()
    }

    /// Evaluates an event against every policy registered for its type.
    ///
    /// If no policy is registered for `event.event_type`, returns a single
    /// synthetic `allow` verdict rather than an empty list, so callers never
    /// have to special-case "nothing applied" separately from "everything
    /// allowed".
    pub async fn evaluate_event(&self, event: &Event) -> Vec<Verdict> {
        let handlers = self.handlers_for_event_type(event.event_type);
        if handlers.is_empty() {
            return vec![Verdict::allow("No policies registered for this event")];
        }

        let mut verdicts = Vec::with_capacity(handlers.len());
        for policy in handlers {
            verdicts.push(invoke_policy_handler(policy, event).await);
        }
        verdicts
    }
}

#[cfg(test)]
mod tests {
    use apl_types::{EventType, SessionMetadata};

    use super::*;
    use crate::registered::PolicyBuilder;

    fn policy(name: &str, events: Vec<EventType>) -> RegisteredPolicy {
        PolicyBuilder::new(name, events).build(|_event: &Event| async move { Verdict::allow(None) })
    }

    #[test]
    fn registering_the_same_name_twice_is_rejected() {
        let mut registry = PolicyRegistry::new();
        registry.register(policy("dup", vec![EventType::InputReceived])).unwrap();

        let err = registry.register(policy("dup", vec![EventType::OutputPreSend])).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { name } if name == "dup"));
    }

    #[test]
    fn registering_with_no_event_types_is_rejected() {
        let mut registry = PolicyRegistry::new();
        let err = registry.register(policy("orphan", vec![])).unwrap_err();
        assert!(matches!(err, Error::NoEventTypes { name } if name == "orphan"));
    }

    #[tokio::test]
    async fn an_event_with_no_registered_policies_allows_by_default() {
        let registry = PolicyRegistry::new();
        let event = Event::new(EventType::InputReceived, SessionMetadata::new("s1"));

        let verdicts = registry.evaluate_event(&event).await;
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].decision, apl_types::Decision::Allow);
    }

    #[tokio::test]
    async fn policies_fire_in_registration_order_for_their_event_type() {
        let mut registry = PolicyRegistry::new();
        registry
            .register(PolicyBuilder::new("first", vec![EventType::InputReceived]).build(
                |_event: &Event| async move { Verdict::allow("first") },
            ))
            .unwrap();
        registry
            .register(PolicyBuilder::new("second", vec![EventType::InputReceived]).build(
                |_event: &Event| async move { Verdict::allow("second") },
            ))
            .unwrap();

        let event = Event::new(EventType::InputReceived, SessionMetadata::new("s1"));
        let verdicts = registry.evaluate_event(&event).await;

        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts[0].policy_name.as_deref(), Some("first"));
        assert_eq!(verdicts[1].policy_name.as_deref(), Some("second"));
    }
}
