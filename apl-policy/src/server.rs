//! The facade a policy author builds and a transport hosts.

use apl_types::{Event, PolicyDefinition, PolicyManifest, Verdict};

use crate::error::Result;
use crate::registered::RegisteredPolicy;
use crate::registry::PolicyRegistry;

/// A running set of registered policies, identified by a name and version.
///
/// `PolicyServer` only knows how to register policies and evaluate events
/// against them; it has no opinion on how events arrive. A transport (stdio,
/// HTTP, or an in-process call) wraps a `PolicyServer` and drives it.
pub struct PolicyServer {
    name: String,
    version: String,
    description: Option<String>,
    documentation_url: Option<String>,
    registry: PolicyRegistry,
}

impl PolicyServer {
    /// Creates an empty server with the given name and version.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            documentation_url: None,
            registry: PolicyRegistry::new(),
        }
    }

    /// Sets the server's human-readable description, shown in its manifest.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a link to this server's documentation, shown in its manifest.
    #[must_use]
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Registers a policy.
    ///
    /// # Errors
    ///
    /// See [`PolicyRegistry::register`].
    pub fn register(&mut self, policy: RegisteredPolicy) -> Result<()> {
        self.registry.register(policy)
    }

    /// Evaluates an event against every policy registered for its type.
    pub async fn evaluate(&self, event: &Event) -> Vec<Verdict> {
        self.registry.evaluate_event(event).await
    }

    /// The server's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The server's own version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Builds this server's manifest from its currently registered policies.
    #[must_use]
    pub fn manifest(&self) -> PolicyManifest {
        let mut manifest = PolicyManifest::new(self.name.clone(), self.version.clone());
        manifest.description = self.description.clone();
        manifest.documentation_url = self.documentation_url.clone();
        manifest.supports_batch = true;
        manifest.policies = self
            .registry
            .all_policies()
            .map(|policy| PolicyDefinition {
                name: policy.name.clone(),
                version: policy.version.clone(),
                description: policy.description.clone(),
                events: policy.events.clone(),
                context_requirements: policy.context_requirements.clone(),
                blocking: policy.blocking,
                timeout_ms: policy.timeout_ms,
                author: None,
                tags: Vec::new(),
            })
            .collect();
        manifest
    }
}

#[cfg(test)]
mod tests {
    use apl_types::{Decision, EventType, SessionMetadata};

    use super::*;
    use crate::registered::PolicyBuilder;

    #[test]
    fn manifest_reflects_registered_policies() {
        let mut server = PolicyServer::new("guardrails", "1.2.0").with_description("blocks bad stuff");
        server
            .register(
                PolicyBuilder::new("pii-filter", vec![EventType::OutputPreSend])
                    .timeout_ms(250)
                    .build(|_event: &Event| async move { Verdict::allow(None) }),
            )
            .unwrap();

        let manifest = server.manifest();
        assert_eq!(manifest.server_name, "guardrails");
        assert_eq!(manifest.description.as_deref(), Some("blocks bad stuff"));
        assert_eq!(manifest.policies.len(), 1);
        assert_eq!(manifest.policies[0].name, "pii-filter");
        assert_eq!(manifest.policies[0].timeout_ms, 250);
    }

    #[tokio::test]
    async fn evaluate_delegates_to_the_registry() {
        let mut server = PolicyServer::new("s", "1.0.0");
        server
            .register(
                PolicyBuilder::new("deny-all", vec![EventType::InputReceived])
                    .build(|_event: &Event| async move { Verdict::deny("nope") }),
            )
            .unwrap();

        let event = Event::new(EventType::InputReceived, SessionMetadata::new("sess"));
        let verdicts = server.evaluate(&event).await;
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].decision, Decision::Deny);
    }
}
