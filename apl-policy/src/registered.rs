//! A policy bound to one or more event types, and the handler it runs.

use std::future::Future;
use std::sync::Arc;

use apl_types::{ContextRequirement, Event, EventType, Verdict};
use async_trait::async_trait;

/// A unit of decision logic attached to one or more event types.
///
/// Handlers are always invoked asynchronously so a plain function can be
/// registered directly via the blanket implementation below; handlers that
/// are naturally synchronous just return an already-resolved future.
#[async_trait]
pub trait PolicyHandler: Send + Sync {
    /// Evaluates one event, producing a verdict.
    async fn handle(&self, event: &Event) -> Verdict;
}

#[async_trait]
impl<F, Fut> PolicyHandler for F
where
    F: Send + Sync + Fn(&Event) -> Fut,
    Fut: Future<Output = Verdict> + Send,
{
    async fn handle(&self, event: &Event) -> Verdict {
        (self)(event).await
    }
}

/// A policy registered against one server: its identity, the event types
/// it fires on, and the handler that evaluates it.
#[derive(Clone)]
pub struct RegisteredPolicy {
    /// Unique name within the server.
    pub name: String,
    /// Policy version, independent of the server's own version.
    pub version: String,
    /// The handler that produces a verdict for a matching event.
    pub handler: Arc<dyn PolicyHandler>,
    /// Event types this policy is registered against.
    pub events: Vec<EventType>,
    /// Dot-paths this policy reads from an event, advertised in the
    /// manifest.
    pub context_requirements: Vec<ContextRequirement>,
    /// Whether this policy's verdict can block the action.
    pub blocking: bool,
    /// The hard deadline applied to this policy's handler.
    pub timeout_ms: u64,
    /// What the policy does, for humans browsing a manifest.
    pub description: Option<String>,
}

impl std::fmt::Debug for RegisteredPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredPolicy")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("events", &self.events)
            .field("blocking", &self.blocking)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`RegisteredPolicy`], mirroring the keyword-argument
/// registration surface a policy author expects: a name, the events it
/// fires on, and sensible defaults for everything else.
pub struct PolicyBuilder {
    name: String,
    version: String,
    events: Vec<EventType>,
    context_requirements: Vec<ContextRequirement>,
    blocking: bool,
    timeout_ms: u64,
    description: Option<String>,
}

impl PolicyBuilder {
    /// Starts building a policy with the given name and event types.
    #[must_use]
    pub fn new(name: impl Into<String>, events: Vec<EventType>) -> Self {
        Self {
            name: name.into(),
            version: "1.0.0".to_owned(),
            events,
            context_requirements: Vec::new(),
            blocking: true,
            timeout_ms: 1000,
            description: None,
        }
    }

    /// Sets the policy's own version. Defaults to `"1.0.0"`.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Declares a dot-path this policy reads from an event.
    #[must_use]
    pub fn context(mut self, requirement: ContextRequirement) -> Self {
        self.context_requirements.push(requirement);
        self
    }

    /// Sets whether this policy's verdict can block the action. Defaults to
    /// `true`.
    #[must_use]
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Sets the hard deadline applied to this policy's handler, in
    /// milliseconds. Defaults to `1000`.
    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets a human-readable description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Finishes the builder, attaching the handler that evaluates this
    /// policy.
    #[must_use]
    pub fn build(self, handler: impl PolicyHandler + 'static) -> RegisteredPolicy {
        RegisteredPolicy {
            name: self.name,
            version: self.version,
            handler: Arc::new(handler),
            events: self.events,
            context_requirements: self.context_requirements,
            blocking: self.blocking,
            timeout_ms: self.timeout_ms,
            description: self.description,
        }
    }
}
