//! The multi-server policy facade.

use std::time::Duration;

use apl_composition::CompositionStrategy;
use apl_transport::PolicyClient;
use apl_types::{Decision, Event, EventPayload, EventType, Message, SessionMetadata, Verdict};
use futures::future::{join_all, try_join_all};
use tokio::sync::Mutex;
use tracing::warn;

use crate::config::CompositionConfig;
use crate::error::{Error, Result};

struct ServerSlot {
    uri: String,
    client: Mutex<Option<PolicyClient>>,
}

/// Owns an ordered list of policy clients and fans an event out to all of
/// them, reducing their verdicts to one via a [`CompositionConfig`].
pub struct PolicyLayer {
    servers: Vec<ServerSlot>,
    config: CompositionConfig,
}

impl PolicyLayer {
    /// Creates a layer with no servers yet registered.
    #[must_use]
    pub fn new(config: CompositionConfig) -> Self {
        Self {
            servers: Vec::new(),
            config,
        }
    }

    /// Appends a server, identified by URI. No connection is made until
    /// [`PolicyLayer::connect`] or the first [`PolicyLayer::evaluate`].
    pub fn add_server(&mut self, uri: impl Into<String>) -> &mut Self {
        self.servers.push(ServerSlot {
            uri: uri.into(),
            client: Mutex::new(None),
        });
        self
    }

    /// Connects every server that is not already connected, concurrently.
    /// Calling this more than once is a no-op for already-connected
    /// servers.
    ///
    /// # Errors
    ///
    /// Returns the first connection failure encountered; servers already
    /// connected stay connected.
    pub async fn connect(&self) -> Result<()> {
        let futures = self.servers.iter().map(|slot| async move {
            let mut guard = slot.client.lock().await;
            if guard.is_none() {
                *guard = Some(PolicyClient::connect(&slot.uri).await?);
            }
            Ok::<(), Error>(())
        });
        try_join_all(futures).await?;
        Ok(())
    }

    /// Builds an event from its parts, fans it out to every connected
    /// server, and returns the composed verdict.
    ///
    /// Connects any not-yet-connected servers first. A server that fails
    /// to connect, or whose evaluate call fails, contributes no verdicts
    /// rather than failing the whole evaluation. If the overall
    /// `timeout_ms` deadline elapses, the event is treated as if no
    /// verdicts were collected, and [`CompositionConfig::on_timeout`]
    /// supplies the composed decision.
    pub async fn evaluate(
        &self,
        event_type: EventType,
        messages: Vec<Message>,
        payload: EventPayload,
        metadata: SessionMetadata,
    ) -> Verdict {
        let event = Event::new(event_type, metadata)
            .with_messages(messages)
            .with_payload(payload);

        let deadline = Duration::from_millis(self.config.timeout_ms);
        let gather = async {
            if self.config.parallel {
                self.evaluate_parallel(&event).await
            } else {
                self.evaluate_sequential(&event).await
            }
        };

        match tokio::time::timeout(deadline, gather).await {
            Ok(verdicts) => self.config.mode.strategy().compose(&verdicts),
            Err(_) => {
                warn!(timeout_ms = self.config.timeout_ms, "policy layer evaluation deadline exceeded");
                self.timeout_verdict()
            }
        }
    }

    /// Closes every connected server, terminating any spawned subprocess.
    pub async fn close(&self) {
        for slot in &self.servers {
            let mut guard = slot.client.lock().await;
            if let Some(client) = guard.take() {
                if let Err(error) = client.close().await {
                    warn!(uri = %slot.uri, %error, "error closing policy client");
                }
            }
        }
    }

    async fn evaluate_parallel(&self, event: &Event) -> Vec<Verdict> {
        join_all(self.servers.iter().map(|slot| self.evaluate_one(slot, event)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn evaluate_sequential(&self, event: &Event) -> Vec<Verdict> {
        let mut all = Vec::new();
        for slot in &self.servers {
            all.extend(self.evaluate_one(slot, event).await);
        }
        all
    }

    async fn evaluate_one(&self, slot: &ServerSlot, event: &Event) -> Vec<Verdict> {
        let mut guard = slot.client.lock().await;
        if guard.is_none() {
            match PolicyClient::connect(&slot.uri).await {
                Ok(client) => *guard = Some(client),
                Err(error) => {
                    warn!(uri = %slot.uri, %error, "failed to connect to policy server");
                    return Vec::new();
                }
            }
        }

        let client = guard.as_mut().expect("connected above");
        match client.evaluate(event).await {
            Ok(verdicts) => verdicts,
            Err(error) => {
                warn!(uri = %slot.uri, %error, "policy server evaluate call failed");
                Vec::new()
            }
        }
    }

    fn timeout_verdict(&self) -> Verdict {
        match self.config.on_timeout {
            Decision::Deny => Verdict::deny("Composition deadline exceeded"),
            Decision::Observe => Verdict::observe(None),
            Decision::Allow | Decision::Modify | Decision::Escalate => {
                Verdict::allow("Composition deadline exceeded".to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_server_is_chainable() {
        let mut layer = PolicyLayer::new(CompositionConfig::default());
        layer.add_server("stdio://policy-server").add_server("http://localhost:9000");
        assert_eq!(layer.servers.len(), 2);
    }

    #[tokio::test]
    async fn evaluate_with_no_servers_allows() {
        let layer = PolicyLayer::new(CompositionConfig::default());
        let verdict = layer
            .evaluate(
                EventType::InputReceived,
                Vec::new(),
                EventPayload::new(),
                SessionMetadata::new("s1"),
            )
            .await;
        assert_eq!(verdict.decision, Decision::Allow);
    }
}
