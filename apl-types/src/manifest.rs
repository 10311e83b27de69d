//! A policy server's self-description, published at connect time.

use serde::{Deserialize, Serialize};

use crate::EventType;

/// The protocol version this crate speaks.
pub const PROTOCOL_VERSION: &str = "0.3.0";

/// One dot-path a policy reads from an event, advertised so a host can
/// decide whether it has the data a policy needs before connecting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContextRequirement {
    /// The dot-path the policy reads.
    pub path: String,
    /// Whether the policy fails to function without this path present.
    pub required: bool,
    /// A human-readable note on what the path is used for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ContextRequirement {
    /// A required context path with no description.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required: true,
            description: None,
        }
    }
}

/// Self-description of one registered policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyDefinition {
    /// Unique name within the server.
    pub name: String,
    /// Policy version, independent of the server's own version.
    pub version: String,
    /// What the policy does, for humans browsing a manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Event types this policy is registered against.
    pub events: Vec<EventType>,
    /// Dot-paths this policy reads from an event.
    #[serde(default)]
    pub context_requirements: Vec<ContextRequirement>,
    /// Whether this policy's verdict can block the action.
    pub blocking: bool,
    /// The hard deadline applied to this policy's handler.
    pub timeout_ms: u64,
    /// Who owns this policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Free-form labels for filtering and display.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A server's self-description, published once at connect time and held
/// for the lifetime of the client connection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyManifest {
    /// The server's name.
    pub server_name: String,
    /// The server's own version, independent of any policy's version.
    pub server_version: String,
    /// The wire protocol version this server speaks.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    /// What the server does, for humans browsing a manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether this server accepts multiple events in one request.
    #[serde(default)]
    pub supports_batch: bool,
    /// Whether this server exposes a streaming transport.
    #[serde(default)]
    pub supports_streaming: bool,
    /// Link to human-facing documentation for this server's policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    /// The policies this server has registered.
    pub policies: Vec<PolicyDefinition>,
}

fn default_protocol_version() -> String {
    PROTOCOL_VERSION.to_owned()
}

impl PolicyManifest {
    /// Builds a manifest with protocol defaults and no policies yet.
    #[must_use]
    pub fn new(server_name: impl Into<String>, server_version: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            server_version: server_version.into(),
            protocol_version: PROTOCOL_VERSION.to_owned(),
            description: None,
            supports_batch: false,
            supports_streaming: false,
            documentation_url: None,
            policies: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_protocol_version_is_applied_on_parse() {
        let parsed: PolicyManifest = serde_json::from_value(serde_json::json!({
            "server_name": "s",
            "server_version": "1.0.0",
            "policies": [],
        }))
        .unwrap();
        assert_eq!(parsed.protocol_version, PROTOCOL_VERSION);
    }
}
