//! The shape of a YAML policy manifest, before it is turned into a server.

use serde::Deserialize;
use serde_json::Value;

/// One `when`/`then` pair inside a policy's rule list.
#[derive(Clone, Debug, Deserialize)]
pub struct YamlRule {
    /// Dot-path conditions that must all match for this rule to fire.
    #[serde(default)]
    pub when: Value,
    /// The verdict to build when every condition in `when` matches.
    pub then: Value,
}

/// One policy entry in a manifest's `policies` list.
#[derive(Clone, Debug, Deserialize)]
pub struct YamlPolicyDefinition {
    /// Unique name within the manifest.
    pub name: String,
    /// Event type names this policy is registered against.
    pub events: Vec<String>,
    /// The rules evaluated in order; the first match wins.
    #[serde(default)]
    pub rules: Vec<YamlRule>,
    /// What the policy does, for humans browsing the manifest.
    #[serde(default)]
    pub description: Option<String>,
    /// The policy's own version, independent of the manifest's.
    #[serde(default = "default_version")]
    pub version: String,
    /// Whether this policy's verdict can block the action.
    #[serde(default = "default_true")]
    pub blocking: bool,
    /// The hard deadline applied to this policy's handler, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// The root of a YAML policy manifest file.
#[derive(Clone, Debug, Deserialize)]
pub struct YamlManifest {
    /// The server's name.
    pub name: String,
    /// The server's own version.
    #[serde(default = "default_version")]
    pub version: String,
    /// What the server does, for humans browsing the manifest.
    #[serde(default)]
    pub description: Option<String>,
    /// The policies this manifest registers.
    #[serde(default)]
    pub policies: Vec<YamlPolicyDefinition>,
}

fn default_version() -> String {
    "1.0.0".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    1000
}
