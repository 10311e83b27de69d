//! Builds a running [`apl_policy::PolicyServer`] from a YAML manifest.

use std::path::Path;
use std::sync::Arc;

use apl_policy::{PolicyBuilder, PolicyServer};
use apl_types::{Event, EventType, Verdict};

use crate::engine::evaluate_rule;
use crate::error::{Error, Result};
use crate::schema::{YamlManifest, YamlPolicyDefinition};

/// Loads a YAML policy manifest and registers every policy it defines
/// against a fresh [`PolicyServer`].
#[derive(Default)]
pub struct YamlPolicyLoader;

impl YamlPolicyLoader {
    /// Creates a loader. Stateless; exists for parity with the other
    /// `Yaml*` types and room to grow a custom operator registry later.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reads and parses the manifest at `path`, building a server from it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::Parse`] if
    /// it is not valid YAML, and [`Error::UnknownEventType`] or
    /// [`Error::Registration`] if a policy entry is malformed.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<PolicyServer> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.load_from_str(&raw)
    }

    /// Parses `raw` as a YAML manifest, building a server from it.
    ///
    /// # Errors
    ///
    /// See [`YamlPolicyLoader::load_from_file`].
    pub fn load_from_str(&self, raw: &str) -> Result<PolicyServer> {
        let manifest: YamlManifest = serde_yaml_ng::from_str(raw)?;

        let mut server = PolicyServer::new(manifest.name, manifest.version);
        if let Some(description) = manifest.description {
            server = server.with_description(description);
        }

        for policy in manifest.policies {
            register_policy(&mut server, policy)?;
        }

        Ok(server)
    }
}

fn register_policy(server: &mut PolicyServer, policy: YamlPolicyDefinition) -> Result<()> {
    let events = policy
        .events
        .iter()
        .map(|name| name.parse::<EventType>().map_err(|_| Error::UnknownEventType(name.clone(), policy.name.clone())))
        .collect::<Result<Vec<_>>>()?;

    let rules = Arc::new(policy.rules);
    let mut builder = PolicyBuilder::new(policy.name, events)
        .version(policy.version)
        .blocking(policy.blocking)
        .timeout_ms(policy.timeout_ms);
    if let Some(description) = policy.description {
        builder = builder.description(description);
    }

    let handler = move |event: &Event| {
        let rules = Arc::clone(&rules);
        let event = event.clone();
        async move {
            let event_value = serde_json::to_value(&event).unwrap_or(serde_json::Value::Null);
            for rule in rules.iter() {
                if let Some(verdict) = evaluate_rule(rule, &event_value) {
                    return verdict;
                }
            }
            Verdict::allow(None)
        }
    };

    server.register(builder.build(handler))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use apl_types::{Decision, SessionMetadata};

    use super::*;

    const MANIFEST: &str = r#"
name: guardrails
version: "1.0.0"
policies:
  - name: block-shell
    events: ["tool.pre_invoke"]
    rules:
      - when:
          payload.tool_name: shell_exec
        then:
          decision: deny
          reasoning: "blocked {{payload.tool_name}}"
"#;

    #[tokio::test]
    async fn a_loaded_policy_evaluates_its_rules() {
        let server = YamlPolicyLoader::new().load_from_str(MANIFEST).unwrap();

        let mut event = Event::new(EventType::ToolPreInvoke, SessionMetadata::new("s1"));
        event.payload.tool_name = Some("shell_exec".to_owned());

        let verdicts = server.evaluate(&event).await;
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].decision, Decision::Deny);
        assert_eq!(verdicts[0].reasoning.as_deref(), Some("blocked shell_exec"));
    }

    #[test]
    fn an_unknown_event_type_is_rejected() {
        let manifest = MANIFEST.replace("tool.pre_invoke", "bogus.event");
        let err = YamlPolicyLoader::new().load_from_str(&manifest).unwrap_err();
        assert!(matches!(err, Error::UnknownEventType(_, _)));
    }
}
