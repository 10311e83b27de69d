//! Session-scoped context attached to every event.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Context shared by every event in one session.
///
/// `token_count`/`cost_usd` accumulate across a session; the matching
/// `*_budget*` fields are optional ceilings a policy can compare against.
/// The core never interprets these numbers itself — budget enforcement is
/// just another declarative or programmatic policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Stable identifier for the session this event belongs to.
    pub session_id: String,
    /// The end user, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// The agent acting within this session, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Tokens consumed so far in this session.
    #[serde(default)]
    pub token_count: u64,
    /// Optional token ceiling for this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_budget: Option<u64>,
    /// Cost accrued so far in this session, in US dollars.
    #[serde(default)]
    pub cost_usd: f64,
    /// Optional cost ceiling for this session, in US dollars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_budget_usd: Option<f64>,
    /// Roles the acting user holds.
    #[serde(default)]
    pub user_roles: Vec<String>,
    /// The user's region, for region-scoped policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_region: Option<String>,
    /// Compliance tags applicable to this session (e.g. `"gdpr"`, `"hipaa"`).
    #[serde(default)]
    pub compliance_tags: Vec<String>,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// Free-form extension bag; the declarative engine's dot-path traversal
    /// falls back to a keyed lookup here for anything not modeled above.
    #[serde(default)]
    pub custom: BTreeMap<String, Value>,
}

impl SessionMetadata {
    /// Creates metadata for a fresh session starting now.
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: None,
            agent_id: None,
            token_count: 0,
            token_budget: None,
            cost_usd: 0.0,
            cost_budget_usd: None,
            user_roles: Vec::new(),
            user_region: None,
            compliance_tags: Vec::new(),
            started_at: Utc::now(),
            custom: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let metadata = SessionMetadata::new("s1");
        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.get("user_id").is_none());
        assert!(json.get("token_budget").is_none());
        assert_eq!(json["token_count"], 0);
    }
}
