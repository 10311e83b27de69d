//! The primary action a verdict carries.

use serde::{Deserialize, Serialize};

/// A verdict's primary action.
///
/// `Observe` is the one non-blocking member: it signals an audit outcome
/// that the executor passes through without raising or mutating anything.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Allow the action to proceed unchanged.
    Allow,
    /// Block the action.
    Deny,
    /// Allow the action, but rewrite part of it first.
    Modify,
    /// Defer the action to a human or higher-authority process.
    Escalate,
    /// Non-blocking audit outcome.
    Observe,
}

impl Decision {
    /// Whether this decision blocks the action from proceeding as-is.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Decision::Deny | Decision::Escalate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Decision::Allow).unwrap(), "\"allow\"");
        assert_eq!(
            serde_json::to_string(&Decision::Escalate).unwrap(),
            "\"escalate\""
        );
    }

    #[test]
    fn observe_and_allow_do_not_block() {
        assert!(!Decision::Allow.is_blocking());
        assert!(!Decision::Observe.is_blocking());
        assert!(Decision::Deny.is_blocking());
        assert!(Decision::Escalate.is_blocking());
    }
}
