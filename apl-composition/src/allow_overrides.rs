//! An optimistic strategy for low-stakes event types: any allow wins.

use apl_types::{Decision, Verdict};

use crate::strategy::{first_with_decision, CompositionStrategy};

const PRIORITY_ORDER: [Decision; 3] = [Decision::Modify, Decision::Escalate, Decision::Deny];

/// First `allow` wins; else first `modify`; else first `escalate`; else
/// first `deny`; else a synthetic deny when the list is empty.
pub struct AllowOverridesStrategy {
    deny_reasoning: String,
}

impl Default for AllowOverridesStrategy {
    fn default() -> Self {
        Self {
            deny_reasoning: "No policy allowed".to_owned(),
        }
    }
}

impl CompositionStrategy for AllowOverridesStrategy {
    fn compose(&self, verdicts: &[Verdict]) -> Verdict {
        if let Some(verdict) = first_with_decision(verdicts, Decision::Allow) {
            return verdict;
        }

        for decision in PRIORITY_ORDER {
            if let Some(verdict) = first_with_decision(verdicts, decision) {
                return verdict;
            }
        }

        Verdict::deny(self.deny_reasoning.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_allow_wins_over_deny() {
        let strategy = AllowOverridesStrategy::default();
        let verdicts = vec![Verdict::deny("blocked"), Verdict::allow(None)];
        assert_eq!(strategy.compose(&verdicts).decision, Decision::Allow);
    }

    #[test]
    fn empty_list_denies() {
        let strategy = AllowOverridesStrategy::default();
        let verdict = strategy.compose(&[]);
        assert_eq!(verdict.decision, Decision::Deny);
        assert_eq!(verdict.reasoning.as_deref(), Some("No policy allowed"));
    }
}
