//! The default composition strategy: a hard deny anywhere wins.

use apl_types::{Decision, Verdict};

use crate::strategy::{first_with_decision, CompositionStrategy};

const PRIORITY_ORDER: [Decision; 3] = [Decision::Deny, Decision::Escalate, Decision::Modify];

/// First `deny` wins; else first `escalate`; else first `modify`; else an
/// `allow` with a fixed reasoning string.
pub struct DenyOverridesStrategy {
    allow_reasoning: String,
}

impl Default for DenyOverridesStrategy {
    fn default() -> Self {
        Self {
            allow_reasoning: "All policies allowed".to_owned(),
        }
    }
}

impl CompositionStrategy for DenyOverridesStrategy {
    fn compose(&self, verdicts: &[Verdict]) -> Verdict {
        if verdicts.is_empty() {
            return Verdict::allow(None);
        }

        for decision in PRIORITY_ORDER {
            if let Some(verdict) = first_with_decision(verdicts, decision) {
                return verdict;
            }
        }

        Verdict::allow(self.allow_reasoning.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_scan_prefers_deny_over_everything() {
        let strategy = DenyOverridesStrategy::default();
        let verdicts = vec![
            Verdict::allow(None),
            Verdict::modify("output", apl_types::ModificationOperation::Replace, "x".into()),
            Verdict::escalate(apl_types::Escalation::new("human_confirm")),
            Verdict::deny("blocked"),
        ];
        assert_eq!(strategy.compose(&verdicts).decision, Decision::Deny);
    }

    #[test]
    fn removing_deny_falls_back_to_escalate_then_modify_then_allow() {
        let strategy = DenyOverridesStrategy::default();
        let escalate = Verdict::escalate(apl_types::Escalation::new("human_confirm"));
        let modify = Verdict::modify("output", apl_types::ModificationOperation::Replace, "x".into());

        assert_eq!(
            strategy
                .compose(&[Verdict::allow(None), modify.clone(), escalate.clone()])
                .decision,
            Decision::Escalate
        );
        assert_eq!(
            strategy.compose(&[Verdict::allow(None), modify]).decision,
            Decision::Modify
        );
        assert_eq!(strategy.compose(&[Verdict::allow(None)]).decision, Decision::Allow);
    }

    #[test]
    fn empty_list_allows() {
        let strategy = DenyOverridesStrategy::default();
        assert_eq!(strategy.compose(&[]).decision, Decision::Allow);
    }
}
