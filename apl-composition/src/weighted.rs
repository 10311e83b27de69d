//! Confidence-weighted voting between `allow` and `deny`.

use apl_types::{Decision, Verdict};

use crate::strategy::{first_with_decision, CompositionStrategy};

/// Sums `confidence` across `allow` verdicts and across `deny` verdicts.
/// `modify` and `escalate` verdicts don't participate in the vote. A tie
/// (or an empty list) favors `allow`.
pub struct WeightedStrategy;

impl CompositionStrategy for WeightedStrategy {
    fn compose(&self, verdicts: &[Verdict]) -> Verdict {
        if verdicts.is_empty() {
            return Verdict::allow("No policies evaluated".to_owned());
        }

        let allow_score: f64 = verdicts
            .iter()
            .filter(|v| v.decision == Decision::Allow)
            .map(|v| v.confidence)
            .sum();
        let deny_score: f64 = verdicts
            .iter()
            .filter(|v| v.decision == Decision::Deny)
            .map(|v| v.confidence)
            .sum();

        if deny_score > allow_score {
            if let Some(deny) = first_with_decision(verdicts, Decision::Deny) {
                return deny;
            }
            return Verdict::deny(format!("Weighted deny ({deny_score:.2} vs {allow_score:.2})"));
        }

        Verdict::allow(format!("Weighted allow ({allow_score:.2} vs {deny_score:.2})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_tie_favors_allow() {
        let strategy = WeightedStrategy;
        let mut allow = Verdict::allow(None);
        allow.confidence = 0.5;
        let mut deny = Verdict::deny("x");
        deny.confidence = 0.5;

        let verdict = strategy.compose(&[allow, deny]);
        assert_eq!(verdict.decision, Decision::Allow);
    }

    #[test]
    fn heavier_deny_wins_and_preserves_the_deciding_verdict() {
        let strategy = WeightedStrategy;
        let mut allow = Verdict::allow(None);
        allow.confidence = 0.3;
        let mut deny = Verdict::deny("blocked");
        deny.confidence = 0.9;
        deny.policy_name = Some("guardrail".to_owned());

        let verdict = strategy.compose(&[allow, deny]);
        assert_eq!(verdict.decision, Decision::Deny);
        assert_eq!(verdict.policy_name.as_deref(), Some("guardrail"));
    }

    #[test]
    fn modify_and_escalate_do_not_participate() {
        let strategy = WeightedStrategy;
        let verdict = strategy.compose(&[Verdict::escalate(apl_types::Escalation::new("human_confirm"))]);
        assert_eq!(verdict.decision, Decision::Allow);
    }
}
