//! Same priority scan as `deny_overrides`, worded for an all-allow result.

use apl_types::{Decision, Verdict};

use crate::strategy::{first_with_decision, CompositionStrategy};

const PRIORITY_ORDER: [Decision; 3] = [Decision::Deny, Decision::Escalate, Decision::Modify];

/// Identical priority scan to [`crate::DenyOverridesStrategy`]; differs only
/// in the reasoning attached when every verdict agreed to allow.
#[derive(Default)]
pub struct UnanimousStrategy;

impl CompositionStrategy for UnanimousStrategy {
    fn compose(&self, verdicts: &[Verdict]) -> Verdict {
        if verdicts.is_empty() {
            return Verdict::allow(None);
        }

        for decision in PRIORITY_ORDER {
            if let Some(verdict) = first_with_decision(verdicts, decision) {
                return verdict;
            }
        }

        Verdict::allow("All policies agreed".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_allow_reasoning_names_agreement() {
        let strategy = UnanimousStrategy;
        let verdict = strategy.compose(&[Verdict::allow(None), Verdict::allow(None)]);
        assert_eq!(verdict.reasoning.as_deref(), Some("All policies agreed"));
    }
}
