//! The simplest strategy: take the first decisive verdict, in order.

use apl_types::{Decision, Verdict};

use crate::strategy::CompositionStrategy;

/// First non-`observe` verdict wins; else `allow`.
pub struct FirstApplicableStrategy;

impl CompositionStrategy for FirstApplicableStrategy {
    fn compose(&self, verdicts: &[Verdict]) -> Verdict {
        verdicts
            .iter()
            .find(|v| v.decision != Decision::Observe)
            .cloned()
            .unwrap_or_else(|| Verdict::allow(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_leading_observe_verdicts() {
        let strategy = FirstApplicableStrategy;
        let verdicts = vec![Verdict::observe(None), Verdict::deny("blocked")];
        assert_eq!(strategy.compose(&verdicts).decision, Decision::Deny);
    }

    #[test]
    fn all_observe_allows() {
        let strategy = FirstApplicableStrategy;
        let verdict = strategy.compose(&[Verdict::observe(None)]);
        assert_eq!(verdict.decision, Decision::Allow);
    }
}
