//! The strategy trait and its named dispatch enum.

use apl_types::Verdict;
use serde::{Deserialize, Serialize};

use crate::{
    allow_overrides::AllowOverridesStrategy, deny_overrides::DenyOverridesStrategy,
    first_applicable::FirstApplicableStrategy, unanimous::UnanimousStrategy,
    weighted::WeightedStrategy,
};

/// Reduces an ordered list of verdicts (in client/policy registration
/// order) to one final verdict.
///
/// Every strategy is a pure function of its input: no I/O, no shared
/// state, safe to call from any thread.
pub trait CompositionStrategy: Send + Sync {
    /// Composes `verdicts` into one final verdict.
    fn compose(&self, verdicts: &[Verdict]) -> Verdict;
}

/// Selects a [`CompositionStrategy`] by name, e.g. from a manifest or a
/// `CompositionConfig`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionMode {
    /// First `deny` wins; else first `escalate`; else first `modify`; else
    /// `allow`.
    DenyOverrides,
    /// Same priority scan as `deny_overrides`, with "All policies agreed"
    /// reasoning on an all-allow result.
    Unanimous,
    /// First `allow` wins; else first `modify`; else first `escalate`;
    /// else first `deny`; else a synthetic deny.
    AllowOverrides,
    /// First non-`observe` verdict wins; else `allow`.
    FirstApplicable,
    /// Confidence-weighted sum across `allow` and `deny` verdicts.
    Weighted,
}

impl Default for CompositionMode {
    fn default() -> Self {
        CompositionMode::DenyOverrides
    }
}

impl CompositionMode {
    /// Builds the strategy instance this mode names.
    #[must_use]
    pub fn strategy(self) -> Box<dyn CompositionStrategy> {
        match self {
            CompositionMode::DenyOverrides => Box::new(DenyOverridesStrategy::default()),
            CompositionMode::Unanimous => Box::new(UnanimousStrategy::default()),
            CompositionMode::AllowOverrides => Box::new(AllowOverridesStrategy::default()),
            CompositionMode::FirstApplicable => Box::new(FirstApplicableStrategy),
            CompositionMode::Weighted => Box::new(WeightedStrategy),
        }
    }
}

/// Finds the first verdict in `verdicts` with the given decision.
pub(crate) fn first_with_decision(
    verdicts: &[Verdict],
    decision: apl_types::Decision,
) -> Option<Verdict> {
    verdicts.iter().find(|v| v.decision == decision).cloned()
}
