//! Composition strategies for reducing a list of policy verdicts to one.
//!
//! Every strategy is a pure, allocation-light function of an ordered
//! verdict list; none of them perform I/O or hold state across calls.

#![warn(missing_docs, clippy::pedantic)]

mod allow_overrides;
mod deny_overrides;
mod first_applicable;
mod strategy;
mod unanimous;
mod weighted;

/// First `allow` wins; else `modify`; else `escalate`; else `deny`.
pub use allow_overrides::AllowOverridesStrategy;
/// First `deny` wins; else `escalate`; else `modify`; else `allow`.
pub use deny_overrides::DenyOverridesStrategy;
/// First non-`observe` verdict wins.
pub use first_applicable::FirstApplicableStrategy;
/// The strategy trait and its named dispatch enum.
pub use strategy::{CompositionMode, CompositionStrategy};
/// Same scan as `deny_overrides`, worded for an all-allow result.
pub use unanimous::UnanimousStrategy;
/// Confidence-weighted voting between `allow` and `deny`.
pub use weighted::WeightedStrategy;
