//! Errors raised while walking a lifecycle event sequence.

use apl_types::Verdict;
use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by [`crate::LifecycleExecutor::run_sequence`].
#[derive(Debug, Error)]
pub enum Error {
    /// A policy denied the action partway through the sequence.
    #[error("policy denied the action: {verdict:?}")]
    Denied {
        /// The decisive verdict.
        verdict: Verdict,
    },
    /// A policy escalated the action partway through the sequence.
    #[error("policy escalated the action: {verdict:?}")]
    Escalated {
        /// The decisive verdict.
        verdict: Verdict,
    },
}
