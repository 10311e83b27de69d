//! Errors raised by the policy layer and its decorator helper.

use apl_types::Verdict;
use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while connecting to servers or guarding a call.
#[derive(Debug, Error)]
pub enum Error {
    /// A client transport failed to connect or evaluate.
    #[error(transparent)]
    Transport(#[from] apl_transport::Error),

    /// A policy denied the guarded call.
    #[error("policy denied the action: {verdict:?}")]
    PolicyDenied {
        /// The decisive verdict.
        verdict: Verdict,
    },

    /// A policy escalated the guarded call to a human or higher-authority
    /// process.
    #[error("policy escalated the action: {verdict:?}")]
    PolicyEscalation {
        /// The decisive verdict.
        verdict: Verdict,
    },
}
