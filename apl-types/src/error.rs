//! Shared error definitions for the wire protocol types.

use thiserror::Error;

/// Result alias used throughout the protocol crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or parsing protocol values.
#[derive(Debug, Error)]
pub enum Error {
    /// An `EventType` string did not match any known lifecycle point.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    /// A `Decision` string did not match any known verdict decision.
    #[error("unknown decision: {0}")]
    UnknownDecision(String),

    /// A verdict, event, or message field failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// The field that failed validation.
        field: &'static str,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A timestamp string could not be parsed as RFC 3339.
    #[error("invalid timestamp `{raw}`: {source}")]
    InvalidTimestamp {
        /// The offending raw string.
        raw: String,
        /// Underlying parse error.
        #[source]
        source: chrono::ParseError,
    },
}
