//! Errors raised while registering policies.

use thiserror::Error;

/// Result alias used throughout the registry crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while registering a policy against the registry.
#[derive(Debug, Error)]
pub enum Error {
    /// A policy name collided with one already registered on this server.
    #[error("policy `{name}` is already registered")]
    DuplicateName {
        /// The offending policy name.
        name: String,
    },

    /// A policy was registered with no event types.
    #[error("policy `{name}` must be registered against at least one event type")]
    NoEventTypes {
        /// The offending policy name.
        name: String,
    },
}
