//! Errors raised while loading or validating a YAML policy manifest.

use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing a YAML manifest into a running server.
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that could not be read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file's contents were not valid YAML.
    #[error("invalid YAML: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A required top-level field was missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An event type string in the manifest did not match any known
    /// [`apl_types::EventType`].
    #[error("unknown event type `{0}` in policy `{1}`")]
    UnknownEventType(String, String),

    /// Registering a parsed policy against the server failed, most likely a
    /// duplicate name.
    #[error(transparent)]
    Registration(#[from] apl_policy::Error),
}
