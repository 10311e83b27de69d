//! Errors raised while connecting to or driving a policy transport.

use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by a client-side transport or the scheme registry.
#[derive(Debug, Error)]
pub enum Error {
    /// A URI's scheme has no registered transport constructor.
    #[error("unknown transport scheme `{scheme}`; supported schemes: {supported}")]
    UnknownScheme {
        /// The offending scheme.
        scheme: String,
        /// A comma-separated listing of supported schemes, for the error message.
        supported: String,
    },

    /// A `stdio://` URI had no command after the scheme.
    #[error("stdio URI has no command")]
    EmptyStdioCommand,

    /// Spawning the policy server subprocess failed.
    #[error("failed to spawn policy server process: {0}")]
    Spawn(#[source] std::io::Error),

    /// Reading or writing the subprocess's stdio pipes failed.
    #[error("stdio transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The subprocess or HTTP server sent a line/body that was not valid JSON.
    #[error("malformed response from policy server: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// The transport's peer closed the connection before sending a manifest.
    #[error("policy server closed the connection before sending a manifest")]
    NoManifest,

    /// An HTTP request to the policy server failed at the transport level.
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// The HTTP server responded with a non-success status.
    #[error("policy server returned HTTP {status}: {body}")]
    HttpStatus {
        /// The response status code.
        status: u16,
        /// The response body, for diagnostics.
        body: String,
    },
}
