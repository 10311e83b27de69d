//! Resolves a policy server URI to the right client transport.

use apl_types::{Event, PolicyManifest, Verdict};

use crate::error::{Error, Result};
use crate::http_client::PolicyHttpClient;
use crate::stdio_client::StdioClient;

const SUPPORTED_SCHEMES: [&str; 3] = ["stdio", "http", "https"];

/// A connection to a policy server, regardless of which transport it uses.
pub enum PolicyClient {
    /// A subprocess speaking the stdio wire protocol.
    Stdio(StdioClient),
    /// A server reachable over `http(s)://`.
    Http(PolicyHttpClient),
}

impl PolicyClient {
    /// Connects to `uri`, dispatching on its scheme.
    ///
    /// `stdio://<command>` spawns `<command>` as a subprocess; `http://` and
    /// `https://` connect to an HTTP-hosted server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownScheme`] if `uri` has no `://` separator or
    /// names a scheme other than `stdio`, `http`, or `https`; otherwise
    /// propagates whatever the underlying transport's `connect` returns.
    pub async fn connect(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri.split_once("://").ok_or_else(|| Error::UnknownScheme {
            scheme: uri.to_owned(),
            supported: SUPPORTED_SCHEMES.join(", "),
        })?;

        match scheme {
            "stdio" => Ok(Self::Stdio(StdioClient::connect(rest).await?)),
            "http" => Ok(Self::Http(PolicyHttpClient::connect(format!("http://{rest}")).await?)),
            "https" => Ok(Self::Http(PolicyHttpClient::connect(format!("https://{rest}")).await?)),
            other => Err(Error::UnknownScheme {
                scheme: other.to_owned(),
                supported: SUPPORTED_SCHEMES.join(", "),
            }),
        }
    }

    /// The manifest read when the connection was established.
    #[must_use]
    pub fn manifest(&self) -> &PolicyManifest {
        match self {
            Self::Stdio(client) => client.manifest(),
            Self::Http(client) => client.manifest(),
        }
    }

    /// Evaluates `event` against the connected server's policies.
    ///
    /// # Errors
    ///
    /// Propagates whatever the underlying transport's `evaluate` returns.
    pub async fn evaluate(&mut self, event: &Event) -> Result<Vec<Verdict>> {
        match self {
            Self::Stdio(client) => client.evaluate(event).await,
            Self::Http(client) => client.evaluate(event).await,
        }
    }

    /// Closes the connection, terminating a spawned subprocess if any.
    ///
    /// # Errors
    ///
    /// Returns an error only for the stdio transport; an HTTP connection
    /// has nothing to tear down.
    pub async fn close(self) -> Result<()> {
        match self {
            Self::Stdio(client) => client.close().await,
            Self::Http(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn an_unsupported_scheme_is_rejected() {
        let error = PolicyClient::connect("ftp://nope").await.unwrap_err();
        assert!(matches!(error, Error::UnknownScheme { .. }));
    }

    #[tokio::test]
    async fn a_uri_with_no_scheme_separator_is_rejected() {
        let error = PolicyClient::connect("not-a-uri").await.unwrap_err();
        assert!(matches!(error, Error::UnknownScheme { .. }));
    }
}
