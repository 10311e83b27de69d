//! A policy client connected to an HTTP(S)-hosted policy server.

use std::sync::Arc;

use apl_types::{Event, PolicyManifest, Verdict};
use hyper::client::HttpConnector;
use hyper::{Body, Client, Method, Request};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use webpki_roots::TLS_SERVER_ROOTS;

use crate::error::{Error, Result};

type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

fn build_https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let connector = HttpsConnector::from((http, Arc::new(config)));

    Client::builder().build::<_, Body>(connector)
}

/// A connection to a policy server reachable over `http(s)://`.
///
/// Unlike the HTTP server's own `/evaluate` response, this client surfaces
/// only the raw `verdicts[]` field: composition is the layer's job, not the
/// remote server's, so a local composition strategy is never shadowed by
/// whatever the server happened to compose.
pub struct PolicyHttpClient {
    client: HyperClient,
    base_url: String,
    manifest: PolicyManifest,
}

impl PolicyHttpClient {
    /// Connects to `base_url`, fetching its manifest via `GET /manifest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on a transport failure and
    /// [`Error::HttpStatus`]/[`Error::MalformedResponse`] if the server
    /// replied with something other than a manifest.
    pub async fn connect(base_url: impl Into<String>) -> Result<Self> {
        let client = build_https_client();
        let base_url = base_url.into().trim_end_matches('/').to_owned();

        let manifest = {
            let uri = format!("{base_url}/manifest");
            let body = get(&client, &uri).await?;
            serde_json::from_slice(&body).map_err(Error::MalformedResponse)?
        };

        Ok(Self { client, base_url, manifest })
    }

    /// The manifest read when the connection was established.
    #[must_use]
    pub fn manifest(&self) -> &PolicyManifest {
        &self.manifest
    }

    /// Posts `event` to `/evaluate` and returns only the raw `verdicts[]`
    /// field of the response.
    ///
    /// # Errors
    ///
    /// See [`PolicyHttpClient::connect`].
    pub async fn evaluate(&self, event: &Event) -> Result<Vec<Verdict>> {
        let uri = format!("{}/evaluate", self.base_url);
        let body = serde_json::to_vec(event).expect("events always serialize");

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .map_err(|error| Error::Http(error.to_string()))?;

        let response = self.client.request(request).await.map_err(|error| Error::Http(error.to_string()))?;
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|error| Error::Http(error.to_string()))?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let parsed: serde_json::Value = serde_json::from_slice(&bytes).map_err(Error::MalformedResponse)?;
        let verdicts = parsed.get("verdicts").cloned().unwrap_or(serde_json::Value::Array(Vec::new()));
        serde_json::from_value(verdicts).map_err(Error::MalformedResponse)
    }
}

async fn get(client: &HyperClient, uri: &str) -> Result<Vec<u8>> {
    let response = client
        .get(uri.parse().map_err(|_| Error::Http(format!("invalid URI: {uri}")))?)
        .await
        .map_err(|error| Error::Http(error.to_string()))?;
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body())
        .await
        .map_err(|error| Error::Http(error.to_string()))?;

    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    Ok(bytes.to_vec())
}
