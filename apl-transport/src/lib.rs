//! Transports that carry the policy wire protocol between a host process
//! and policy servers, over stdio subprocesses or HTTP(S).

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod http_client;
mod http_server;
mod registry;
mod stdio_client;
mod stdio_server;
mod wire;

pub use error::{Error, Result};
pub use http_client::PolicyHttpClient;
pub use http_server::router;
pub use registry::PolicyClient;
pub use stdio_client::StdioClient;
pub use stdio_server::serve_stdio;
pub use wire::{parse_stdio_argv, ClientLine, ServerLine};

use apl_policy::PolicyServer;

/// Runs `server` over the stdio transport until stdin closes or a
/// `shutdown` line arrives.
///
/// # Errors
///
/// See [`serve_stdio`].
pub async fn run_stdio(server: &PolicyServer) -> Result<()> {
    serve_stdio(server).await
}

/// Runs `server` over HTTP, binding `addr` and serving until the process
/// receives a ctrl-c signal.
///
/// # Errors
///
/// Returns [`Error::Io`] if `addr` cannot be bound.
pub async fn run_http(server: PolicyServer, addr: std::net::SocketAddr) -> Result<()> {
    let app = router(server);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "policy server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
