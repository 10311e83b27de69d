//! Hosts a [`PolicyServer`] over one JSON-object-per-line stdio loop.

use apl_policy::PolicyServer;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::error::Result;
use crate::wire::ServerLine;

/// Drives `server` over stdin/stdout until stdin closes or a `shutdown`
/// line arrives.
///
/// Emits the manifest as the first line, then loops: one line in, at most
/// one line out. A line that fails to parse, or whose `type` is not
/// recognized, is logged and skipped rather than ending the loop, so one
/// malformed request from a buggy client does not kill the server.
///
/// # Errors
///
/// Returns an error only for I/O failures writing to stdout; malformed
/// input is handled in-loop.
pub async fn serve_stdio(server: &PolicyServer) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    write_line(&mut stdout, &ServerLine::Manifest { manifest: &server.manifest() }).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "received malformed stdio line");
                continue;
            }
        };

        match request.get("type").and_then(Value::as_str) {
            Some("evaluate") => {
                let Some(event_json) = request.get("event").cloned() else {
                    warn!("evaluate request missing `event` field");
                    continue;
                };
                let event: apl_types::Event = match serde_json::from_value(event_json) {
                    Ok(event) => event,
                    Err(error) => {
                        warn!(%error, "evaluate request carried an invalid event");
                        continue;
                    }
                };

                let verdicts = server.evaluate(&event).await;
                write_line(
                    &mut stdout,
                    &ServerLine::Verdicts { event_id: &event.id, verdicts: &verdicts },
                )
                .await?;
            }
            Some("ping") => write_line(&mut stdout, &ServerLine::Pong).await?,
            Some("shutdown") => break,
            Some(other) => warn!(kind = other, "ignoring unrecognized stdio request type"),
            None => warn!("ignoring stdio request with no `type` field"),
        }
    }

    Ok(())
}

async fn write_line(stdout: &mut tokio::io::Stdout, message: &ServerLine<'_>) -> Result<()> {
    let mut line = serde_json::to_vec(message).expect("wire messages always serialize");
    line.push(b'\n');
    stdout.write_all(&line).await?;
    stdout.flush().await?;
    Ok(())
}
