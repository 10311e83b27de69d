//! Connects to a policy server spawned as a subprocess.

use apl_types::{Event, PolicyManifest, Verdict};
use serde_json::Value;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::{Error, Result};
use crate::wire::{parse_stdio_argv, ClientLine};

/// A connection to a policy server spawned as a child process, speaking the
/// one-JSON-object-per-line stdio protocol.
pub struct StdioClient {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    manifest: PolicyManifest,
}

impl StdioClient {
    /// Spawns `command` (parsed per the `stdio://` URI grammar) and reads
    /// its opening manifest line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStdioCommand`] if `command` has no argv,
    /// [`Error::Spawn`] if the process could not be started, and
    /// [`Error::NoManifest`] if the process closed its stdout before
    /// sending a manifest line.
    pub async fn connect(command: &str) -> Result<Self> {
        let argv = parse_stdio_argv(command);
        let (program, args) = argv.split_first().ok_or(Error::EmptyStdioCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(Error::Spawn)?;

        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");
        let mut lines = BufReader::new(stdout).lines();

        let first_line = lines.next_line().await?.ok_or(Error::NoManifest)?;
        let parsed: Value = serde_json::from_str(&first_line).map_err(Error::MalformedResponse)?;
        let manifest_json = parsed.get("manifest").cloned().ok_or(Error::NoManifest)?;
        let manifest: PolicyManifest =
            serde_json::from_value(manifest_json).map_err(Error::MalformedResponse)?;

        Ok(Self { child, stdin, stdout: lines, manifest })
    }

    /// The manifest read when the connection was established.
    #[must_use]
    pub fn manifest(&self) -> &PolicyManifest {
        &self.manifest
    }

    /// Sends `event` and returns the policies' raw, uncomposed verdicts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on a pipe failure and
    /// [`Error::MalformedResponse`] if the server's reply is not valid
    /// `{"type":"verdicts", ...}` JSON.
    pub async fn evaluate(&mut self, event: &Event) -> Result<Vec<Verdict>> {
        self.write_line(&ClientLine::Evaluate { event }).await?;

        let line = self.stdout.next_line().await?.ok_or(Error::NoManifest)?;
        let parsed: Value = serde_json::from_str(&line).map_err(Error::MalformedResponse)?;
        let verdicts = parsed.get("verdicts").cloned().unwrap_or(Value::Array(Vec::new()));
        serde_json::from_value(verdicts).map_err(Error::MalformedResponse)
    }

    /// Sends a liveness check and waits for the server's `pong`.
    ///
    /// # Errors
    ///
    /// See [`StdioClient::evaluate`].
    pub async fn ping(&mut self) -> Result<()> {
        self.write_line(&ClientLine::Ping).await?;
        self.stdout.next_line().await?.ok_or(Error::NoManifest)?;
        Ok(())
    }

    /// Asks the server to exit its read loop and waits for the process to
    /// terminate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the shutdown line could not be written; the
    /// process is killed regardless if it does not exit on its own.
    pub async fn close(mut self) -> Result<()> {
        let _ = self.write_line(&ClientLine::Shutdown).await;
        if self.child.wait().await.is_err() {
            let _ = self.child.kill().await;
        }
        Ok(())
    }

    async fn write_line(&mut self, message: &ClientLine<'_>) -> Result<()> {
        let mut line = serde_json::to_vec(message).expect("wire messages always serialize");
        line.push(b'\n');
        self.stdin.write_all(&line).await?;
        self.stdin.flush().await?;
        Ok(())
    }
}
