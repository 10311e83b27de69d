//! JSON shapes exchanged over the stdio transport, and its URI grammar.

use apl_types::{Event, PolicyManifest, Verdict};
use serde::Serialize;

/// One line written by a policy server's stdout.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerLine<'a> {
    /// Emitted once, immediately on startup.
    Manifest {
        /// The server's self-description.
        manifest: &'a PolicyManifest,
    },
    /// The reply to an `evaluate` request.
    Verdicts {
        /// Echoes the evaluated event's id.
        event_id: &'a str,
        /// One verdict per policy that fired.
        verdicts: &'a [Verdict],
    },
    /// The reply to a `ping` request.
    Pong,
}

/// One line written by a policy client's stdin.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientLine<'a> {
    /// Asks the server to evaluate `event` against its registered policies.
    Evaluate {
        /// The event to evaluate.
        event: &'a Event,
    },
    /// A liveness check; the server replies with `pong`.
    Ping,
    /// Asks the server to exit its read loop cleanly.
    Shutdown,
}

/// Splits a `stdio://` URI's remainder into a subprocess argv.
///
/// A leading `./` has no interpreter to prefix the way a source-language
/// client would (`sys.executable script.py`) since the produced binary or
/// script is assumed to be independently executable; instead the script
/// path itself fills both roles, spawned as the program *and* passed back
/// as its own first argument, so `argv[0]` still carries the script path
/// the way `[interpreter, script]` does in the original. Any further
/// whitespace-separated tokens are appended as additional arguments. A
/// leading `npx ` is kept together with its arguments via the same
/// whitespace split used for every other command, since `npx` is already
/// the entry point rather than something to wrap. Everything else is split
/// on whitespace.
#[must_use]
pub fn parse_stdio_argv(command: &str) -> Vec<String> {
    if command.starts_with("./") {
        let mut tokens = command.split_whitespace();
        let script = tokens.next().unwrap_or(command).to_owned();
        let mut argv = vec![script.clone(), script];
        argv.extend(tokens.map(str::to_owned));
        return argv;
    }

    command.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_a_plain_command_on_whitespace() {
        assert_eq!(
            parse_stdio_argv("python3 policy_server.py --port 9000"),
            vec!["python3", "policy_server.py", "--port", "9000"]
        );
    }

    #[test]
    fn a_leading_dot_slash_script_is_spawned_with_itself_as_argv_zero() {
        assert_eq!(
            parse_stdio_argv("./my-policy-server"),
            vec!["./my-policy-server", "./my-policy-server"]
        );
    }

    #[test]
    fn a_leading_dot_slash_script_keeps_its_trailing_arguments() {
        assert_eq!(
            parse_stdio_argv("./my-policy-server --port 9000"),
            vec!["./my-policy-server", "./my-policy-server", "--port", "9000"]
        );
    }

    #[test]
    fn an_npx_command_is_split_like_any_other() {
        assert_eq!(
            parse_stdio_argv("npx my-policy-pack"),
            vec!["npx", "my-policy-pack"]
        );
    }
}
