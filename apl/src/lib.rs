//! Agent Policy Layer facade.
//!
//! Depend on this crate via `cargo add apl`. It bundles the protocol,
//! policy-side, and provider-side crates behind feature flags so a
//! downstream user can pull in only the half of the layer they need — a
//! policy server author wants `types` + `policy` + `declarative` +
//! `transport`, while an agent host wants `types` + `layer` + `executor` +
//! `transport`.

#![warn(missing_docs, clippy::pedantic)]

/// Wire protocol types: `Event`, `Verdict`, `PolicyManifest`.
pub use apl_types as types;

/// Composition strategies reducing many verdicts to one.
#[cfg(feature = "composition")]
pub use apl_composition as composition;

/// The YAML declarative rule engine.
#[cfg(feature = "declarative")]
pub use apl_declarative as declarative;

/// The policy registry, invoker, and server facade.
#[cfg(feature = "policy")]
pub use apl_policy as policy;

/// Stdio and HTTP transports carrying the wire protocol.
#[cfg(feature = "transport")]
pub use apl_transport as transport;

/// The multi-server policy layer facade.
#[cfg(feature = "layer")]
pub use apl_layer as layer;

/// The provider-side lifecycle executor.
#[cfg(feature = "executor")]
pub use apl_executor as executor;

/// Structured logging and metrics.
#[cfg(feature = "telemetry")]
pub use agent_telemetry as telemetry;
