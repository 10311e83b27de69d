//! The agent-facing facade: multi-server fan-out plus composition.
//!
//! [`PolicyLayer`] owns an ordered list of policy clients and reduces
//! their verdicts to one per event via a [`CompositionConfig`].
//! [`guarded_call`] wraps a single tool invocation with a policy check.

#![warn(missing_docs, clippy::pedantic)]

mod config;
mod decorator;
mod error;
mod layer;

pub use config::CompositionConfig;
pub use decorator::guarded_call;
pub use error::{Error, Result};
pub use layer::PolicyLayer;
