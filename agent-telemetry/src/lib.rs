//! Structured logging and metrics shared across the policy layer's
//! processes.

#![warn(missing_docs, clippy::pedantic)]

mod metrics;
mod tracing_support;

pub use metrics::MetricsRegistry;
pub use tracing_support::init;
