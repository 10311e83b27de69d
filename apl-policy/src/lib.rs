//! Policy registration and event dispatch for one policy server.
//!
//! This crate has no opinion on how events arrive: [`PolicyServer`] is
//! driven directly in-process, or hosted behind a transport that speaks
//! stdio or HTTP to a remote client.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod invoker;
mod registered;
mod registry;
mod server;

pub use error::{Error, Result};
pub use invoker::invoke_policy_handler;
pub use registered::{PolicyBuilder, PolicyHandler, RegisteredPolicy};
pub use registry::PolicyRegistry;
pub use server::PolicyServer;
