//! Wire protocol types for the Agent Policy Layer.
//!
//! This crate defines the immutable data model shared by every other
//! crate in the workspace: the `Event`/`Verdict` envelope agents and
//! policy servers exchange, and the `PolicyManifest` a server publishes
//! at connect time. Nothing here depends on a transport, a registry, or
//! an execution model.

#![warn(missing_docs, clippy::pedantic)]

mod decision;
mod error;
mod escalation;
mod event;
mod event_type;
mod manifest;
mod message;
mod metadata;
mod modification;
mod payload;
mod verdict;

/// The verdict's primary action.
pub use decision::Decision;
/// Error type and result alias shared across the protocol crate.
pub use error::{Error, Result};
/// A deferral to a human or higher-authority process.
pub use escalation::Escalation;
/// The envelope describing one lifecycle point of one agent action.
pub use event::Event;
/// The closed set of lifecycle points an agent runtime can emit.
pub use event_type::EventType;
/// A policy server's self-description.
pub use manifest::{ContextRequirement, PolicyDefinition, PolicyManifest, PROTOCOL_VERSION};
/// Chat-completion-compatible conversation messages.
pub use message::{ContentPart, FunctionCall, Message, MessageContent, MessageRole, ToolCall};
/// Session-scoped context attached to every event.
pub use metadata::SessionMetadata;
/// An instruction to mutate an in-flight action.
pub use modification::{targets, Modification, ModificationOperation};
/// Stage-specific data carried by an event.
pub use payload::EventPayload;
/// A policy's reply for one event.
pub use verdict::Verdict;
