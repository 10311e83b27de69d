//! Provider-side orchestration: walks a lifecycle event sequence against a
//! [`PolicyLayer`](apl_layer::PolicyLayer) for one agent action, mutating a
//! mutable context as modifications arrive and raising a denial or
//! escalation the moment one fires.

#![warn(missing_docs, clippy::pedantic)]

mod context;
mod error;
mod executor;
mod reentrancy;
mod sequences;
mod stream;
mod sync_executor;

pub use context::{LifecycleContext, MessageAdapter, ResponseTextApplier};
pub use error::{Error, Result};
pub use executor::{build_event, LifecycleExecutor};
pub use sequences::{
    AGENT_POST_HANDOFF, AGENT_PRE_HANDOFF, ALL, INPUT_VALIDATED, LLM_POST_RESPONSE, LLM_PRE_REQUEST, PLAN_APPROVED,
    PLAN_PROPOSED, SESSION_END, SESSION_START, TOOL_POST_INVOKE, TOOL_PRE_INVOKE,
};
pub use stream::{wrap_stream, StreamVerdict};
pub use sync_executor::run_sequence_blocking;
