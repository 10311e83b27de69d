//! Fan-out and composition configuration for a [`crate::PolicyLayer`].

use apl_composition::CompositionMode;
use apl_types::Decision;

/// Controls how a [`crate::PolicyLayer`] fans out to its clients and
/// reduces their verdicts to one.
#[derive(Clone, Debug)]
pub struct CompositionConfig {
    /// Which strategy reduces the concatenated verdict list to one.
    pub mode: CompositionMode,
    /// Whether clients are evaluated concurrently (the default) or one at
    /// a time in registration order.
    pub parallel: bool,
    /// The composed decision used if `timeout_ms` elapses before every
    /// client has replied.
    pub on_timeout: Decision,
    /// Advisory overall deadline for one `evaluate` call, across every
    /// client.
    pub timeout_ms: u64,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            mode: CompositionMode::DenyOverrides,
            parallel: true,
            on_timeout: Decision::Allow,
            timeout_ms: 5_000,
        }
    }
}
