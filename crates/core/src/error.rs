//! Error types for the planning engine.
//!
//! Most defects in this engine are recovered locally (skipped records,
//! pruned edges) or surfaced as conflict records; only scope errors such as
//! an unresolvable strategy name fail fast.

/// Errors the planning engine can fail with.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The caller asked for a strategy that does not exist.
    #[error("unknown scheduling strategy '{0}' (expected one of: maximum, balanced, sequential)")]
    UnknownStrategy(String),
}
