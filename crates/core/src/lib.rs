//! waveplan core data models.
//!
//! This crate defines the data structures shared by the graph analysis and
//! planning crates: tickets and their dependency categories, discovered
//! conflicts, and the execution plan output.

#![warn(missing_docs)]

// Core identities
mod id;

// Ticket model and raw input records
mod record;
mod ticket;

// Analysis and planning output
mod conflict;
mod plan;

// Errors
mod error;

// Re-exports
pub use id::TicketId;

pub use ticket::{
    DependencySet, Priority, ResourceRequirements, TicketNode, DEFAULT_EFFORT_HOURS,
};

pub use record::{RawDependencies, RawTicketRecord};

pub use conflict::{ConflictKind, ConflictRecord, Impact, ResolutionStrategy};

pub use plan::{
    Bottleneck, CriticalPath, ExecutionPlan, ParallelGroup, PlanMetadata, Strategy,
};

pub use error::PlanError;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
