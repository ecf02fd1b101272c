//! Conflict records - constraints discovered during graph analysis.

use serde::{Deserialize, Serialize};

use crate::id::TicketId;

/// A constraint discovered by analysis rather than declared by a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// What kind of constraint this is
    pub kind: ConflictKind,

    /// Tickets involved, in discovery order
    pub tickets: Vec<TicketId>,

    /// How the executor should resolve the conflict
    pub resolution: ResolutionStrategy,

    /// Severity of ignoring the conflict
    pub impact: Impact,

    /// Dependency cycles, present only on circular-dependency records
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycles: Vec<Vec<TicketId>>,
}

impl ConflictRecord {
    /// Build a non-circular conflict record.
    pub fn new(
        kind: ConflictKind,
        tickets: Vec<TicketId>,
        resolution: ResolutionStrategy,
        impact: Impact,
    ) -> Self {
        Self {
            kind,
            tickets,
            resolution,
            impact,
            cycles: Vec::new(),
        }
    }

    /// Build a circular-dependency record carrying the detected cycles.
    pub fn circular(tickets: Vec<TicketId>, cycles: Vec<Vec<TicketId>>) -> Self {
        Self {
            kind: ConflictKind::CircularDependency,
            tickets,
            resolution: ResolutionStrategy::BreakCycle,
            impact: Impact::High,
            cycles,
        }
    }
}

/// Kinds of discovered conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Two or more tickets modify the same file
    FileConflict,
    /// Two or more tickets compete for a constrained resource
    ResourceConflict,
    /// Tickets form a dependency cycle
    CircularDependency,
}

/// How a conflict should be handled by the plan consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Run the involved tickets one after another
    Sequential,
    /// Serialize access behind a mutex-style coordination point
    MutexCoordination,
    /// Cap how many of the involved tickets run at once
    LimitedParallelism,
    /// A dependency edge must be removed before the plan is trustworthy
    BreakCycle,
}

/// Severity of a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Cheap to coordinate
    Low,
    /// Needs attention during execution
    Medium,
    /// Plan is unreliable until resolved
    High,
}
