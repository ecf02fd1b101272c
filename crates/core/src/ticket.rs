//! Ticket model - the unit of schedulable work in waveplan.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::TicketId;

/// A ticket is one work item in the planning graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketNode {
    /// Unique identifier, stable across the graph
    pub id: TicketId,

    /// Ticket title
    pub title: String,

    /// Declared and inferred dependencies
    pub dependencies: DependencySet,

    /// Artifacts (file paths) this ticket will modify
    pub affected_files: BTreeSet<String>,

    /// Constrained capabilities this ticket needs
    pub resources: ResourceRequirements,

    /// Scheduling priority (reporting only; does not affect ordering)
    pub priority: Priority,

    /// Estimated effort in hours
    pub estimated_effort: f64,
}

impl TicketNode {
    /// Create a ticket with no dependencies and default effort.
    pub fn new(id: impl Into<TicketId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            dependencies: DependencySet::default(),
            affected_files: BTreeSet::new(),
            resources: ResourceRequirements::default(),
            priority: Priority::default(),
            estimated_effort: DEFAULT_EFFORT_HOURS,
        }
    }
}

/// Fallback effort when a ticket declares none (hours).
pub const DEFAULT_EFFORT_HOURS: f64 = 2.0;

/// Dependency declarations of a ticket, split into disjoint categories.
///
/// `blocking` and `sequential` are directed ordering constraints and are
/// treated identically by the scheduler; `sequential` is distinguished only
/// for reporting. `soft` is advisory and never affects ordering. The two
/// conflict sets are populated by the conflict analyzer, never declared, and
/// are kept mutually symmetric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencySet {
    /// Must fully complete before this ticket may start
    #[serde(default)]
    pub blocking: Vec<TicketId>,

    /// Should be ordered before this ticket
    #[serde(default)]
    pub sequential: Vec<TicketId>,

    /// Advisory relationship, ignored for ordering
    #[serde(default)]
    pub soft: Vec<TicketId>,

    /// Tickets touching the same files (inferred, symmetric)
    #[serde(default)]
    pub file_conflicts: BTreeSet<TicketId>,

    /// Tickets competing for the same constrained resource (inferred, symmetric)
    #[serde(default)]
    pub resource_conflicts: BTreeSet<TicketId>,
}

impl DependencySet {
    /// Iterate the ordering dependencies (blocking then sequential) in
    /// declaration order.
    pub fn ordering(&self) -> impl Iterator<Item = &TicketId> {
        self.blocking.iter().chain(self.sequential.iter())
    }

    /// Number of ordering dependencies.
    pub fn ordering_count(&self) -> usize {
        self.blocking.len() + self.sequential.len()
    }

    /// Whether `other` conflicts with this ticket through a shared file or
    /// resource.
    pub fn conflicts_with(&self, other: &TicketId) -> bool {
        self.file_conflicts.contains(other) || self.resource_conflicts.contains(other)
    }
}

/// Constrained capabilities a ticket may require.
///
/// Flags are inferred from ticket text by the graph builder; the conflict
/// analyzer turns shared flags into resource conflicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    /// Needs serialized access to the ticket registry
    #[serde(default)]
    pub registry_access: bool,

    /// Will modify files on disk
    #[serde(default)]
    pub file_modifications: bool,

    /// Creates templates
    #[serde(default)]
    pub template_creation: bool,

    /// Requires a validation pass
    #[serde(default)]
    pub validation_required: bool,

    /// Heavy agent computation, should not be fully parallelized
    #[serde(default)]
    pub agent_intensive: bool,
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Must ship; drop everything else
    Critical,
    /// Important, schedule early
    High,
    /// Normal work
    #[default]
    Medium,
    /// Nice to have
    Low,
}

impl Priority {
    /// Parse a priority name case-insensitively; unknown values map to
    /// `Medium`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "critical" => Priority::Critical,
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_chains_blocking_then_sequential() {
        let deps = DependencySet {
            blocking: vec!["a".into(), "b".into()],
            sequential: vec!["c".into()],
            ..Default::default()
        };

        let ordered: Vec<&str> = deps.ordering().map(|id| id.as_str()).collect();
        assert_eq!(ordered, vec!["a", "b", "c"]);
        assert_eq!(deps.ordering_count(), 3);
    }

    #[test]
    fn soft_deps_never_count_as_ordering() {
        let deps = DependencySet {
            soft: vec!["x".into()],
            ..Default::default()
        };
        assert_eq!(deps.ordering_count(), 0);
    }

    #[test]
    fn priority_parses_leniently() {
        assert_eq!(Priority::parse_lenient("CRITICAL"), Priority::Critical);
        assert_eq!(Priority::parse_lenient("High"), Priority::High);
        assert_eq!(Priority::parse_lenient("whenever"), Priority::Medium);
    }
}
