//! Execution plan output types.

use serde::{Deserialize, Serialize};

use crate::conflict::ConflictRecord;
use crate::error::PlanError;
use crate::id::TicketId;
use crate::Time;

/// One wave of tickets the executor may run concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelGroup {
    /// 1-based group number; assignment order is topological level order
    pub group_id: usize,

    /// Tickets scheduled together, in selection order
    pub tickets: Vec<TicketId>,

    /// Wall-clock estimate for the group: max member effort (hours)
    pub estimated_duration: f64,

    /// Whether two members share a file or resource conflict
    pub has_conflicts: bool,

    /// Executor slots needed to run the group fully parallel
    pub agents_required: usize,
}

/// The longest effort-weighted chain of dependent tickets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Path from root to final ticket
    pub tickets: Vec<TicketId>,

    /// Total duration of the path in hours
    pub total_duration: f64,

    /// Path members with disproportionate fan-out or effort
    pub bottlenecks: Vec<Bottleneck>,
}

/// A critical-path ticket that constrains the whole plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    /// The flagged ticket
    pub ticket: TicketId,

    /// How many other tickets declare it as an ordering dependency
    pub dependents: usize,

    /// Its own effort in hours
    pub estimated_effort: f64,
}

/// Summary numbers for a produced plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    /// Strategy the scheduler ran with
    pub strategy: Strategy,

    /// Tickets present in the analyzed graph
    pub ticket_count: usize,

    /// Sum of group durations (hours)
    pub total_duration: f64,

    /// Average tickets per group; 0 for an empty plan
    pub parallelism_factor: f64,

    /// When the plan was computed
    pub generated_at: Time,
}

/// Top-level output of a planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Summary numbers
    pub metadata: PlanMetadata,

    /// Conflicts discovered during analysis
    pub conflicts: Vec<ConflictRecord>,

    /// Execution waves in topological order
    pub groups: Vec<ParallelGroup>,

    /// Longest effort-weighted dependency chain
    pub critical_path: CriticalPath,

    /// Free-text optimization hints for the plan consumer
    pub recommendations: Vec<String>,

    /// Tickets left out of every group because they sit on a dependency
    /// cycle; empty for acyclic graphs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<TicketId>,
}

/// How a topological level is turned into parallel groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Emit each full frontier as one group, ignoring conflicts
    Maximum,
    /// Up to 4 mutually conflict-free tickets per group
    #[default]
    Balanced,
    /// One ticket per group
    Sequential,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Maximum => "maximum",
            Strategy::Balanced => "balanced",
            Strategy::Sequential => "sequential",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Strategy {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maximum" => Ok(Strategy::Maximum),
            "balanced" => Ok(Strategy::Balanced),
            "sequential" => Ok(Strategy::Sequential),
            _ => Err(PlanError::UnknownStrategy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_known_names() {
        assert_eq!("maximum".parse::<Strategy>().unwrap(), Strategy::Maximum);
        assert_eq!("Balanced".parse::<Strategy>().unwrap(), Strategy::Balanced);
        assert_eq!(
            "sequential".parse::<Strategy>().unwrap(),
            Strategy::Sequential
        );
    }

    #[test]
    fn unknown_strategy_is_a_descriptive_error() {
        let err = "turbo".parse::<Strategy>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("turbo"));
        assert!(message.contains("balanced"));
    }

    #[test]
    fn default_strategy_is_balanced() {
        assert_eq!(Strategy::default(), Strategy::Balanced);
    }
}
