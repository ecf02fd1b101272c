//! Level-order decomposition of the ticket graph into parallel groups.
//!
//! Kahn's algorithm drives the levels: tickets whose ordering dependencies
//! are all satisfied form the frontier, the strategy picks which frontier
//! members become the next group, and only the emitted tickets advance the
//! in-degree accounting. Tickets stuck on a dependency cycle never reach
//! the frontier and are returned as an explicit exclusion list rather than
//! silently dropped.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use waveplan_core::{ParallelGroup, Strategy, TicketId};
use waveplan_graph::TicketGraph;

/// Balanced groups never exceed this many tickets.
const BALANCED_GROUP_CAP: usize = 4;

/// Result of a scheduling run.
#[derive(Debug, Clone, Default)]
pub struct ScheduleOutcome {
    /// Execution waves in topological order
    pub groups: Vec<ParallelGroup>,
    /// Tickets left out of every group because they sit on a cycle
    pub excluded: Vec<TicketId>,
}

/// Turns a ticket graph into ordered parallel groups under a strategy.
pub struct GroupScheduler {
    strategy: Strategy,
}

impl GroupScheduler {
    /// Create a scheduler for the given strategy.
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// Decompose the graph into groups such that every ticket's blocking
    /// and sequential dependencies land in a strictly earlier group.
    ///
    /// The frontier is seeded and extended in graph insertion order, so
    /// identical graphs always produce identical plans.
    pub fn schedule(&self, graph: &TicketGraph) -> ScheduleOutcome {
        let mut in_degree: HashMap<TicketId, usize> = graph
            .nodes()
            .map(|node| {
                let degree = node
                    .dependencies
                    .ordering()
                    .filter(|dep| graph.contains(dep))
                    .count();
                (node.id.clone(), degree)
            })
            .collect();
        let dependents = graph.dependents();

        let mut frontier: Vec<TicketId> = graph
            .ids()
            .filter(|id| in_degree[*id] == 0)
            .cloned()
            .collect();
        let mut scheduled: HashSet<TicketId> = HashSet::new();
        let mut groups = Vec::new();

        while !frontier.is_empty() {
            let selection = self.select(&frontier, graph);
            frontier.retain(|id| !selection.contains(id));

            for id in &selection {
                scheduled.insert(id.clone());
                let Some(successors) = dependents.get(id) else {
                    continue;
                };
                for successor in successors {
                    let Some(remaining) = in_degree.get_mut(successor) else {
                        continue;
                    };
                    if *remaining > 0 {
                        *remaining -= 1;
                        if *remaining == 0 {
                            frontier.push(successor.clone());
                        }
                    }
                }
            }

            debug!(group = groups.len() + 1, tickets = selection.len(), "group emitted");
            groups.push(build_group(graph, groups.len() + 1, selection));
        }

        let excluded: Vec<TicketId> = graph
            .ids()
            .filter(|id| !scheduled.contains(*id))
            .cloned()
            .collect();

        ScheduleOutcome { groups, excluded }
    }

    /// Pick which frontier members form the next group.
    fn select(&self, frontier: &[TicketId], graph: &TicketGraph) -> Vec<TicketId> {
        match self.strategy {
            // Full available parallelism, conflicts and all.
            Strategy::Maximum => frontier.to_vec(),
            // One ticket per round; the rest of the frontier waits.
            Strategy::Sequential => frontier.first().cloned().into_iter().collect(),
            Strategy::Balanced => select_balanced(frontier, graph),
        }
    }
}

/// Up to [`BALANCED_GROUP_CAP`] frontier members with no direct conflict
/// among them. If every candidate conflicts, the first frontier member is
/// taken anyway so the schedule always advances.
fn select_balanced(frontier: &[TicketId], graph: &TicketGraph) -> Vec<TicketId> {
    let mut selection: Vec<TicketId> = Vec::new();
    for candidate in frontier {
        if selection.len() == BALANCED_GROUP_CAP {
            break;
        }
        if selection
            .iter()
            .any(|member| direct_conflict(graph, member, candidate))
        {
            continue;
        }
        selection.push(candidate.clone());
    }
    if selection.is_empty() {
        selection.extend(frontier.first().cloned());
    }
    selection
}

/// Whether two tickets must not share a group: a file conflict between
/// them, or both needing serialized registry access.
fn direct_conflict(graph: &TicketGraph, a: &TicketId, b: &TicketId) -> bool {
    let (Some(node_a), Some(node_b)) = (graph.node(a), graph.node(b)) else {
        return false;
    };
    node_a.dependencies.file_conflicts.contains(b)
        || (node_a.resources.registry_access && node_b.resources.registry_access)
}

/// Assemble the emitted group with its derived metadata.
fn build_group(graph: &TicketGraph, group_id: usize, tickets: Vec<TicketId>) -> ParallelGroup {
    // Parallel execution is bounded by the slowest member.
    let estimated_duration = tickets
        .iter()
        .filter_map(|id| graph.node(id))
        .map(|node| node.estimated_effort)
        .fold(0.0, f64::max);

    let has_conflicts = tickets.iter().enumerate().any(|(index, a)| {
        tickets[index + 1..]
            .iter()
            .any(|b| mutual_conflict(graph, a, b))
    });

    ParallelGroup {
        group_id,
        agents_required: tickets.len(),
        tickets,
        estimated_duration,
        has_conflicts,
    }
}

/// Whether two tickets are mutually present in each other's conflict sets.
fn mutual_conflict(graph: &TicketGraph, a: &TicketId, b: &TicketId) -> bool {
    let (Some(node_a), Some(node_b)) = (graph.node(a), graph.node(b)) else {
        return false;
    };
    node_a.dependencies.conflicts_with(b) && node_b.dependencies.conflicts_with(a)
}
