//! Circular dependency detection.
//!
//! Only the directed ordering edges (blocking and sequential) can form
//! cycles; conflict edges are symmetric and never participate. Detection
//! never fails planning: cycles are surfaced as a single high-impact
//! conflict record for the caller to resolve.

use std::collections::HashSet;

use tracing::warn;

use waveplan_core::{ConflictRecord, TicketId};

use crate::graph::TicketGraph;

/// Detects dependency cycles with a depth-first search.
pub struct CycleDetector;

impl CycleDetector {
    /// Find all dependency cycles, one at most per DFS root, visiting roots
    /// in graph insertion order.
    ///
    /// Each cycle is the suffix of the traversal path from the first
    /// recurrence of the back-edge target through the current ticket,
    /// inclusive. Edges to ids absent from the graph cannot close a cycle
    /// and are ignored.
    pub fn detect(graph: &TicketGraph) -> Vec<Vec<TicketId>> {
        let mut cycles = Vec::new();
        let mut visited: HashSet<TicketId> = HashSet::new();

        for root in graph.ids() {
            if visited.contains(root) {
                continue;
            }
            // The recursion stack and path are per-root: once a cycle is
            // reported the unwound state is stale and must not leak into
            // the next traversal.
            let mut stack = HashSet::new();
            let mut path = Vec::new();
            if let Some(cycle) = find_cycle(graph, root, &mut visited, &mut stack, &mut path) {
                warn!(tickets = cycle.len(), "dependency cycle detected");
                cycles.push(cycle);
            }
        }

        cycles
    }

    /// Wrap detected cycles into the single circular-dependency conflict
    /// record, or `None` when the graph is acyclic.
    ///
    /// The record's ticket list is the deduplicated concatenation of all
    /// cycle members in discovery order.
    pub fn to_conflict(cycles: &[Vec<TicketId>]) -> Option<ConflictRecord> {
        if cycles.is_empty() {
            return None;
        }
        let mut seen = HashSet::new();
        let mut tickets = Vec::new();
        for cycle in cycles {
            for id in cycle {
                if seen.insert(id.clone()) {
                    tickets.push(id.clone());
                }
            }
        }
        Some(ConflictRecord::circular(tickets, cycles.to_vec()))
    }
}

/// DFS step: returns the first cycle reachable from `node`, if any.
fn find_cycle(
    graph: &TicketGraph,
    node: &TicketId,
    visited: &mut HashSet<TicketId>,
    stack: &mut HashSet<TicketId>,
    path: &mut Vec<TicketId>,
) -> Option<Vec<TicketId>> {
    visited.insert(node.clone());
    stack.insert(node.clone());
    path.push(node.clone());

    if let Some(ticket) = graph.node(node) {
        for dep in ticket.dependencies.ordering() {
            if !graph.contains(dep) {
                // Dangling edge: cannot close a cycle.
                continue;
            }
            if !visited.contains(dep) {
                if let Some(cycle) = find_cycle(graph, dep, visited, stack, path) {
                    return Some(cycle);
                }
            } else if stack.contains(dep) {
                let start = path.iter().position(|id| id == dep)?;
                return Some(path[start..].to_vec());
            }
        }
    }

    path.pop();
    stack.remove(node);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveplan_core::TicketNode;

    fn graph_with_edges(edges: &[(&str, &[&str])]) -> TicketGraph {
        let mut graph = TicketGraph::new();
        for (id, deps) in edges {
            let mut node = TicketNode::new(*id, *id);
            node.dependencies.blocking = deps.iter().map(|d| (*d).into()).collect();
            graph.insert(node);
        }
        graph
    }

    #[test]
    fn acyclic_chain_has_no_cycles() {
        let graph = graph_with_edges(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);
        assert!(CycleDetector::detect(&graph).is_empty());
        assert!(CycleDetector::to_conflict(&[]).is_none());
    }

    #[test]
    fn two_ticket_cycle_is_reported() {
        let graph = graph_with_edges(&[("a", &["b"]), ("b", &["a"])]);
        let cycles = CycleDetector::detect(&graph);
        assert_eq!(cycles, vec![vec!["a".into(), "b".into()]]);
    }

    #[test]
    fn independent_cycles_are_all_collected() {
        let graph = graph_with_edges(&[
            ("a", &["b"]),
            ("b", &["a"]),
            ("c", &["d"]),
            ("d", &["c"]),
            ("e", &[]),
        ]);

        let cycles = CycleDetector::detect(&graph);
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0], vec!["a".into(), "b".into()]);
        assert_eq!(cycles[1], vec!["c".into(), "d".into()]);
    }

    #[test]
    fn cycle_is_the_path_suffix_not_the_whole_path() {
        // e -> a -> b -> c -> a: only a, b, c are on the cycle.
        let graph = graph_with_edges(&[
            ("e", &["a"]),
            ("a", &["b"]),
            ("b", &["c"]),
            ("c", &["a"]),
        ]);

        let cycles = CycleDetector::detect(&graph);
        assert_eq!(cycles, vec![vec!["a".into(), "b".into(), "c".into()]]);
    }

    #[test]
    fn dangling_edges_cannot_close_a_cycle() {
        let graph = graph_with_edges(&[("a", &["ghost"]), ("b", &["a"])]);
        assert!(CycleDetector::detect(&graph).is_empty());
    }

    #[test]
    fn detection_is_a_pure_function() {
        let graph = graph_with_edges(&[("a", &["b"]), ("b", &["a"]), ("c", &[])]);
        assert_eq!(CycleDetector::detect(&graph), CycleDetector::detect(&graph));
    }

    #[test]
    fn conflict_record_deduplicates_members() {
        let cycles = vec![
            vec![TicketId::from("a"), "b".into()],
            vec![TicketId::from("b"), "c".into()],
        ];

        let record = CycleDetector::to_conflict(&cycles).unwrap();
        assert_eq!(record.tickets, vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(record.cycles, cycles);
    }
}
