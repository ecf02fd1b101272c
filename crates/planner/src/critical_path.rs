//! Critical path computation over scheduled groups.
//!
//! The longest effort-weighted dependency chain bounds how fast the whole
//! plan can finish no matter how many executors run in parallel. The
//! computation is purely derived from the graph and the already-built
//! groups; nothing is mutated.

use std::collections::HashMap;

use tracing::debug;

use waveplan_core::{Bottleneck, CriticalPath, ParallelGroup, TicketId};
use waveplan_graph::TicketGraph;

/// A path ticket with more dependents than this is a bottleneck.
const BOTTLENECK_FANOUT: usize = 2;

/// A path ticket with more effort than this is a bottleneck (hours).
const BOTTLENECK_EFFORT_HOURS: f64 = 3.0;

/// Computes the effort-weighted longest path and flags its bottlenecks.
pub struct CriticalPathAnalyzer;

impl CriticalPathAnalyzer {
    /// Walk tickets in group order, relaxing each ticket's distance over
    /// its ordering dependencies, then reconstruct the longest chain from
    /// the recorded predecessors.
    ///
    /// Ties on the maximum distance resolve to the earliest ticket in
    /// group order, keeping the result reproducible.
    pub fn analyze(graph: &TicketGraph, groups: &[ParallelGroup]) -> CriticalPath {
        let order: Vec<TicketId> = groups
            .iter()
            .flat_map(|group| group.tickets.iter().cloned())
            .collect();

        let mut distance: HashMap<TicketId, f64> = HashMap::new();
        let mut predecessor: HashMap<TicketId, TicketId> = HashMap::new();

        for id in &order {
            let Some(node) = graph.node(id) else {
                continue;
            };
            let mut best = 0.0;
            let mut best_predecessor = None;
            for dep in node.dependencies.ordering() {
                let (Some(dep_distance), Some(dep_node)) = (distance.get(dep), graph.node(dep))
                else {
                    continue;
                };
                let candidate = dep_distance + dep_node.estimated_effort;
                if candidate > best {
                    best = candidate;
                    best_predecessor = Some(dep.clone());
                }
            }
            distance.insert(id.clone(), best);
            if let Some(dep) = best_predecessor {
                predecessor.insert(id.clone(), dep);
            }
        }

        let mut end: Option<(&TicketId, f64)> = None;
        for id in &order {
            let Some(&d) = distance.get(id) else {
                continue;
            };
            match end {
                Some((_, best)) if d <= best => {}
                _ => end = Some((id, d)),
            }
        }
        let Some((end_id, max_distance)) = end else {
            return CriticalPath::default();
        };

        let total_duration = max_distance
            + graph
                .node(end_id)
                .map(|node| node.estimated_effort)
                .unwrap_or(0.0);

        let mut tickets = vec![end_id.clone()];
        let mut cursor = end_id.clone();
        while let Some(dep) = predecessor.get(&cursor) {
            tickets.push(dep.clone());
            cursor = dep.clone();
        }
        tickets.reverse();

        let bottlenecks = find_bottlenecks(graph, &tickets);
        debug!(
            length = tickets.len(),
            hours = total_duration,
            bottlenecks = bottlenecks.len(),
            "critical path computed"
        );

        CriticalPath {
            tickets,
            total_duration,
            bottlenecks,
        }
    }
}

/// Flag path tickets with disproportionate fan-out or effort.
fn find_bottlenecks(graph: &TicketGraph, path: &[TicketId]) -> Vec<Bottleneck> {
    let dependents = graph.dependents();
    path.iter()
        .filter_map(|id| {
            let node = graph.node(id)?;
            let dependent_count = dependents.get(id).map(|d| d.len()).unwrap_or(0);
            let flagged = dependent_count > BOTTLENECK_FANOUT
                || node.estimated_effort > BOTTLENECK_EFFORT_HOURS;
            flagged.then(|| Bottleneck {
                ticket: id.clone(),
                dependents: dependent_count,
                estimated_effort: node.estimated_effort,
            })
        })
        .collect()
}
