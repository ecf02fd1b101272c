//! Conflict inference over the ticket graph.
//!
//! Conflicts are mutual, symmetric constraints discovered from shared
//! affected files and shared constrained resources. They steer group
//! composition in the scheduler but are not directed edges, so they never
//! participate in cycle detection.

use std::collections::BTreeMap;

use tracing::debug;

use waveplan_core::{ConflictKind, ConflictRecord, Impact, ResolutionStrategy, TicketId};

use crate::graph::TicketGraph;

/// Infers file and resource conflicts, populating the nodes' conflict sets.
pub struct ConflictAnalyzer;

impl ConflictAnalyzer {
    /// Analyze the graph, mark conflicting nodes symmetrically, and return
    /// the discovered conflict records.
    ///
    /// File records are emitted in lexicographic file order and resource
    /// records in a fixed registry-then-agent order, so output is
    /// reproducible for identical graphs.
    pub fn analyze(graph: &mut TicketGraph) -> Vec<ConflictRecord> {
        let mut records = file_conflicts(graph);
        records.extend(resource_conflicts(graph));
        records
    }
}

/// Group tickets by affected file; every file touched by two or more
/// tickets yields one conflict record naming all touchers.
fn file_conflicts(graph: &mut TicketGraph) -> Vec<ConflictRecord> {
    let mut by_file: BTreeMap<String, Vec<TicketId>> = BTreeMap::new();
    for node in graph.nodes() {
        for file in &node.affected_files {
            by_file.entry(file.clone()).or_default().push(node.id.clone());
        }
    }

    let mut records = Vec::new();
    for (file, tickets) in &by_file {
        if tickets.len() < 2 {
            continue;
        }
        debug!(file = %file, tickets = tickets.len(), "file conflict detected");
        for ticket in tickets {
            mark_conflicts(graph, ticket, tickets, ConflictSet::File);
        }
        records.push(ConflictRecord::new(
            ConflictKind::FileConflict,
            tickets.clone(),
            ResolutionStrategy::Sequential,
            Impact::Medium,
        ));
    }
    records
}

/// Emit resource conflicts for the constrained capability groups.
fn resource_conflicts(graph: &mut TicketGraph) -> Vec<ConflictRecord> {
    let registry: Vec<TicketId> = graph
        .nodes()
        .filter(|n| n.resources.registry_access)
        .map(|n| n.id.clone())
        .collect();
    let agent_heavy: Vec<TicketId> = graph
        .nodes()
        .filter(|n| n.resources.agent_intensive)
        .map(|n| n.id.clone())
        .collect();
    let template_creators = graph
        .nodes()
        .filter(|n| n.resources.template_creation)
        .count();

    let mut records = Vec::new();

    // Registry access must be serialized, but the coordination is cheap.
    if registry.len() >= 2 {
        debug!(tickets = registry.len(), "registry access conflict detected");
        for ticket in &registry {
            mark_conflicts(graph, ticket, &registry, ConflictSet::Resource);
        }
        records.push(ConflictRecord::new(
            ConflictKind::ResourceConflict,
            registry,
            ResolutionStrategy::MutexCoordination,
            Impact::Low,
        ));
    }

    // Heavy agent computation must not be fully parallelized.
    if agent_heavy.len() > 3 {
        debug!(tickets = agent_heavy.len(), "agent capacity conflict detected");
        for ticket in &agent_heavy {
            mark_conflicts(graph, ticket, &agent_heavy, ConflictSet::Resource);
        }
        records.push(ConflictRecord::new(
            ConflictKind::ResourceConflict,
            agent_heavy,
            ResolutionStrategy::LimitedParallelism,
            Impact::Medium,
        ));
    }

    // Template creators are tracked but do not conflict on their own.
    debug!(tickets = template_creators, "template creators counted");

    records
}

enum ConflictSet {
    File,
    Resource,
}

/// Add every other group member to `ticket`'s conflict set.
fn mark_conflicts(graph: &mut TicketGraph, ticket: &TicketId, group: &[TicketId], set: ConflictSet) {
    let Some(node) = graph.node_mut(ticket) else {
        return;
    };
    let target = match set {
        ConflictSet::File => &mut node.dependencies.file_conflicts,
        ConflictSet::Resource => &mut node.dependencies.resource_conflicts,
    };
    for other in group {
        if other != ticket {
            target.insert(other.clone());
        }
    }
}
