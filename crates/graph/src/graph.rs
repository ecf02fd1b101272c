//! The in-memory ticket graph.

use std::collections::HashMap;

use waveplan_core::{TicketId, TicketNode};

/// An id-keyed adjacency value over ticket nodes.
///
/// Nodes are stored in a map for lookup plus an explicit insertion-order
/// vector: every traversal that can reach engine output iterates `order`, so
/// results never depend on hash-map iteration order. Dependency edges are
/// plain ids, never object references, which keeps cycle detection and
/// partial scheduling well-defined when cycles exist.
#[derive(Debug, Clone, Default)]
pub struct TicketGraph {
    nodes: HashMap<TicketId, TicketNode>,
    order: Vec<TicketId>,
}

impl TicketGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, keeping insertion order. Returns `false` if a node
    /// with the same id already exists (the graph is left unchanged).
    pub fn insert(&mut self, node: TicketNode) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Number of tickets in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph has no tickets.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether a ticket with this id exists.
    pub fn contains(&self, id: &TicketId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node by id.
    pub fn node(&self, id: &TicketId) -> Option<&TicketNode> {
        self.nodes.get(id)
    }

    /// Look up a node mutably by id.
    pub fn node_mut(&mut self, id: &TicketId) -> Option<&mut TicketNode> {
        self.nodes.get_mut(id)
    }

    /// Ticket ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &TicketId> {
        self.order.iter()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &TicketNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Reverse ordering edges: for every ticket, the tickets that declare it
    /// as a blocking or sequential dependency, in insertion order of the
    /// declaring ticket.
    pub fn dependents(&self) -> HashMap<TicketId, Vec<TicketId>> {
        let mut reverse: HashMap<TicketId, Vec<TicketId>> = HashMap::new();
        for node in self.nodes() {
            for dep in node.dependencies.ordering() {
                reverse.entry(dep.clone()).or_default().push(node.id.clone());
            }
        }
        reverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut graph = TicketGraph::new();
        for id in ["c", "a", "b"] {
            graph.insert(TicketNode::new(id, id));
        }

        let ids: Vec<&str> = graph.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut graph = TicketGraph::new();
        assert!(graph.insert(TicketNode::new("a", "first")));
        assert!(!graph.insert(TicketNode::new("a", "second")));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.node(&"a".into()).unwrap().title, "first");
    }

    #[test]
    fn dependents_reverses_ordering_edges() {
        let mut graph = TicketGraph::new();
        graph.insert(TicketNode::new("a", "a"));
        let mut b = TicketNode::new("b", "b");
        b.dependencies.blocking.push("a".into());
        graph.insert(b);
        let mut c = TicketNode::new("c", "c");
        c.dependencies.sequential.push("a".into());
        graph.insert(c);

        let reverse = graph.dependents();
        let of_a: Vec<&str> = reverse[&"a".into()].iter().map(|id| id.as_str()).collect();
        assert_eq!(of_a, vec!["b", "c"]);
        assert!(!reverse.contains_key(&"b".into()));
    }
}
