//! Plan validation against the graph's ordering invariants.
//!
//! Plans may be hand-edited between planning and execution; the validator
//! re-checks completeness and ordering without mutating anything. Problems
//! are reported as an enumerable issue list, never as a hard failure - the
//! caller decides whether to accept, reject, or re-derive the plan.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use waveplan_core::{ExecutionPlan, TicketId};
use waveplan_graph::TicketGraph;

/// Outcome of validating a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True iff no issues were found
    pub valid: bool,
    /// Every violation found, in check order
    pub issues: Vec<String>,
}

/// Checks a candidate plan against a freshly built graph.
pub struct PlanValidator;

impl PlanValidator {
    /// Validate the plan: every graph ticket must appear in exactly one
    /// group, and every blocking/sequential dependency present in the plan
    /// must sit in a strictly earlier group than its dependent.
    pub fn validate(graph: &TicketGraph, plan: &ExecutionPlan) -> ValidationReport {
        let mut issues = Vec::new();

        let mut group_of: HashMap<TicketId, usize> = HashMap::new();
        for (index, group) in plan.groups.iter().enumerate() {
            for ticket in &group.tickets {
                if let Some(previous) = group_of.insert(ticket.clone(), index) {
                    issues.push(format!(
                        "ticket '{ticket}' appears in more than one group (groups {} and {})",
                        previous + 1,
                        index + 1,
                    ));
                }
            }
        }

        for id in graph.ids() {
            if !group_of.contains_key(id) {
                issues.push(format!("ticket '{id}' is missing from the plan"));
            }
        }

        for node in graph.nodes() {
            let Some(&ticket_group) = group_of.get(&node.id) else {
                continue;
            };
            for dep in node.dependencies.ordering() {
                let Some(&dep_group) = group_of.get(dep) else {
                    continue;
                };
                if dep_group >= ticket_group {
                    issues.push(format!(
                        "ticket '{}' is in group {} but its dependency '{dep}' is in group {}",
                        node.id,
                        ticket_group + 1,
                        dep_group + 1,
                    ));
                }
            }
        }

        ValidationReport {
            valid: issues.is_empty(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PlanEngine;
    use waveplan_core::{RawDependencies, RawTicketRecord};

    fn record(id: &str, deps: &[&str]) -> RawTicketRecord {
        RawTicketRecord {
            id: id.to_string(),
            title: id.to_string(),
            dependencies: RawDependencies::Flat(deps.iter().map(|d| d.to_string()).collect()),
            priority: None,
            body: String::new(),
            effort: None,
        }
    }

    fn plan_and_graph(records: &[RawTicketRecord]) -> (TicketGraph, ExecutionPlan) {
        let engine = PlanEngine::new();
        let plan = engine.plan(records);
        let built = waveplan_graph::GraphBuilder::new().build(records);
        (built.graph, plan)
    }

    #[test]
    fn freshly_planned_output_is_valid() {
        let records = vec![
            record("a", &[]),
            record("b", &["a"]),
            record("c", &["a", "b"]),
        ];
        let (graph, plan) = plan_and_graph(&records);

        let report = PlanValidator::validate(&graph, &plan);
        assert!(report.valid, "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn missing_ticket_is_named() {
        let records = vec![record("a", &[]), record("b", &[])];
        let (graph, mut plan) = plan_and_graph(&records);
        for group in &mut plan.groups {
            group.tickets.retain(|t| t.as_str() != "b");
        }

        let report = PlanValidator::validate(&graph, &plan);
        assert!(!report.valid);
        assert!(report.issues.iter().any(|i| i.contains("'b'") && i.contains("missing")));
    }

    #[test]
    fn dependency_in_same_group_is_a_violation() {
        let records = vec![record("a", &[]), record("b", &["a"])];
        let (graph, mut plan) = plan_and_graph(&records);
        // Force a and b into one group.
        let all: Vec<TicketId> = vec!["a".into(), "b".into()];
        plan.groups.truncate(1);
        plan.groups[0].tickets = all;

        let report = PlanValidator::validate(&graph, &plan);
        assert!(!report.valid);
        assert!(report
            .issues
            .iter()
            .any(|i| i.contains("'b'") && i.contains("'a'")));
    }

    #[test]
    fn dependency_in_a_later_group_is_a_violation() {
        let records = vec![record("a", &[]), record("b", &["a"])];
        let (graph, mut plan) = plan_and_graph(&records);
        plan.groups.swap(0, 1);

        let report = PlanValidator::validate(&graph, &plan);
        assert!(!report.valid);
    }

    #[test]
    fn duplicated_ticket_is_reported() {
        let records = vec![record("a", &[]), record("b", &["a"])];
        let (graph, mut plan) = plan_and_graph(&records);
        let duplicate = plan.groups[0].tickets[0].clone();
        plan.groups[1].tickets.push(duplicate);

        let report = PlanValidator::validate(&graph, &plan);
        assert!(!report.valid);
        assert!(report.issues.iter().any(|i| i.contains("more than one group")));
    }

    #[test]
    fn validation_is_idempotent_and_read_only() {
        let records = vec![record("a", &[]), record("b", &["a"])];
        let (graph, plan) = plan_and_graph(&records);
        let deps_before = graph.node(&"b".into()).unwrap().dependencies.clone();

        let first = PlanValidator::validate(&graph, &plan);
        let second = PlanValidator::validate(&graph, &plan);
        assert_eq!(first, second);

        let deps_after = graph.node(&"b".into()).unwrap().dependencies.clone();
        assert_eq!(deps_before.blocking, deps_after.blocking);
        assert_eq!(deps_before.sequential, deps_after.sequential);
    }
}
