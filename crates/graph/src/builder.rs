//! Graph construction from raw ticket records.
//!
//! The builder normalizes whatever the ticket source hands over into uniform
//! [`TicketNode`]s: flat dependency lists become blocking edges, file
//! references and resource hints are extracted from free text, and effort
//! fields are parsed with a safe fallback. Malformed records are skipped
//! with a warning; one bad record never aborts the batch.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use tracing::{debug, warn};

use waveplan_core::{
    Priority, RawDependencies, RawTicketRecord, ResourceRequirements, TicketId, TicketNode,
    DEFAULT_EFFORT_HOURS,
};

use crate::graph::TicketGraph;

/// Extensions that qualify a token as a file reference.
const FILE_EXTENSIONS: &str = "md|rs|js|ts|tsx|json|ya?ml|toml|sh|py|css|html";

/// A built graph together with the warnings accumulated while building it.
#[derive(Debug, Default)]
pub struct BuiltGraph {
    /// The normalized ticket graph
    pub graph: TicketGraph,
    /// Human-readable notes about skipped records and dropped edges
    pub warnings: Vec<String>,
}

/// Normalizes raw ticket records into a [`TicketGraph`].
pub struct GraphBuilder {
    file_patterns: Vec<Regex>,
    effort_pattern: Regex,
}

impl GraphBuilder {
    /// Create a builder with its extraction patterns compiled.
    pub fn new() -> Self {
        let file_patterns = vec![
            // `path/to/file.ext`
            Regex::new(&format!(r"`([^`\s]+\.(?:{FILE_EXTENSIONS}))`")),
            // [label](path/to/file.ext)
            Regex::new(&format!(r"\[[^\]]*\]\(([^)\s]+\.(?:{FILE_EXTENSIONS}))\)")),
            // bare path-like token
            Regex::new(&format!(r"([A-Za-z0-9_./-]+\.(?:{FILE_EXTENSIONS}))\b")),
        ]
        .into_iter()
        .map(|p| p.expect("file pattern is a valid regex"))
        .collect();

        Self {
            file_patterns,
            effort_pattern: Regex::new(r"(\d+(?:\.\d+)?)").expect("effort pattern is a valid regex"),
        }
    }

    /// Build a graph from a batch of raw records.
    ///
    /// Records with a blank id and duplicate ids are skipped; dependency
    /// references to tickets absent from the batch are pruned after all
    /// nodes exist. Every recovery is logged and returned as a warning.
    pub fn build(&self, records: &[RawTicketRecord]) -> BuiltGraph {
        let mut graph = TicketGraph::new();
        let mut warnings = Vec::new();

        for record in records {
            let Some(node) = self.normalize(record, &mut warnings) else {
                continue;
            };
            let id = node.id.clone();
            if !graph.insert(node) {
                let message = format!("duplicate ticket id '{id}'; later record skipped");
                warn!(ticket = %id, "duplicate ticket id; later record skipped");
                warnings.push(message);
            }
        }

        prune_dangling(&mut graph, &mut warnings);

        debug!(
            tickets = graph.len(),
            warnings = warnings.len(),
            "ticket graph built"
        );
        BuiltGraph { graph, warnings }
    }

    /// Turn one raw record into a node, or skip it with a warning.
    fn normalize(&self, record: &RawTicketRecord, warnings: &mut Vec<String>) -> Option<TicketNode> {
        let id = record.id.trim();
        if id.is_empty() {
            let message = format!("ticket record '{}' has a blank id; skipped", record.title);
            warn!(title = %record.title, "ticket record has a blank id; skipped");
            warnings.push(message);
            return None;
        }
        let id = TicketId::new(id);

        let mut node = TicketNode::new(id.clone(), record.title.clone());

        match &record.dependencies {
            // Legacy shorthand: a flat list is entirely blocking.
            RawDependencies::Flat(ids) => {
                node.dependencies.blocking = normalize_dep_list(&id, ids, warnings, true);
            }
            RawDependencies::Structured {
                blocking,
                sequential,
                soft,
            } => {
                node.dependencies.blocking = normalize_dep_list(&id, blocking, warnings, true);
                node.dependencies.sequential = normalize_dep_list(&id, sequential, warnings, true);
                node.dependencies.soft = normalize_dep_list(&id, soft, warnings, false);
            }
        }

        node.affected_files = self.extract_files(&record.body);
        node.resources = infer_resources(&record.body, &node.affected_files);
        node.estimated_effort = self.parse_effort(record.effort.as_deref());
        node.priority = match record.priority.as_deref() {
            Some(value) => Priority::parse_lenient(value),
            None => Priority::default(),
        };

        Some(node)
    }

    /// Extract file references from free text: backtick-quoted names,
    /// markdown link targets, and bare path-like tokens with a recognized
    /// extension.
    fn extract_files(&self, text: &str) -> BTreeSet<String> {
        let mut files = BTreeSet::new();
        for pattern in &self.file_patterns {
            for captures in pattern.captures_iter(text) {
                if let Some(path) = captures.get(1) {
                    files.insert(path.as_str().to_string());
                }
            }
        }
        files
    }

    /// Parse the first numeric token of an effort field; anything absent,
    /// unparsable, or non-positive falls back to the default.
    fn parse_effort(&self, effort: Option<&str>) -> f64 {
        let Some(text) = effort else {
            return DEFAULT_EFFORT_HOURS;
        };
        self.effort_pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|token| token.as_str().parse::<f64>().ok())
            .filter(|hours| hours.is_finite() && *hours > 0.0)
            .unwrap_or(DEFAULT_EFFORT_HOURS)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Deduplicate a dependency list and drop self-references.
fn normalize_dep_list(
    owner: &TicketId,
    raw: &[String],
    warnings: &mut Vec<String>,
    warn_on_self: bool,
) -> Vec<TicketId> {
    let mut seen = HashSet::new();
    let mut deps = Vec::new();
    for value in raw {
        let dep = value.trim();
        if dep.is_empty() {
            continue;
        }
        let dep = TicketId::new(dep);
        if dep == *owner {
            if warn_on_self {
                let message = format!("ticket '{owner}' depends on itself; reference dropped");
                warn!(ticket = %owner, "self-dependency dropped");
                warnings.push(message);
            }
            continue;
        }
        if seen.insert(dep.clone()) {
            deps.push(dep);
        }
    }
    deps
}

/// Infer resource flags from keyword presence in the ticket body.
fn infer_resources(body: &str, affected_files: &BTreeSet<String>) -> ResourceRequirements {
    let text = body.to_lowercase();
    ResourceRequirements {
        // "registry" also covers the TICKET_REGISTRY marker once lowercased
        registry_access: text.contains("registry"),
        file_modifications: !affected_files.is_empty() || text.contains("file"),
        template_creation: text.contains("template"),
        validation_required: text.contains("validat") || text.contains("verify"),
        agent_intensive: text.contains("agent"),
    }
}

/// Drop blocking/sequential references to tickets absent from the graph.
/// Soft references are advisory and pruned silently.
fn prune_dangling(graph: &mut TicketGraph, warnings: &mut Vec<String>) {
    let known: HashSet<TicketId> = graph.ids().cloned().collect();
    let order: Vec<TicketId> = graph.ids().cloned().collect();

    for id in order {
        let Some(node) = graph.node_mut(&id) else {
            continue;
        };
        for deps in [
            &mut node.dependencies.blocking,
            &mut node.dependencies.sequential,
        ] {
            deps.retain(|dep| {
                let keep = known.contains(dep);
                if !keep {
                    let message =
                        format!("ticket '{id}' depends on unknown ticket '{dep}'; edge dropped");
                    warn!(ticket = %id, dependency = %dep, "dangling dependency dropped");
                    warnings.push(message);
                }
                keep
            });
        }
        node.dependencies.soft.retain(|dep| known.contains(dep));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> RawTicketRecord {
        RawTicketRecord {
            id: id.to_string(),
            title: format!("Ticket {id}"),
            dependencies: RawDependencies::default(),
            priority: None,
            body: String::new(),
            effort: None,
        }
    }

    #[test]
    fn flat_dependency_lists_become_blocking() {
        let builder = GraphBuilder::new();
        let mut a = record("a");
        a.dependencies = RawDependencies::Flat(vec!["b".to_string(), "c".to_string()]);

        let built = builder.build(&[a, record("b"), record("c")]);
        let node = built.graph.node(&"a".into()).unwrap();
        let blocking: Vec<&str> = node.dependencies.blocking.iter().map(|d| d.as_str()).collect();
        assert_eq!(blocking, vec!["b", "c"]);
        assert!(node.dependencies.sequential.is_empty());
        assert!(built.warnings.is_empty());
    }

    #[test]
    fn structured_dependencies_map_per_category() {
        let builder = GraphBuilder::new();
        let mut a = record("a");
        a.dependencies = RawDependencies::Structured {
            blocking: vec!["b".to_string()],
            sequential: vec!["c".to_string()],
            soft: vec!["d".to_string()],
        };

        let built = builder.build(&[a, record("b"), record("c"), record("d")]);
        let node = built.graph.node(&"a".into()).unwrap();
        assert_eq!(node.dependencies.blocking, vec!["b".into()]);
        assert_eq!(node.dependencies.sequential, vec!["c".into()]);
        assert_eq!(node.dependencies.soft, vec!["d".into()]);
        assert!(node.dependencies.file_conflicts.is_empty());
        assert!(node.dependencies.resource_conflicts.is_empty());
    }

    #[test]
    fn file_references_are_extracted_and_deduplicated() {
        let builder = GraphBuilder::new();
        let mut a = record("a");
        a.body = "Update `docs/setup.md` and [the config](config/app.yaml). \
                  Also touches src/main.rs and docs/setup.md again."
            .to_string();

        let built = builder.build(&[a]);
        let files: Vec<&str> = built
            .graph
            .node(&"a".into())
            .unwrap()
            .affected_files
            .iter()
            .map(|f| f.as_str())
            .collect();
        assert_eq!(files, vec!["config/app.yaml", "docs/setup.md", "src/main.rs"]);
    }

    #[test]
    fn plain_words_are_not_file_references() {
        let builder = GraphBuilder::new();
        let mut a = record("a");
        a.body = "Refactor the parser. No file names here, e.g. widget.factory".to_string();

        let built = builder.build(&[a]);
        assert!(built.graph.node(&"a".into()).unwrap().affected_files.is_empty());
    }

    #[test]
    fn effort_parses_first_numeric_token() {
        let builder = GraphBuilder::new();
        assert_eq!(builder.parse_effort(Some("3 hours")), 3.0);
        assert_eq!(builder.parse_effort(Some("about 1.5h, maybe 2")), 1.5);
        assert_eq!(builder.parse_effort(Some("unknown")), DEFAULT_EFFORT_HOURS);
        assert_eq!(builder.parse_effort(Some("0 hours")), DEFAULT_EFFORT_HOURS);
        assert_eq!(builder.parse_effort(None), DEFAULT_EFFORT_HOURS);
    }

    #[test]
    fn resource_flags_infer_from_keywords() {
        let builder = GraphBuilder::new();
        let mut a = record("a");
        a.body = "Register new entries in TICKET_REGISTRY, then validate the template output."
            .to_string();

        let built = builder.build(&[a]);
        let resources = built.graph.node(&"a".into()).unwrap().resources;
        assert!(resources.registry_access);
        assert!(resources.template_creation);
        assert!(resources.validation_required);
        assert!(!resources.agent_intensive);
    }

    #[test]
    fn self_dependency_is_dropped_with_warning() {
        let builder = GraphBuilder::new();
        let mut a = record("a");
        a.dependencies = RawDependencies::Flat(vec!["a".to_string(), "b".to_string()]);

        let built = builder.build(&[a, record("b")]);
        let node = built.graph.node(&"a".into()).unwrap();
        assert_eq!(node.dependencies.blocking, vec!["b".into()]);
        assert!(built.warnings.iter().any(|w| w.contains("depends on itself")));
    }

    #[test]
    fn dangling_references_are_pruned_with_warning() {
        let builder = GraphBuilder::new();
        let mut a = record("a");
        a.dependencies = RawDependencies::Structured {
            blocking: vec!["ghost".to_string()],
            sequential: vec!["b".to_string()],
            soft: vec!["phantom".to_string()],
        };

        let built = builder.build(&[a, record("b")]);
        let node = built.graph.node(&"a".into()).unwrap();
        assert!(node.dependencies.blocking.is_empty());
        assert_eq!(node.dependencies.sequential, vec!["b".into()]);
        assert!(node.dependencies.soft.is_empty());
        assert!(built.warnings.iter().any(|w| w.contains("ghost")));
        // Soft references are pruned without a warning.
        assert!(!built.warnings.iter().any(|w| w.contains("phantom")));
    }

    #[test]
    fn blank_ids_and_duplicates_are_skipped() {
        let builder = GraphBuilder::new();
        let mut blank = record("   ");
        blank.title = "no id".to_string();
        let duplicate = record("a");

        let built = builder.build(&[record("a"), blank, duplicate]);
        assert_eq!(built.graph.len(), 1);
        assert_eq!(built.warnings.len(), 2);
    }

    #[test]
    fn priority_falls_back_to_medium() {
        let builder = GraphBuilder::new();
        let mut a = record("a");
        a.priority = Some("urgent-ish".to_string());

        let built = builder.build(&[a, record("b")]);
        assert_eq!(built.graph.node(&"a".into()).unwrap().priority, Priority::Medium);
        assert_eq!(built.graph.node(&"b".into()).unwrap().priority, Priority::Medium);
    }
}
