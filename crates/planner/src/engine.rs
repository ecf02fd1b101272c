//! The planning engine - runs the full analysis pipeline.
//!
//! ```text
//! Build Graph -> Infer Conflicts -> Detect Cycles -> Schedule Groups
//!   -> Critical Path -> Execution Plan
//! ```
//!
//! The engine holds no state across runs; every plan is computed fresh
//! from the records it is given.

use chrono::Utc;
use tracing::info;

use waveplan_core::{
    ConflictKind, ConflictRecord, CriticalPath, ExecutionPlan, PlanMetadata, RawTicketRecord,
    ResolutionStrategy, Strategy, TicketId,
};
use waveplan_graph::{BuiltGraph, ConflictAnalyzer, CycleDetector, GraphBuilder, TicketGraph};

use crate::critical_path::CriticalPathAnalyzer;
use crate::scheduler::{GroupScheduler, ScheduleOutcome};

/// Computes execution plans from raw ticket records.
pub struct PlanEngine {
    builder: GraphBuilder,
    strategy: Strategy,
}

impl PlanEngine {
    /// Create an engine with the default balanced strategy.
    pub fn new() -> Self {
        Self {
            builder: GraphBuilder::new(),
            strategy: Strategy::default(),
        }
    }

    /// Set the scheduling strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The strategy this engine schedules with.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Run the full pipeline over raw records.
    ///
    /// An empty record set yields a valid empty plan; malformed records and
    /// dangling references are recovered during the build with warnings.
    pub fn plan(&self, records: &[RawTicketRecord]) -> ExecutionPlan {
        info!(
            records = records.len(),
            strategy = %self.strategy,
            "planning started"
        );

        let BuiltGraph { mut graph, warnings } = self.builder.build(records);
        if !warnings.is_empty() {
            info!(count = warnings.len(), "input defects recovered during build");
        }

        let mut conflicts = ConflictAnalyzer::analyze(&mut graph);
        let cycles = CycleDetector::detect(&graph);
        if let Some(record) = CycleDetector::to_conflict(&cycles) {
            conflicts.push(record);
        }

        self.plan_graph(&graph, conflicts)
    }

    /// Schedule an already-analyzed graph into an execution plan.
    pub fn plan_graph(&self, graph: &TicketGraph, conflicts: Vec<ConflictRecord>) -> ExecutionPlan {
        let ScheduleOutcome { groups, excluded } = GroupScheduler::new(self.strategy).schedule(graph);
        let critical_path = CriticalPathAnalyzer::analyze(graph, &groups);

        let total_duration: f64 = groups.iter().map(|g| g.estimated_duration).sum();
        let parallelism_factor = if groups.is_empty() {
            0.0
        } else {
            round2(graph.len() as f64 / groups.len() as f64)
        };

        let recommendations = recommendations(
            &conflicts,
            &excluded,
            &critical_path,
            graph.len(),
            parallelism_factor,
        );

        info!(
            groups = groups.len(),
            excluded = excluded.len(),
            conflicts = conflicts.len(),
            total_hours = total_duration,
            "planning finished"
        );

        ExecutionPlan {
            metadata: PlanMetadata {
                strategy: self.strategy,
                ticket_count: graph.len(),
                total_duration,
                parallelism_factor,
                generated_at: Utc::now(),
            },
            conflicts,
            groups,
            critical_path,
            recommendations,
            excluded,
        }
    }
}

impl Default for PlanEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive free-text optimization hints from the analysis results.
fn recommendations(
    conflicts: &[ConflictRecord],
    excluded: &[TicketId],
    critical_path: &CriticalPath,
    ticket_count: usize,
    parallelism_factor: f64,
) -> Vec<String> {
    let mut hints = Vec::new();

    if !excluded.is_empty() {
        hints.push(format!(
            "{} ticket(s) sit on a dependency cycle and were excluded from every group; \
             break the cycle and re-plan.",
            excluded.len()
        ));
    }

    let file_conflicts = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::FileConflict)
        .count();
    if file_conflicts > 0 {
        hints.push(format!(
            "{file_conflicts} file conflict(s) detected; run the touching tickets \
             sequentially or split the shared files."
        ));
    }

    if conflicts
        .iter()
        .any(|c| c.resolution == ResolutionStrategy::MutexCoordination)
    {
        hints.push(
            "Multiple tickets need registry access; serialize registry updates behind a \
             single coordinator."
                .to_string(),
        );
    }

    if conflicts
        .iter()
        .any(|c| c.resolution == ResolutionStrategy::LimitedParallelism)
    {
        hints.push(
            "Several agent-intensive tickets compete for capacity; cap how many run at once."
                .to_string(),
        );
    }

    if let Some(bottleneck) = critical_path.bottlenecks.first() {
        hints.push(format!(
            "Ticket '{}' is a critical-path bottleneck ({} dependent(s), {:.1}h); \
             prioritize it.",
            bottleneck.ticket, bottleneck.dependents, bottleneck.estimated_effort
        ));
    }

    if ticket_count > 3 && parallelism_factor > 0.0 && parallelism_factor < 1.5 {
        hints.push(
            "Parallelism is low for this many tickets; consider relaxing sequential \
             dependencies."
                .to_string(),
        );
    }

    hints
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
