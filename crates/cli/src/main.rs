//! waveplan CLI - dependency-aware execution planning for tickets.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use waveplan_core::{ExecutionPlan, RawTicketRecord, Strategy};
use waveplan_graph::GraphBuilder;
use waveplan_planner::{PlanEngine, PlanValidator};

#[derive(Parser)]
#[command(name = "waveplan")]
#[command(about = "Conflict-aware parallel execution planning for tickets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute an execution plan from ticket records
    Plan {
        /// Path to a JSON array of raw ticket records
        #[arg(long)]
        input: PathBuf,
        /// Scheduling strategy: maximum, balanced, or sequential
        #[arg(long, default_value = "balanced")]
        strategy: String,
        /// Pretty-print the plan JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a previously produced (possibly edited) plan
    Validate {
        /// Path to a JSON array of raw ticket records
        #[arg(long)]
        input: PathBuf,
        /// Path to the plan JSON to check
        #[arg(long)]
        plan: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            input,
            strategy,
            pretty,
        } => {
            let strategy: Strategy = strategy.parse()?;
            let records = load_records(&input)?;

            let plan = PlanEngine::new().with_strategy(strategy).plan(&records);

            let json = if pretty {
                serde_json::to_string_pretty(&plan)?
            } else {
                serde_json::to_string(&plan)?
            };
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { input, plan } => {
            let records = load_records(&input)?;
            let built = GraphBuilder::new().build(&records);

            let text = fs::read_to_string(&plan)
                .with_context(|| format!("reading plan {}", plan.display()))?;
            let plan: ExecutionPlan =
                serde_json::from_str(&text).context("parsing plan JSON")?;

            let report = PlanValidator::validate(&built.graph, &plan);
            println!("{}", serde_json::to_string_pretty(&report)?);

            Ok(if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn load_records(path: &Path) -> Result<Vec<RawTicketRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading tickets {}", path.display()))?;
    serde_json::from_str(&text).context("parsing ticket records JSON")
}
