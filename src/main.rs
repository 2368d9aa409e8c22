//! Histrion - Entry Point
//!
//! Runs one of the built-in timelines and prints its trace output, or
//! pretty-prints the scripts with `--print`.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use histrion::core::config::SimulationConfig;
use histrion::core::error::{Result, SimError};
use histrion::entity::EntityView;
use histrion::scenarios;
use histrion::simulation::{RunReport, Simulation, TraceRecord, TraceRecorder};

/// Histrion - deterministic narrative timelines
#[derive(Parser, Debug)]
#[command(name = "histrion")]
#[command(about = "Run a narrative timeline and print its trace")]
struct Args {
    /// Built-in scenario to run
    #[arg(long, default_value = "mars")]
    scenario: String,

    /// Simulation config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the scenario's scripts instead of running them
    #[arg(long)]
    print: bool,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,

    /// Log filter, e.g. "histrion=debug" (RUST_LOG also works)
    #[arg(long, default_value = "histrion=info")]
    log: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunOutput {
    scenario: String,
    report: Option<RunReport>,
    error: Option<String>,
    traces: Vec<TraceRecord>,
    entities: Vec<EntityView>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log)),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(scenario) = scenarios::by_name(&args.scenario) else {
        eprintln!(
            "Unknown scenario '{}'. Available: {}",
            args.scenario,
            scenarios::names().join(", ")
        );
        std::process::exit(2);
    };

    if args.print {
        print!("{}", scenario.pretty_print());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    tracing::info!(scenario = scenario.name, "Histrion starting...");

    let mut sim = Simulation::with_config(config);
    let recorder = TraceRecorder::new();
    sim.trace_records(recorder.sink());
    scenario.install(&mut sim)?;

    let result = sim.run();
    let deadlocked = matches!(result, Err(SimError::Deadlock { .. }));

    if args.format == "json" {
        let (report, error) = match &result {
            Ok(report) => (Some(report.clone()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let output = RunOutput {
            scenario: scenario.name.to_string(),
            report,
            error,
            traces: recorder.records(),
            entities: sim.entities().filter_map(|id| sim.inspect(id).ok()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for record in recorder.records() {
            let name = sim.entity(record.entity).map(|e| e.name()).unwrap_or("?");
            println!("[{}] {}: {}", record.at, name, record.value);
        }
        match &result {
            Ok(report) => println!("\n{}", report.summary()),
            Err(e) => println!("\nStopped: {}", e),
        }
        for fault in sim.faults() {
            println!("Fault in {} at {}: {}", fault.entity, fault.at, fault.error);
        }
    }

    if deadlocked {
        std::process::exit(1);
    }
    // Non-deadlock failures surface through main's error
    result.map(|_| ())
}
