//! Skirmish Headless Battle Runner
//!
//! Loads a scenario, simulates it as fast as possible and prints the
//! outcome. No window and no frame pacing; results match the viewer.
//!
//! Usage:
//!   cargo run -p skirmish-simtest -- data/scenarios/skirmish.json
//!   cargo run -p skirmish-simtest -- data/scenarios/skirmish.json --validate --verbose
//!   cargo run -p skirmish-simtest -- data/scenarios/skirmish.json --json report.json

mod checks;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::prelude::*;

/// Exit status when the tick cap is hit before a team is eliminated
const EXIT_UNFINISHED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "skirmish-simtest")]
#[command(about = "Run a Skirmish battle headless and print the outcome")]
struct Cli {
    /// Path to the scenario JSON document
    scenario: PathBuf,

    /// Give up after this many simulation ticks
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,

    /// Also write the structured report as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Re-run the battle and check engine invariants on the result
    #[arg(long)]
    validate: bool,

    /// Log scenario loading and battle progress
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let scenario = Scenario::from_path(&cli.scenario)
        .with_context(|| format!("loading {}", cli.scenario.display()))?;

    let mut engine = SimulationEngine::new(&scenario);
    let Some(report) = engine.run_for(cli.max_ticks) else {
        eprintln!(
            "Stopped after {} ticks ({:.2}s) with {} units still fighting",
            engine.ticks(),
            engine.sim_time(),
            engine.alive_count()
        );
        return Ok(ExitCode::from(EXIT_UNFINISHED));
    };

    println!("\n\n{}\n\n", report);

    if let Some(path) = &cli.json {
        let file = File::create(path)
            .with_context(|| format!("creating report file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("writing report to {}", path.display()))?;
        log::info!("Wrote report to {}", path.display());
    }

    if cli.validate {
        let results = checks::validate_battle(&scenario, &engine, &report, cli.max_ticks);
        let failed = checks::print_results(&results, cli.verbose);
        if failed > 0 {
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}
