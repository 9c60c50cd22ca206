use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use trainer_sight::{InputJournal, ReplayResult, ScenarioFile, SightConfig, replay_to_end};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario JSON file describing the map, its trainers and battle context
    #[arg(short, long)]
    scenario: PathBuf,
    /// Journal JSON file to replay; defaults to the scenario's own inputs
    #[arg(short, long)]
    journal: Option<PathBuf>,
    /// TOML file overriding frame timings and sprite constants
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print every sight event the replay produced
    #[arg(short, long)]
    events: bool,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let scenario = ScenarioFile::from_json(&read(&args.scenario)?)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;
    let journal: InputJournal = match &args.journal {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| "Failed to deserialize journal JSON")?,
        None => scenario.journal(),
    };
    let config: Option<SightConfig> = match &args.config {
        Some(path) => Some(toml::from_str(&read(path)?).with_context(|| "Failed to parse config TOML")?),
        None => None,
    };
    info!(inputs = journal.inputs.len(), "replaying journal");

    let result: ReplayResult =
        replay_to_end(&scenario, &journal, config).with_context(|| "Replay failed")?;

    if args.events {
        for event in &result.events {
            println!("{event:?}");
        }
    }
    println!("Replay complete.");
    println!("Final Frame: {}", result.final_frame);
    println!("Battle Pending: {}", result.battle_pending);
    println!("Snapshot Hash: {}", result.final_snapshot_hash);

    Ok(())
}
