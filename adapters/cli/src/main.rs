#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a lane defence skirmish.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lane_defence_cli::{parse_frames, Settings, Skirmish};
use lane_defence_system_turn_controller::TurnReport;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Plays scripted turns of the lane defence strategy against the reference world.
#[derive(Debug, Parser)]
#[command(name = "lane-defence", version)]
struct Args {
    /// Versioned TOML settings file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the match random source.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of turns to play.
    #[arg(short, long)]
    turns: Option<u32>,

    /// JSON array of action frames replayed after their turn.
    #[arg(long, value_name = "FILE")]
    frames: Option<PathBuf>,

    /// Print the turn reports as JSON.
    #[arg(long)]
    json: bool,
}

const DEFAULT_SEED: u64 = 0;
const DEFAULT_TURNS: u32 = 10;

/// Entry point for the lane defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let frames = match &args.frames {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading action frames from {}", path.display()))?;
            parse_frames(&json)?
        }
        None => Vec::new(),
    };

    let seed = args.seed.or(settings.seed).unwrap_or(DEFAULT_SEED);
    let turns = args.turns.or(settings.turns).unwrap_or(DEFAULT_TURNS);
    info!(seed, turns, "starting skirmish");

    let mut skirmish = Skirmish::new(&settings, seed, frames)?;
    let reports = skirmish.run(turns);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", summary(report));
        }
    }
    Ok(())
}

fn summary(report: &TurnReport) -> String {
    let commit = report
        .commit
        .map(|side| format!(" commit={side:?}"))
        .unwrap_or_default();
    let layout = report
        .layout
        .map(|side| format!(" layout={side:?}"))
        .unwrap_or_default();
    format!(
        "turn {:>3}  {:<18} rule={}{}{} resolution={} deployed={} commands={}",
        report.turn,
        report.posture.to_string(),
        report.rule,
        commit,
        layout,
        report.resolution,
        report.deployed,
        report.commands.len()
    )
}
