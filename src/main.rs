//! Hivemind - Entry Point
//!
//! Plays a recorded game offline: reads one snapshot per turn from a JSON
//! file, runs the strategist and writes each turn's orders as a JSON line.

use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use hivemind::core::config::BotConfig;
use hivemind::core::error::Result;
use hivemind::orchestrator::Strategist;
use hivemind::session::{play, ReplaySession};

/// Hive strategy bot driven from recorded snapshots
#[derive(Parser, Debug)]
#[command(name = "hivemind")]
#[command(about = "Plan orders for every turn of a recorded hex-grid game")]
struct Args {
    /// JSON file holding an array of turn snapshots
    replay: PathBuf,

    /// TOML config file (defaults are used when absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player id to play as
    #[arg(long, default_value_t = 0)]
    player: usize,

    /// Target number of units per own base
    #[arg(long)]
    bees_per_base: Option<usize>,

    /// Minimum hive-site score that authorises a build
    #[arg(long)]
    score_threshold: Option<f64>,

    /// Seed for fallback moves
    #[arg(long)]
    seed: Option<u64>,

    /// Write orders here instead of stdout
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Dump the knowledge map to this file after every turn
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::default(),
    };
    if let Some(units) = args.bees_per_base {
        config.economy.units_per_base = units;
    }
    if let Some(threshold) = args.score_threshold {
        config.hive_site.score_threshold = threshold;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;

    tracing::info!(
        "Playing {} as player {} (seed {})",
        args.replay.display(),
        args.player,
        config.seed
    );

    let output: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    let mut session = ReplaySession::from_file(&args.replay, output)?;
    let mut strategist = Strategist::new(config);
    play(&mut session, &mut strategist, args.player, args.dump.as_deref())?;

    session.into_output().flush()?;
    Ok(())
}
