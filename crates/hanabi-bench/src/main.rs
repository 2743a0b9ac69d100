use std::path::PathBuf;

use clap::Parser;

use hanabi_bench::config::{BenchConfig, ResolvedOutputs};
use hanabi_bench::logging::init_logging;
use hanabi_bench::selfplay::SelfPlayRunner;

/// Self-play benchmarking harness for the Hanabi engine.
#[derive(Debug, Parser)]
#[command(
    name = "hanabi-bench",
    author,
    version,
    about = "Deterministic Hanabi self-play harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/selfplay.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for deck generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of players per game.
    #[arg(long, value_name = "PLAYERS")]
    players: Option<usize>,

    /// Exit after validating the configuration (no games are run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if let Some(players) = cli.players {
        config.games.players = players;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let players = config.games.players;

    println!("Loaded configuration '{run_id}' ({games} games, {players} players)");

    let logging_guard = init_logging(&config.logging, &outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: self-play execution skipped.");
        return Ok(());
    }

    let runner = SelfPlayRunner::new(config, outputs);
    let summary = runner.run()?;
    println!(
        "Self-play complete for '{run_id}': {} games, mean score {:.2}, {} perfect → rows at {}",
        summary.games_played,
        summary.mean_score,
        summary.perfect_games,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
