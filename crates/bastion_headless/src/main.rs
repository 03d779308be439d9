//! Headless Neon Bastion runner.
//!
//! This binary runs the economy without a UI, controlled via JSON on
//! stdin/stdout or by scripted strategies.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p bastion_headless
//!
//! # Play one scenario with its strategy and print a summary
//! cargo run -p bastion_headless -- simulate --scenario scenarios/standard.ron
//!
//! # Run batch balance test
//! cargo run -p bastion_headless -- batch --count 1000 --output results/
//!
//! # Check a saved replay still reproduces
//! cargo run -p bastion_headless -- replay --file session.replay --verify
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::path::{Path, PathBuf};

use bastion_core::replay::Replay;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bastion_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    game_runner::{run_game, GameConfig},
    runner::{HeadlessConfig, HeadlessRunner},
    scenario::Scenario,
    strategies::Strategy,
};

#[derive(Parser)]
#[command(name = "bastion_headless")]
#[command(about = "Headless Neon Bastion runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single interactive game over the JSON protocol
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Output state after every tick command
        #[arg(long)]
        auto_state: bool,

        /// Save the session as a replay on exit
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Play one scenario with a scripted strategy and print a summary
    Simulate {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Strategy preset or RON file, overriding the scenario's
        #[arg(long)]
        strategy: Option<String>,

        /// Seed, overriding the scenario's
        #[arg(long)]
        seed: Option<u64>,

        /// Seconds to simulate, overriding the scenario's
        #[arg(long)]
        ticks: Option<u64>,

        /// Save the game as a replay
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Run a batch of games for balance testing
    Batch {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Strategy preset or RON file, overriding the scenario's
        #[arg(long)]
        strategy: Option<String>,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Seconds per game (0 = the scenario's budget)
        #[arg(long, default_value = "0")]
        ticks: u64,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Replay a recorded game
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Verify replay produces identical hash
        #[arg(long)]
        verify: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for the protocol. RUST_LOG wins over --verbose.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            auto_state,
            record,
        }) => cmd_run(scenario.as_deref(), auto_state, record),
        Some(Commands::Simulate {
            scenario,
            strategy,
            seed,
            ticks,
            record,
        }) => cmd_simulate(scenario.as_deref(), strategy.as_deref(), seed, ticks, record),
        Some(Commands::Batch {
            scenario,
            strategy,
            count,
            parallel,
            output,
            seed,
            ticks,
        }) => cmd_batch(
            scenario.as_deref(),
            strategy.as_deref(),
            count,
            parallel,
            output,
            seed,
            ticks,
        ),
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => cmd_verify(scenario.as_deref(), seed, runs),
        Some(Commands::Replay { file, verify }) => cmd_replay(&file, verify),
        None => {
            // Default: interactive mode
            cmd_run(None, false, None);
        }
    }
}

/// Print a fatal error and exit.
fn fatal(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("FATAL: {context}: {error}");
    std::process::exit(1);
}

fn load_scenario(path: Option<&Path>) -> Scenario {
    match path {
        Some(path) => Scenario::load(path).unwrap_or_else(|e| fatal("Failed to load scenario", e)),
        None => Scenario::default(),
    }
}

/// A preset name, or a path to a strategy RON file.
fn load_strategy(name: &str) -> Strategy {
    let path = Path::new(name);
    let loaded = if path.extension().is_some_and(|ext| ext == "ron") {
        Strategy::load(path)
    } else {
        Strategy::preset(name)
    };
    loaded.unwrap_or_else(|e| fatal("Failed to load strategy", e))
}

/// Run a single interactive game
fn cmd_run(scenario: Option<&Path>, auto_state: bool, record: Option<PathBuf>) {
    let scenario = load_scenario(scenario);
    tracing::info!(scenario = %scenario.name, seed = scenario.seed, "Starting interactive session");

    let config = HeadlessConfig {
        auto_state_output: auto_state,
        replay_path: record,
    };
    let mut runner =
        HeadlessRunner::new(&scenario, config).unwrap_or_else(|e| fatal("Invalid scenario", e));
    if let Err(e) = runner.run_stdio() {
        fatal("Protocol I/O failed", e);
    }
}

/// Play one scripted game
fn cmd_simulate(
    scenario: Option<&Path>,
    strategy: Option<&str>,
    seed: Option<u64>,
    ticks: Option<u64>,
    record: Option<PathBuf>,
) {
    let mut scenario = load_scenario(scenario);
    if let Some(name) = strategy {
        scenario.strategy = load_strategy(name);
    }
    let seed = seed.unwrap_or(scenario.seed);
    let mut config = GameConfig::new(scenario, seed);
    config.max_ticks = ticks.unwrap_or(0);
    config.record_replay = record.is_some();

    let result = run_game(&config).unwrap_or_else(|e| fatal("Game failed", e));
    let m = &result.metrics;

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("GAME COMPLETE: {}", config.scenario.name);
    eprintln!("{}", "=".repeat(50));
    eprintln!("Strategy: {}", config.scenario.strategy.name);
    eprintln!("Seed: {}  Ticks: {}", m.seed, m.duration_ticks);
    eprintln!("Stage: {} (max {})  Player level: {}", m.final_stage, m.max_stage, m.final_player_level);
    eprintln!("Prestiges: {}  Crystal banked: {}", m.prestige_count, m.crystal_earned);
    eprintln!("Recipes known: {}  Crafts: {}", m.recipes_discovered, m.total_crafts());
    eprintln!("Commands: {} accepted, {} rejected", m.commands_accepted, m.total_rejections());
    eprintln!("Resources:");
    for (kind, amount) in &m.final_resources {
        eprintln!("  {kind:?}: {amount}");
    }
    eprintln!("Final state hash: {:016x}", result.final_state_hash);

    if let (Some(path), Some(replay)) = (record, &result.replay) {
        replay
            .save(&path)
            .unwrap_or_else(|e| fatal("Failed to save replay", e));
        eprintln!("Replay saved to: {}", path.display());
    }

    match serde_json::to_string(m) {
        Ok(json) => println!("{json}"),
        Err(e) => fatal("Failed to serialize metrics", e),
    }
}

/// Run batch of games for balance testing
fn cmd_batch(
    scenario: Option<&Path>,
    strategy: Option<&str>,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    ticks: u64,
) {
    let mut scenario = load_scenario(scenario);
    if let Some(name) = strategy {
        scenario.strategy = load_strategy(name);
    }

    let mut config = BatchConfig::new(scenario, count)
        .with_output(output)
        .with_seed(seed)
        .with_max_ticks(ticks);
    config.parallel_games = parallel;

    let results = run_batch(config);
    let results_path = results.config.output_dir.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        fatal("Failed to save results", e);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Stage: avg final {:.1}, avg max {:.1} (range {}..={})",
        summary.avg_final_stage, summary.avg_max_stage, summary.min_max_stage, summary.max_max_stage
    );
    eprintln!(
        "Prestige: avg {:.2} resets, avg {:.1} crystal",
        summary.avg_prestiges, summary.avg_crystal_earned
    );
    if let Some(tick) = summary.avg_first_prestige_tick {
        eprintln!("  first prestige at tick {tick:.0} on average");
    }
    eprintln!("Rejection rate: {:.1}%", summary.rejection_rate * 100.0);
    for error in results.errors.iter().take(10) {
        eprintln!("  game {} (seed {}): {}", error.game_index, error.seed, error.message);
    }
    eprintln!("\nResults saved to: {}", results_path.display());

    if !results.errors.is_empty() {
        std::process::exit(1);
    }
}

/// Verify determinism
fn cmd_verify(scenario: Option<&Path>, seed: u64, runs: u32) {
    let scenario = load_scenario(scenario);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    let report =
        verify_determinism(&scenario, seed, runs).unwrap_or_else(|e| fatal("Game failed", e));

    if report.is_deterministic() {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        for (run, hash) in report.hashes.iter().enumerate() {
            eprintln!("  run {run}: {hash:016x}");
        }
        std::process::exit(1);
    }
}

/// Play back a recorded game
fn cmd_replay(file: &Path, verify: bool) {
    tracing::info!("Loading replay: {}", file.display());
    let replay = Replay::load(file).unwrap_or_else(|e| fatal("Failed to load replay", e));

    eprintln!("Loaded replay:");
    eprintln!("  Scenario: {}", replay.scenario_id);
    eprintln!("  Seed: {}", replay.seed);
    eprintln!("  Commands: {}", replay.command_count());
    eprintln!("  Duration: {} ticks", replay.final_tick);

    if verify {
        match replay.verify() {
            Ok(()) => {
                eprintln!("PASS: Replay verification successful");
                eprintln!("  Hash: {:016x}", replay.final_hash);
            }
            Err(e) => fatal("Replay verification failed", e),
        }
    } else {
        let sim = replay.play().unwrap_or_else(|e| fatal("Replay failed", e));
        eprintln!("Replay complete at tick {}", sim.state().tick);
        eprintln!("Final state hash: {:016x}", sim.state_hash());
        eprintln!("Stage: {}  Prestiges: {}", sim.stage(), sim.state().prestige_count);
    }
}
