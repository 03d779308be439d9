//! Headless economy runner for scripted playtesting and CI verification.
//!
//! This crate drives the Neon Bastion economy without a UI. It can be
//! controlled via JSON commands on stdin, with game state output on stdout,
//! or run scripted strategies over many seeds. This enables:
//!
//! - **Controller testing**: an external agent plays the economy line by line
//! - **Balance batches**: many seeded games in parallel, summarised as JSON
//! - **CI verification**: determinism checks and replay playback
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from controller (tick, enqueue, travel, etc.)
//! - **stdout**: State updates and responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See the [`protocol`] module for the full command and response format.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p bastion_headless
//!
//! # Play a scenario with its scripted strategy
//! cargo run -p bastion_headless -- simulate --scenario scenarios/standard.ron
//!
//! # Verify determinism
//! cargo run -p bastion_headless -- verify --seed 7 --runs 5
//! ```

pub mod batch;
pub mod game_runner;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod scenario;
pub mod strategies;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use game_runner::{run_game, GameConfig, GameResult};
pub use metrics::{BatchSummary, GameMetrics, MetricsCollector};
pub use protocol::{Command, Response, StateReport};
pub use runner::{HeadlessConfig, HeadlessRunner};
pub use scenario::{Scenario, ScenarioError};
pub use strategies::Strategy;
