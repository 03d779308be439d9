//! Replay system for recording and playing back games.
//!
//! A replay stores the data a game was started from (catalog, rules,
//! starting state, seed) and the ordered stream of ticks and commands
//! applied to it. Playing the stream back on a fresh simulation must end
//! on the recorded state hash.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{GameError, Result};
use crate::rules::Rules;
use crate::simulation::{Command, Simulation};
use crate::state::StartingState;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// One recorded input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayStep {
    /// A world tick.
    WorldTick,
    /// A forge tick.
    ForgeTick,
    /// A player command (accepted or rejected).
    Command(Command),
}

/// Complete replay data structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Scenario identifier or name.
    pub scenario_id: String,
    /// Random seed used for the game.
    pub seed: u64,
    /// Catalog the game ran on.
    pub catalog: Catalog,
    /// Rules the game ran with.
    pub rules: Rules,
    /// Starting state.
    pub start: StartingState,
    /// Inputs in application order.
    pub steps: Vec<ReplayStep>,
    /// Final world tick.
    pub final_tick: u64,
    /// Final state hash for verification.
    pub final_hash: u64,
}

impl Replay {
    /// Start recording a game created from `sim`'s data and `seed`.
    #[must_use]
    pub fn new<R>(scenario_id: impl Into<String>, seed: u64, sim: &Simulation<R>) -> Self {
        Self {
            version: REPLAY_VERSION,
            scenario_id: scenario_id.into(),
            seed,
            catalog: sim.catalog().clone(),
            rules: sim.rules().clone(),
            start: sim.starting_state().clone(),
            steps: Vec::new(),
            final_tick: 0,
            final_hash: 0,
        }
    }

    /// Record an input.
    pub fn record(&mut self, step: ReplayStep) {
        self.steps.push(step);
    }

    /// Finalize the replay with end-of-game state.
    pub fn finalize<R>(&mut self, sim: &Simulation<R>) {
        self.final_tick = sim.state().tick;
        self.final_hash = sim.state_hash();
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, ReplayStep::Command(_)))
            .count()
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to write replay file: {e}")))?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails, or the
    /// version does not match.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| GameError::InvalidState(format!("Failed to read replay file: {e}")))?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }
        Ok(replay)
    }

    /// Play every step on a fresh simulation and return it.
    ///
    /// Unknown ids in recorded commands are reported as errors rather than
    /// panicking.
    ///
    /// # Errors
    /// Returns an error if the recorded data cannot build a simulation or a
    /// command references an unknown id.
    pub fn play(&self) -> Result<Simulation> {
        let mut sim = Simulation::from_parts(
            self.catalog.clone(),
            self.rules.clone(),
            self.start.clone(),
            self.seed,
        )?;
        for step in &self.steps {
            apply_step(&mut sim, step)?;
        }
        Ok(sim)
    }

    /// Play the replay and compare against the recorded final hash.
    ///
    /// # Errors
    /// Returns [`GameError::DesyncDetected`] if the hashes differ, or any
    /// playback error.
    pub fn verify(&self) -> Result<()> {
        let sim = self.play()?;
        let local_hash = sim.state_hash();
        if local_hash != self.final_hash {
            return Err(GameError::DesyncDetected {
                tick: sim.state().tick,
                local_hash,
                remote_hash: self.final_hash,
            });
        }
        Ok(())
    }
}

/// Apply one recorded step to a simulation.
///
/// # Errors
/// Returns [`GameError::UnknownId`] if a command references an unknown id.
pub fn apply_step<R: rand::Rng>(sim: &mut Simulation<R>, step: &ReplayStep) -> Result<()> {
    match step {
        ReplayStep::WorldTick => {
            sim.advance_world_tick();
        }
        ReplayStep::ForgeTick => {
            sim.advance_forge_tick();
        }
        ReplayStep::Command(command) => {
            sim.check_ids(command)?;
            // Rejections are part of the recorded game.
            let _ = sim.execute(command);
        }
    }
    Ok(())
}
