//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays and batch balancing both assume a game is a pure function of its
//! seed and its input stream. Sources of non-determinism include:
//!
//! - **Floating-point math**: balances use [`bastion_core::math::Fixed`] and
//!   multipliers use exact [`bastion_core::math::Ratio`] values.
//!
//! - **HashMap iteration order**: state collections are `BTreeMap`,
//!   `BTreeSet` or `Vec`.
//!
//! - **Ambient randomness**: every draw comes from the simulation's own
//!   seeded source.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use bastion_core::simulation::{Command, Simulation};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Example
///
/// ```
/// use bastion_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a seeded game twice, applying `commands` up front and then advancing
/// both clocks `num_ticks` times, and compare final hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, commands: &[Command], num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let result = verify_determinism(
        2,
        num_ticks,
        || {
            let mut sim = setup_fn();
            for command in commands {
                // Rejections are part of the game.
                let _ = sim.execute(command);
            }
            sim
        },
        |sim| {
            sim.advance();
        },
        Simulation::state_hash,
    );
    result.is_deterministic
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> Vec<u64>
where
    F: Fn() -> Simulation + Sync,
{
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.advance();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    })
}

/// Compare two runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match throughout, `Some(tick)` if they diverge at
/// that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.advance();
        sim2.advance();

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Verify that a snapshot round-trip preserves the state exactly.
pub fn verify_snapshot_round_trip<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();
    for _ in 0..num_ticks {
        sim.advance();
    }
    let hash_before = sim.state_hash();

    let Ok(bytes) = sim.snapshot() else {
        return false;
    };
    let mut restored = setup_fn();
    if restored.restore_snapshot(&bytes).is_err() {
        return false;
    }

    hash_before == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fresh_sim, rich_sim};

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_idle_game_is_deterministic() {
        assert!(verify_simulation_determinism(|| fresh_sim(9), &[], 500));
    }

    #[test]
    fn test_busy_game_is_deterministic() {
        let commands = [
            Command::Conquer { poi: "P1".into() },
            Command::Conquer { poi: "P2".into() },
            Command::Enqueue {
                recipe: "RCP1".into(),
            },
            Command::Enqueue {
                recipe: "RCP3".into(),
            },
            Command::Upgrade {
                recipe: "RCP1".into(),
            },
            Command::Travel {
                region: "R2".into(),
            },
        ];
        assert!(verify_simulation_determinism(
            || rich_sim(21, 5000),
            &commands,
            300
        ));
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(|| fresh_sim(5), 200), None);
    }

    #[test]
    fn test_parallel_runs_match() {
        let hashes = run_parallel_simulations(|| fresh_sim(17), 4, 300);
        assert_eq!(hashes.len(), 4);
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_snapshot_round_trip() {
        assert!(verify_snapshot_round_trip(|| rich_sim(3, 1000), 120));
    }
}
