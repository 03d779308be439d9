//! Test fixtures and helpers.
//!
//! Pre-built simulations for consistent testing.

use bastion_core::catalog::Catalog;
use bastion_core::resources::ResourceKind;
use bastion_core::rules::Rules;
use bastion_core::simulation::Simulation;
use bastion_core::state::StartingState;
use fixed::types::I32F32;

use crate::rng::ScriptedRng;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// A fresh game on the standard catalog.
#[must_use]
pub fn fresh_sim(seed: u64) -> Simulation {
    Simulation::with_seed(seed)
}

/// A fresh game where every balance is set to `amount`.
#[must_use]
pub fn rich_sim(seed: u64, amount: i32) -> Simulation {
    let mut sim = Simulation::with_seed(seed);
    for kind in ResourceKind::ALL {
        sim.state_mut().resources.set(kind, fixed(amount));
    }
    sim
}

/// A fresh game already at `stage`.
#[must_use]
pub fn sim_at_stage(seed: u64, stage: u32) -> Simulation {
    let mut sim = Simulation::with_seed(seed);
    sim.state_mut().stage = stage;
    sim
}

/// A standard game driven by a scripted random source.
///
/// # Panics
///
/// Panics if the standard catalog fails validation.
#[must_use]
pub fn scripted_sim(words: Vec<u32>) -> Simulation<ScriptedRng> {
    Simulation::with_rng(
        Catalog::standard(),
        Rules::default(),
        StartingState::default(),
        ScriptedRng::new(words),
    )
    .expect("standard catalog is valid")
}

/// A scripted game where the stage never advances.
#[must_use]
pub fn frozen_sim() -> Simulation<ScriptedRng> {
    scripted_sim(vec![0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_sim_balances() {
        let sim = rich_sim(1, 5000);
        for kind in ResourceKind::ALL {
            assert_eq!(sim.resources().whole(kind), 5000);
        }
    }

    #[test]
    fn test_frozen_sim_stays_on_stage_one() {
        let mut sim = frozen_sim();
        for _ in 0..100 {
            sim.advance_world_tick();
        }
        assert_eq!(sim.stage(), 1);
        assert_eq!(sim.state().tick, 100);
    }
}
