//! Stochastic stage progression and blueprint auto-discovery.
//!
//! Draws from the injected random source, in order:
//! 1. one roll per tick; the stage advances when it exceeds 85%;
//! 2. after an advance, a second roll; a blueprint is found above 95%;
//! 3. after a find, one uniform index into the undiscovered recipes.
//!
//! Later draws are skipped when an earlier check fails, so a scripted
//! source can force any outcome.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::data::RecipeId;
use crate::discovery::discover_recipe;
use crate::math::roll;
use crate::rules::{is_multiple, Rules};
use crate::state::{EconomyState, GameEvent};

/// What a progression tick changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionOutcome {
    /// Stage after the tick, if it advanced.
    pub advanced_to: Option<u32>,
    /// Whether the player level rose.
    pub level_up: bool,
    /// Blueprint found this tick.
    pub discovered: Option<RecipeId>,
}

/// Run one progression step.
pub fn apply_progression_tick<R: Rng + ?Sized>(
    state: &mut EconomyState,
    catalog: &Catalog,
    rules: &Rules,
    rng: &mut R,
) -> ProgressionOutcome {
    let mut outcome = ProgressionOutcome::default();
    if roll(rng) <= rules.stage_advance_threshold() {
        return outcome;
    }

    state.stage = state.stage.saturating_add(1);
    outcome.advanced_to = Some(state.stage);
    if is_multiple(state.stage, rules.level_up_stage_interval) {
        state.player_level = state.player_level.saturating_add(1);
        outcome.level_up = true;
    }
    if is_multiple(state.stage, rules.milestone_stage_interval) {
        state.record(GameEvent::StageReached { stage: state.stage });
        tracing::info!(stage = state.stage, "Stage milestone");
    }

    if roll(rng) > rules.discovery_threshold() {
        let undiscovered: Vec<&RecipeId> = catalog
            .recipes
            .iter()
            .map(|r| &r.id)
            .filter(|id| !state.is_discovered(id.as_str()))
            .collect();
        if !undiscovered.is_empty() {
            let pick = undiscovered[rng.random_range(0..undiscovered.len())].clone();
            if discover_recipe(state, catalog, pick.as_str()) {
                outcome.discovered = Some(pick);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use bastion_test_utils::rng::ScriptedRng;

    use super::*;
    use crate::state::StartingState;

    const HIGH: u32 = u32::MAX;
    const LOW: u32 = 0;

    fn setup() -> (EconomyState, Catalog, Rules) {
        let rules = Rules::default();
        (
            EconomyState::new(&StartingState::default(), rules.event_log_capacity),
            Catalog::standard(),
            rules,
        )
    }

    #[test]
    fn test_low_roll_does_nothing() {
        let (mut state, catalog, rules) = setup();
        let before = state.clone();
        let mut rng = ScriptedRng::new(vec![LOW]);
        let outcome = apply_progression_tick(&mut state, &catalog, &rules, &mut rng);
        assert_eq!(outcome, ProgressionOutcome::default());
        assert_eq!(state, before);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn test_advance_and_level_on_fifth_stage() {
        let (mut state, catalog, rules) = setup();
        state.stage = 4;
        let mut rng = ScriptedRng::new(vec![HIGH, LOW]);
        let outcome = apply_progression_tick(&mut state, &catalog, &rules, &mut rng);
        assert_eq!(outcome.advanced_to, Some(5));
        assert!(outcome.level_up);
        assert_eq!(state.player_level, 2);
        assert_eq!(outcome.discovered, None);
    }

    #[test]
    fn test_milestone_logged_on_multiple_of_ten() {
        let (mut state, catalog, rules) = setup();
        state.stage = 9;
        let mut rng = ScriptedRng::new(vec![HIGH, LOW]);
        apply_progression_tick(&mut state, &catalog, &rules, &mut rng);
        assert_eq!(state.log.messages()[0], "Reached Stage 10");

        let mut rng = ScriptedRng::new(vec![HIGH, LOW]);
        let logged = state.log.len();
        apply_progression_tick(&mut state, &catalog, &rules, &mut rng);
        assert_eq!(state.stage, 11);
        assert_eq!(state.log.len(), logged);
    }

    #[test]
    fn test_discovery_picks_first_undiscovered_on_zero_index() {
        let (mut state, catalog, rules) = setup();
        let mut rng = ScriptedRng::new(vec![HIGH, HIGH, LOW, LOW]);
        let outcome = apply_progression_tick(&mut state, &catalog, &rules, &mut rng);
        assert_eq!(outcome.discovered, Some(RecipeId::new("RCP2")));
        assert!(state.is_discovered("RCP2"));
        assert_eq!(state.log.messages()[0], "NEW BLUEPRINT: Ice Armor recovered.");
    }

    #[test]
    fn test_discovery_is_noop_when_everything_known() {
        let (mut state, catalog, rules) = setup();
        state.discovered = catalog.recipes.iter().map(|r| r.id.clone()).collect();
        let mut rng = ScriptedRng::new(vec![HIGH, HIGH]);
        let outcome = apply_progression_tick(&mut state, &catalog, &rules, &mut rng);
        assert_eq!(outcome.advanced_to, Some(2));
        assert_eq!(outcome.discovered, None);
        assert_eq!(rng.draws(), 2);
    }
}
