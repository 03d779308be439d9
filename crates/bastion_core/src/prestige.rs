//! Prestige: trade stage progress for permanent crystal.
//!
//! Only balances and stage are reset. Heroes, discovered recipes, recipe
//! levels, conquered POIs, the current region and any running craft or
//! infusion carry over.

use crate::error::Rejection;
use crate::math::Fixed;
use crate::resources::{ResourceKind, ResourceLedger};
use crate::rules::Rules;
use crate::state::{EconomyState, GameEvent, StartingState};

/// Crystal a prestige at `stage` would award: `floor(stage / 10)`.
#[must_use]
pub fn crystal_gain_preview(stage: u32, rules: &Rules) -> u64 {
    u64::from(stage)
        .checked_div(u64::from(rules.prestige_stage_divisor))
        .unwrap_or(0)
}

/// Reset the run.
///
/// Balances return to the starting amounts except crystal, which keeps its
/// previous balance plus the gain. Stage returns to 1. Returns the gain.
///
/// # Errors
///
/// [`Rejection::NotEligible`] below the prestige floor.
pub fn reset(
    state: &mut EconomyState,
    start: &StartingState,
    rules: &Rules,
) -> Result<u64, Rejection> {
    if state.stage < rules.prestige_min_stage {
        return Err(Rejection::NotEligible {
            required_stage: rules.prestige_min_stage,
            stage: state.stage,
        });
    }

    let gain = crystal_gain_preview(state.stage, rules);
    let crystal = state.resources.get(ResourceKind::Crystal);

    let mut resources = ResourceLedger::from_amounts(&start.resources);
    resources.set(ResourceKind::Crystal, crystal);
    resources.credit(ResourceKind::Crystal, Fixed::saturating_from_num(gain));

    tracing::info!(stage = state.stage, gain, "Prestige reset");
    state.resources = resources;
    state.stage = 1;
    state.prestige_count = state.prestige_count.saturating_add(1);
    state.crystal_earned = state.crystal_earned.saturating_add(gain);
    state.record(GameEvent::Ascended { crystal_gain: gain });
    Ok(gain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PoiId, RecipeId};

    #[test]
    fn test_prestige_law() {
        let rules = Rules::default();
        let start = StartingState::default();
        let mut state = EconomyState::new(&start, rules.event_log_capacity);
        state.stage = 45;
        state.resources.set(ResourceKind::Crystal, Fixed::from_num(3));
        state.resources.set(ResourceKind::Gold, Fixed::from_num(99_999));
        state.resources.set(ResourceKind::Fuel, Fixed::from_num(1));
        state.conquered.insert(PoiId::new("P1"));
        state.recipe_levels.insert(RecipeId::new("RCP1"), 4);

        assert_eq!(reset(&mut state, &start, &rules), Ok(4));
        assert_eq!(state.stage, 1);
        assert_eq!(state.resources.whole(ResourceKind::Crystal), 7);
        assert_eq!(state.resources.whole(ResourceKind::Gold), 500);
        assert_eq!(state.resources.whole(ResourceKind::Fuel), 100);
        assert_eq!(state.resources.whole(ResourceKind::Iron), 50);
        assert!(state.is_conquered("P1"));
        assert_eq!(state.recipe_level("RCP1"), 4);
        assert_eq!(state.prestige_count, 1);
        assert_eq!(state.crystal_earned, 4);
    }

    #[test]
    fn test_prestige_floor() {
        let rules = Rules::default();
        let start = StartingState::default();
        let mut state = EconomyState::new(&start, rules.event_log_capacity);
        state.stage = 19;
        let before = state.clone();
        assert_eq!(
            reset(&mut state, &start, &rules),
            Err(Rejection::NotEligible {
                required_stage: 20,
                stage: 19,
            })
        );
        assert_eq!(state, before);

        state.stage = 20;
        assert_eq!(reset(&mut state, &start, &rules), Ok(2));
    }

    #[test]
    fn test_preview() {
        let rules = Rules::default();
        assert_eq!(crystal_gain_preview(45, &rules), 4);
        assert_eq!(crystal_gain_preview(9, &rules), 0);
    }
}
