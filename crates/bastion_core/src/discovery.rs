//! Recipe discovery: direct unlocks and timed infusions.
//!
//! An infusion pays for two resources up front, then resolves on the first
//! world tick at or past its deadline. While one is pending, further
//! infusions are refused.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::data::RecipeId;
use crate::error::Rejection;
use crate::resources::{ResourceAmounts, ResourceKind};
use crate::rules::Rules;
use crate::state::{EconomyState, GameEvent};

/// Infusion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InfusionState {
    /// No infusion running.
    #[default]
    Idle,
    /// Waiting for the deadline.
    Infusing {
        /// First chosen resource.
        primary: ResourceKind,
        /// Second chosen resource.
        secondary: ResourceKind,
        /// World tick at which the infusion resolves.
        ready_at: u64,
    },
}

impl InfusionState {
    /// Whether an infusion is running.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Infusing { .. })
    }
}

/// How an infusion ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfusionOutcome {
    /// A new recipe was unlocked.
    Discovered(RecipeId),
    /// The pair matched nothing, or only an already known recipe.
    NoPattern,
}

/// Add a recipe to the discovered set, logging a recovered blueprint.
///
/// Returns `false` if it was already known.
///
/// # Panics
///
/// Panics if the recipe is not in the catalog.
pub fn discover_recipe(state: &mut EconomyState, catalog: &Catalog, recipe: &str) -> bool {
    let data = catalog.expect_recipe(recipe);
    if !state.discovered.insert(data.id.clone()) {
        return false;
    }
    state.record(GameEvent::BlueprintRecovered {
        recipe: data.id.clone(),
        name: data.name.clone(),
    });
    tracing::info!(recipe, "Blueprint recovered");
    true
}

/// Start an infusion of two resources.
///
/// Returns the world tick at which it will resolve.
///
/// # Errors
///
/// Checked in order: [`Rejection::EmptySlot`] if either slot is `None`,
/// [`Rejection::IdenticalSelection`] if both slots hold the same resource,
/// [`Rejection::OperationPending`] if another infusion is running, and
/// [`Rejection::InsufficientResources`] if either balance is short.
pub fn begin_infusion(
    state: &mut EconomyState,
    rules: &Rules,
    primary: Option<ResourceKind>,
    secondary: Option<ResourceKind>,
) -> Result<u64, Rejection> {
    let (Some(primary), Some(secondary)) = (primary, secondary) else {
        return Err(Rejection::EmptySlot);
    };
    if primary == secondary {
        return Err(Rejection::IdenticalSelection);
    }
    if state.infusion.is_pending() {
        return Err(Rejection::OperationPending);
    }

    let cost = ResourceAmounts::new()
        .with(primary, rules.infusion_cost)
        .with(secondary, rules.infusion_cost);
    state.resources.try_spend(&cost)?;

    let ready_at = state.tick.saturating_add(rules.infusion_delay_ticks);
    state.infusion = InfusionState::Infusing {
        primary,
        secondary,
        ready_at,
    };
    tracing::info!(%primary, %secondary, ready_at, "Infusion started");
    Ok(ready_at)
}

/// Resolve the pending infusion if its deadline has passed.
///
/// Returns `None` when nothing was due. Either way the state is back to
/// idle once an outcome is returned.
///
/// # Panics
///
/// Panics if an infusion pairing names a recipe missing from the catalog.
pub fn resolve_due_infusion(state: &mut EconomyState, catalog: &Catalog) -> Option<InfusionOutcome> {
    let InfusionState::Infusing {
        primary,
        secondary,
        ready_at,
    } = state.infusion
    else {
        return None;
    };
    if state.tick < ready_at {
        return None;
    }
    state.infusion = InfusionState::Idle;

    let found = catalog
        .infusion_target(primary, secondary)
        .filter(|id| !state.is_discovered(id.as_str()))
        .map(|id| catalog.expect_recipe(id.as_str()));

    let Some(recipe) = found else {
        state.record(GameEvent::InfusionFailed);
        tracing::info!(%primary, %secondary, "Infusion found no new pattern");
        return Some(InfusionOutcome::NoPattern);
    };

    state.discovered.insert(recipe.id.clone());
    state.record(GameEvent::InfusionDiscovered {
        recipe: recipe.id.clone(),
        name: recipe.name.clone(),
    });
    tracing::info!(recipe = %recipe.id, "Infusion discovered recipe");
    Some(InfusionOutcome::Discovered(recipe.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;
    use crate::state::StartingState;

    fn setup() -> (EconomyState, Catalog, Rules) {
        let rules = Rules::default();
        let mut state = EconomyState::new(&StartingState::default(), rules.event_log_capacity);
        state.resources.set(ResourceKind::Crystal, Fixed::from_num(100));
        state.resources.set(ResourceKind::Iron, Fixed::from_num(100));
        (state, Catalog::standard(), rules)
    }

    #[test]
    fn test_infusion_resolves_after_delay() {
        let (mut state, catalog, rules) = setup();
        let ready = begin_infusion(
            &mut state,
            &rules,
            Some(ResourceKind::Iron),
            Some(ResourceKind::Crystal),
        )
        .unwrap();
        assert_eq!(ready, 2);
        assert_eq!(state.resources.whole(ResourceKind::Crystal), 50);
        assert_eq!(state.resources.whole(ResourceKind::Iron), 50);

        state.tick = 1;
        assert_eq!(resolve_due_infusion(&mut state, &catalog), None);
        assert!(state.infusion.is_pending());

        state.tick = 2;
        assert_eq!(
            resolve_due_infusion(&mut state, &catalog),
            Some(InfusionOutcome::Discovered(RecipeId::new("RCP2")))
        );
        assert!(state.is_discovered("RCP2"));
        assert_eq!(state.infusion, InfusionState::Idle);
        assert_eq!(
            state.log.messages()[0],
            "DISCOVERY: Ice Armor blueprint recovered."
        );
    }

    #[test]
    fn test_known_target_is_no_pattern() {
        let (mut state, catalog, rules) = setup();
        state.discovered.insert(RecipeId::new("RCP2"));
        begin_infusion(
            &mut state,
            &rules,
            Some(ResourceKind::Crystal),
            Some(ResourceKind::Iron),
        )
        .unwrap();
        state.tick = 5;
        assert_eq!(
            resolve_due_infusion(&mut state, &catalog),
            Some(InfusionOutcome::NoPattern)
        );
        assert_eq!(
            state.log.messages()[0],
            "Infusion unstable. No new pattern detected."
        );
        // Cost is not refunded.
        assert_eq!(state.resources.whole(ResourceKind::Crystal), 50);
    }

    #[test]
    fn test_unmatched_pair_is_no_pattern() {
        let (mut state, catalog, rules) = setup();
        begin_infusion(&mut state, &rules, Some(ResourceKind::Gold), Some(ResourceKind::Iron)).unwrap();
        state.tick = 2;
        assert_eq!(
            resolve_due_infusion(&mut state, &catalog),
            Some(InfusionOutcome::NoPattern)
        );
    }

    #[test]
    fn test_rejections() {
        let (mut state, _, rules) = setup();
        assert_eq!(
            begin_infusion(&mut state, &rules, Some(ResourceKind::Iron), None),
            Err(Rejection::EmptySlot)
        );
        assert_eq!(
            begin_infusion(&mut state, &rules, Some(ResourceKind::Iron), Some(ResourceKind::Iron)),
            Err(Rejection::IdenticalSelection)
        );
        assert!(matches!(
            begin_infusion(&mut state, &rules, Some(ResourceKind::Obsidian), Some(ResourceKind::Iron)),
            Err(Rejection::InsufficientResources {
                resource: ResourceKind::Obsidian,
                ..
            })
        ));

        begin_infusion(&mut state, &rules, Some(ResourceKind::Crystal), Some(ResourceKind::Iron)).unwrap();
        let pending = state.clone();
        assert_eq!(
            begin_infusion(&mut state, &rules, Some(ResourceKind::Crystal), Some(ResourceKind::Iron)),
            Err(Rejection::OperationPending)
        );
        assert_eq!(state, pending);
    }

    #[test]
    fn test_discover_recipe_only_once() {
        let (mut state, catalog, _) = setup();
        assert!(discover_recipe(&mut state, &catalog, "RCP4"));
        let logged = state.log.len();
        assert!(!discover_recipe(&mut state, &catalog, "RCP4"));
        assert_eq!(state.log.len(), logged);
    }
}
