//! Fabrication: recipe scaling, the craft queue, and the single forge slot.
//!
//! Costs are paid when a recipe is queued. Duration is fixed when the job
//! leaves the queue, using the recipe level at that moment. The forge is a
//! small state machine driven by its own tick:
//!
//! ```text
//! Idle --(queue non-empty)--> Active(job) --(remaining hits 0)--> Idle
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::data::{RecipeData, RecipeId};
use crate::error::Rejection;
use crate::heroes::craft_speed_multiplier;
use crate::math::{geometric_floor, Ratio};
use crate::resources::{ResourceAmounts, ResourceKind};
use crate::rules::Rules;
use crate::state::{EconomyState, GameEvent};

/// Cost and timing of a recipe at a given level and craft speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveStats {
    /// Costs after the level discount; every listed cost is at least 1.
    pub costs: ResourceAmounts,
    /// Fabrication time in forge ticks, at least 1.
    pub duration_secs: u32,
    /// Gold needed to raise the recipe one level.
    pub upgrade_cost: u64,
    /// Applied cost multiplier.
    pub cost_multiplier: Ratio,
    /// Applied duration multiplier.
    pub duration_multiplier: Ratio,
}

/// `max(floor, 1 - step × (level - 1))`.
#[must_use]
pub fn cost_multiplier(level: u32, rules: &Rules) -> Ratio {
    let discount = u64::from(rules.cost_step_percent) * u64::from(level.saturating_sub(1));
    let percent = 100u64.saturating_sub(discount);
    Ratio::percent(percent).max(Ratio::percent(u64::from(rules.cost_floor_percent)))
}

/// `max(floor, (1 - step × (level - 1)) × craft_speed)`.
#[must_use]
pub fn duration_multiplier(level: u32, craft_speed: Ratio, rules: &Rules) -> Ratio {
    let reduction = u64::from(rules.duration_step_percent) * u64::from(level.saturating_sub(1));
    let percent = 100u64.saturating_sub(reduction);
    Ratio::percent(percent)
        .mul(craft_speed)
        .max(Ratio::percent(u64::from(rules.duration_floor_percent)))
}

/// Gold to upgrade a recipe currently at `level`: `floor(1000 × 1.5^(level - 1))`.
#[must_use]
pub fn upgrade_cost(level: u32, rules: &Rules) -> u64 {
    geometric_floor(
        rules.upgrade_base_gold,
        rules.upgrade_growth(),
        level.saturating_sub(1),
    )
}

/// Compute cost, duration and upgrade price of `recipe` at `level`.
#[must_use]
pub fn effective_stats(
    recipe: &RecipeData,
    level: u32,
    craft_speed: Ratio,
    rules: &Rules,
) -> EffectiveStats {
    let cost_multiplier = cost_multiplier(level, rules);
    let duration_multiplier = duration_multiplier(level, craft_speed, rules);

    let costs = recipe.costs.map_amounts(|amount| {
        let scaled = cost_multiplier.mul_floor(u64::from(amount));
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    });
    let duration = duration_multiplier.mul_floor(u64::from(recipe.duration_secs));

    EffectiveStats {
        costs,
        duration_secs: u32::try_from(duration).unwrap_or(u32::MAX).max(1),
        upgrade_cost: upgrade_cost(level, rules),
        cost_multiplier,
        duration_multiplier,
    }
}

/// Stats of a recipe for the current state (its level and the roster's Blacksmiths).
///
/// # Panics
///
/// Panics if the recipe is not in the catalog.
#[must_use]
pub fn stats_for(
    state: &EconomyState,
    catalog: &Catalog,
    rules: &Rules,
    recipe: &str,
) -> EffectiveStats {
    let data = catalog.expect_recipe(recipe);
    effective_stats(
        data,
        state.recipe_level(recipe),
        craft_speed_multiplier(&state.heroes, rules),
        rules,
    )
}

/// A fabrication in progress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CraftJob {
    /// Recipe being fabricated.
    pub recipe: RecipeId,
    /// Forge ticks left.
    pub remaining_secs: u32,
    /// Duration the job started with.
    pub total_secs: u32,
}

impl CraftJob {
    /// Completion percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total_secs == 0 {
            100
        } else {
            (self.total_secs - self.remaining_secs.min(self.total_secs)) * 100 / self.total_secs
        }
    }
}

/// The forge: waiting recipes (already paid for) and the active job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Forge {
    /// Paid-for recipes waiting to start, in order.
    pub queue: VecDeque<RecipeId>,
    /// The job currently being fabricated.
    pub active: Option<CraftJob>,
}

impl Forge {
    /// Whether nothing is active or waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }
}

/// What a forge tick did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForgeEvent {
    /// A queued recipe moved into the forge slot.
    Started {
        /// Recipe started.
        recipe: RecipeId,
        /// Its fabrication time.
        duration_secs: u32,
    },
    /// The active job advanced without finishing.
    Progressed {
        /// Recipe in progress.
        recipe: RecipeId,
        /// Ticks left.
        remaining_secs: u32,
    },
    /// The active job finished and its reward was paid.
    Completed {
        /// Recipe completed.
        recipe: RecipeId,
    },
}

/// Pay for a recipe and append it to the queue.
///
/// Checks, in order: queue capacity, discovery, affordability at the
/// current level. Nothing changes on rejection.
///
/// # Errors
///
/// [`Rejection::QueueFull`], [`Rejection::RecipeLocked`] or
/// [`Rejection::InsufficientResources`].
///
/// # Panics
///
/// Panics if the recipe is not in the catalog.
pub fn enqueue(
    state: &mut EconomyState,
    catalog: &Catalog,
    rules: &Rules,
    recipe: &str,
) -> Result<EffectiveStats, Rejection> {
    let data = catalog.expect_recipe(recipe);
    if state.forge.queue.len() >= rules.queue_limit {
        return Err(Rejection::QueueFull {
            limit: rules.queue_limit,
        });
    }
    if !state.is_discovered(recipe) {
        return Err(Rejection::RecipeLocked);
    }

    let stats = stats_for(state, catalog, rules, recipe);
    state.resources.try_spend(&stats.costs)?;
    state.forge.queue.push_back(data.id.clone());
    state.record(GameEvent::CraftScheduled {
        recipe: data.id.clone(),
        name: data.name.clone(),
    });
    tracing::info!(recipe, queued = state.forge.queue.len(), "Fabrication scheduled");
    Ok(stats)
}

/// Remove a waiting entry from the queue. The paid cost is not refunded.
///
/// # Errors
///
/// [`Rejection::EmptySlot`] if `index` is past the end of the queue.
pub fn cancel_queued(state: &mut EconomyState, index: usize) -> Result<RecipeId, Rejection> {
    let removed = state.forge.queue.remove(index).ok_or(Rejection::EmptySlot)?;
    tracing::info!(recipe = %removed, index, "Queued fabrication removed");
    Ok(removed)
}

/// Advance the forge by one second.
///
/// An active job counts down and completes when it reaches zero. With no
/// active job, the front of the queue starts; starting consumes the tick.
/// An idle forge is a no-op.
///
/// # Panics
///
/// Panics if a queued recipe is not in the catalog.
pub fn forge_tick(state: &mut EconomyState, catalog: &Catalog, rules: &Rules) -> Option<ForgeEvent> {
    if let Some(job) = state.forge.active.as_mut() {
        job.remaining_secs = job.remaining_secs.saturating_sub(1);
        if job.remaining_secs > 0 {
            return Some(ForgeEvent::Progressed {
                recipe: job.recipe.clone(),
                remaining_secs: job.remaining_secs,
            });
        }

        let finished = state.forge.active.take()?;
        let data = catalog.expect_recipe(finished.recipe.as_str());
        state.resources.deposit(&data.completion_reward);
        state.record(GameEvent::CraftCompleted {
            recipe: data.id.clone(),
            result: data.result.clone(),
        });
        tracing::info!(recipe = %data.id, "Fabrication complete");
        return Some(ForgeEvent::Completed {
            recipe: finished.recipe,
        });
    }

    let next = state.forge.queue.pop_front()?;
    let stats = stats_for(state, catalog, rules, next.as_str());
    state.forge.active = Some(CraftJob {
        recipe: next.clone(),
        remaining_secs: stats.duration_secs,
        total_secs: stats.duration_secs,
    });
    tracing::debug!(recipe = %next, duration = stats.duration_secs, "Fabrication started");
    Some(ForgeEvent::Started {
        recipe: next,
        duration_secs: stats.duration_secs,
    })
}

/// Spend gold to raise a discovered recipe one level.
///
/// Returns the new level. The active job keeps its duration.
///
/// # Errors
///
/// [`Rejection::RecipeLocked`] or [`Rejection::InsufficientResources`].
///
/// # Panics
///
/// Panics if the recipe is not in the catalog.
pub fn upgrade_recipe(
    state: &mut EconomyState,
    catalog: &Catalog,
    rules: &Rules,
    recipe: &str,
) -> Result<u32, Rejection> {
    let data = catalog.expect_recipe(recipe);
    if !state.is_discovered(recipe) {
        return Err(Rejection::RecipeLocked);
    }

    let level = state.recipe_level(recipe);
    let cost = upgrade_cost(level, rules);
    let gold = state.resources.whole(ResourceKind::Gold);
    let price = u32::try_from(cost).map_err(|_| Rejection::InsufficientResources {
        resource: ResourceKind::Gold,
        required: cost,
        available: gold,
    })?;
    state
        .resources
        .try_spend(&ResourceAmounts::new().with(ResourceKind::Gold, price))?;

    let new_level = level.saturating_add(1);
    state.recipe_levels.insert(data.id.clone(), new_level);
    tracing::info!(recipe, level = new_level, cost, "Recipe upgraded");
    Ok(new_level)
}
