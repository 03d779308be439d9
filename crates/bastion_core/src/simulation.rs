//! The simulation facade.
//!
//! [`Simulation`] owns the catalog, the rules, the economy state and the
//! random source, and exposes the two tick entry points, the player
//! commands and the read-only queries. Every mutation goes through
//! `&mut self`, so ticks and commands are applied one at a time and each
//! command either fully applies or is rejected with nothing changed.
//!
//! # Determinism
//!
//! - Balances are fixed-point, multipliers exact rationals
//! - All randomness comes from the owned, seedable source
//! - Collections iterate in sorted or insertion order
//!
//! The same seed and the same sequence of ticks and commands always
//! produce the same [`Simulation::state_hash`].
//!
//! # Example
//!
//! ```
//! use bastion_core::simulation::{Command, Simulation};
//!
//! let mut sim = Simulation::with_seed(42);
//! sim.execute(&Command::Enqueue { recipe: "RCP1".into() }).unwrap();
//! sim.advance_forge_tick();
//! sim.advance_world_tick();
//! assert_eq!(sim.state().tick, 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::crafting::{self, EffectiveStats, ForgeEvent};
use crate::data::{HeroId, PoiId, RecipeId, RegionData, RegionId};
use crate::discovery::{self, InfusionOutcome};
use crate::error::{GameError, Rejection, Result};
use crate::heroes::{self, Hero, HeroLevelUp};
use crate::prestige;
use crate::production;
use crate::progression::{self, ProgressionOutcome};
use crate::resources::{ResourceKind, ResourceLedger};
use crate::rules::Rules;
use crate::state::{EconomyState, EventLog, StartingState};
use crate::territory;

/// Seconds of game time per tick.
pub const SECONDS_PER_TICK: u32 = 1;

/// A player command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Jump to another region.
    Travel {
        /// Destination.
        region: RegionId,
    },
    /// Conquer a point of interest.
    Conquer {
        /// Target POI.
        poi: PoiId,
    },
    /// Pay for a recipe and queue it.
    Enqueue {
        /// Recipe to fabricate.
        recipe: RecipeId,
    },
    /// Drop a waiting queue entry (no refund).
    CancelQueued {
        /// Position in the queue.
        index: usize,
    },
    /// Raise a recipe one level.
    Upgrade {
        /// Recipe to upgrade.
        recipe: RecipeId,
    },
    /// Start an infusion.
    Infuse {
        /// First slot.
        primary: Option<ResourceKind>,
        /// Second slot.
        secondary: Option<ResourceKind>,
    },
    /// Level up a hero.
    LevelUp {
        /// Hero to level.
        hero: HeroId,
    },
    /// Prestige reset.
    Prestige,
}

/// What an accepted command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandEffect {
    /// The bastion moved.
    Travelled,
    /// A POI was conquered (`newly` is false on repeats).
    Conquered {
        /// Whether this call added it.
        newly: bool,
    },
    /// A recipe was paid for and queued.
    Enqueued(EffectiveStats),
    /// A queue entry was removed.
    Cancelled(RecipeId),
    /// A recipe reached a new level.
    Upgraded {
        /// The new level.
        level: u32,
    },
    /// An infusion is running.
    InfusionStarted {
        /// World tick at which it resolves.
        ready_at: u64,
    },
    /// A hero levelled up.
    HeroLevelledUp(HeroLevelUp),
    /// The run was reset.
    Prestiged {
        /// Crystal awarded.
        crystal_gain: u64,
    },
}

/// Result of [`Simulation::execute`].
pub type CommandOutcome = std::result::Result<CommandEffect, Rejection>;

/// What a world tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldTickReport {
    /// World tick just completed.
    pub tick: u64,
    /// Stage progression this tick.
    pub progression: ProgressionOutcome,
    /// Infusion resolved this tick.
    pub infusion: Option<InfusionOutcome>,
}

#[derive(Deserialize)]
struct Snapshot {
    state: EconomyState,
    forge_ticks: u64,
}

/// The economy simulation.
#[derive(Debug, Clone)]
pub struct Simulation<R = StdRng> {
    catalog: Catalog,
    rules: Rules,
    start: StartingState,
    state: EconomyState,
    forge_ticks: u64,
    rng: R,
}

impl Simulation<StdRng> {
    /// A new game on the standard catalog and default rules.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let rules = Rules::default();
        let start = StartingState::default();
        let state = EconomyState::new(&start, rules.event_log_capacity);
        Self {
            catalog: Catalog::standard(),
            rules,
            start,
            state,
            forge_ticks: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A new game on custom data, seeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is inconsistent or the starting
    /// state references unknown ids.
    pub fn from_parts(
        catalog: Catalog,
        rules: Rules,
        start: StartingState,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(catalog, rules, start, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// A new game using an injected random source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is inconsistent or the starting
    /// state references unknown ids.
    pub fn with_rng(catalog: Catalog, rules: Rules, start: StartingState, rng: R) -> Result<Self> {
        catalog.validate()?;
        if catalog.region(start.region.as_str()).is_none() {
            return Err(unknown("region", start.region.as_str()));
        }
        if let Some(id) = start
            .discovered
            .iter()
            .find(|id| catalog.recipe(id.as_str()).is_none())
        {
            return Err(unknown("recipe", id.as_str()));
        }

        let state = EconomyState::new(&start, rules.event_log_capacity);
        Ok(Self {
            catalog,
            rules,
            start,
            state,
            forge_ticks: 0,
            rng,
        })
    }

    // --- Tick entry points ---

    /// Advance the world clock one second: passive production, stage
    /// progression, then any infusion that has come due.
    pub fn advance_world_tick(&mut self) -> WorldTickReport {
        self.state.tick += 1;
        production::apply_passive_tick(
            &mut self.state,
            &self.catalog,
            &self.rules,
            SECONDS_PER_TICK,
        );
        let progression = progression::apply_progression_tick(
            &mut self.state,
            &self.catalog,
            &self.rules,
            &mut self.rng,
        );
        let infusion = discovery::resolve_due_infusion(&mut self.state, &self.catalog);

        self.check_invariants();

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.state.tick, stage = self.state.stage, state_hash = hash, "World tick");
        }

        WorldTickReport {
            tick: self.state.tick,
            progression,
            infusion,
        }
    }

    /// Advance the forge one second. A no-op when nothing is queued or active.
    pub fn advance_forge_tick(&mut self) -> Option<ForgeEvent> {
        self.forge_ticks += 1;
        let event = crafting::forge_tick(&mut self.state, &self.catalog, &self.rules);
        self.check_invariants();
        event
    }

    /// Advance both clocks one second (world first).
    pub fn advance(&mut self) -> (WorldTickReport, Option<ForgeEvent>) {
        let world = self.advance_world_tick();
        let forge = self.advance_forge_tick();
        (world, forge)
    }

    // --- Commands ---

    /// Apply a command.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] reason; the state is then unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the command names an id missing from the catalog or
    /// roster. Use [`Simulation::check_ids`] first for untrusted input.
    pub fn execute(&mut self, command: &Command) -> CommandOutcome {
        let outcome = match command {
            Command::Travel { region } => self.travel(region.as_str()).map(|()| CommandEffect::Travelled),
            Command::Conquer { poi } => Ok(CommandEffect::Conquered {
                newly: self.conquer(poi.as_str()),
            }),
            Command::Enqueue { recipe } => self.enqueue(recipe.as_str()).map(CommandEffect::Enqueued),
            Command::CancelQueued { index } => self.cancel_queued(*index).map(CommandEffect::Cancelled),
            Command::Upgrade { recipe } => self
                .upgrade_recipe(recipe.as_str())
                .map(|level| CommandEffect::Upgraded { level }),
            Command::Infuse { primary, secondary } => self
                .begin_infusion(*primary, *secondary)
                .map(|ready_at| CommandEffect::InfusionStarted { ready_at }),
            Command::LevelUp { hero } => Ok(CommandEffect::HeroLevelledUp(self.level_up_hero(hero))),
            Command::Prestige => self
                .prestige()
                .map(|crystal_gain| CommandEffect::Prestiged { crystal_gain }),
        };
        if let Err(reason) = &outcome {
            tracing::debug!(?command, %reason, "Command rejected");
        }
        self.check_invariants();
        outcome
    }

    /// Verify every id a command references exists.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownId`] for the first unknown id.
    pub fn check_ids(&self, command: &Command) -> Result<()> {
        match command {
            Command::Travel { region } if self.catalog.region(region.as_str()).is_none() => {
                Err(unknown("region", region.as_str()))
            }
            Command::Conquer { poi } if self.catalog.poi(poi.as_str()).is_none() => {
                Err(unknown("POI", poi.as_str()))
            }
            Command::Enqueue { recipe } | Command::Upgrade { recipe }
                if self.catalog.recipe(recipe.as_str()).is_none() =>
            {
                Err(unknown("recipe", recipe.as_str()))
            }
            Command::LevelUp { hero } if !self.state.heroes.iter().any(|h| &h.id == hero) => {
                Err(unknown("hero", hero.as_str()))
            }
            _ => Ok(()),
        }
    }

    /// Jump to another region.
    ///
    /// # Errors
    ///
    /// See [`territory::travel`].
    pub fn travel(&mut self, region: &str) -> std::result::Result<(), Rejection> {
        territory::travel(&mut self.state, &self.catalog, &self.rules, region)
    }

    /// Conquer a POI; returns `true` the first time.
    pub fn conquer(&mut self, poi: &str) -> bool {
        territory::conquer(&mut self.state, &self.catalog, poi)
    }

    /// Pay for and queue a recipe.
    ///
    /// # Errors
    ///
    /// See [`crafting::enqueue`].
    pub fn enqueue(&mut self, recipe: &str) -> std::result::Result<EffectiveStats, Rejection> {
        crafting::enqueue(&mut self.state, &self.catalog, &self.rules, recipe)
    }

    /// Remove a waiting queue entry without refund.
    ///
    /// # Errors
    ///
    /// See [`crafting::cancel_queued`].
    pub fn cancel_queued(&mut self, index: usize) -> std::result::Result<RecipeId, Rejection> {
        crafting::cancel_queued(&mut self.state, index)
    }

    /// Raise a recipe one level.
    ///
    /// # Errors
    ///
    /// See [`crafting::upgrade_recipe`].
    pub fn upgrade_recipe(&mut self, recipe: &str) -> std::result::Result<u32, Rejection> {
        crafting::upgrade_recipe(&mut self.state, &self.catalog, &self.rules, recipe)
    }

    /// Start an infusion.
    ///
    /// # Errors
    ///
    /// See [`discovery::begin_infusion`].
    pub fn begin_infusion(
        &mut self,
        primary: Option<ResourceKind>,
        secondary: Option<ResourceKind>,
    ) -> std::result::Result<u64, Rejection> {
        discovery::begin_infusion(&mut self.state, &self.rules, primary, secondary)
    }

    /// Unlock a recipe directly; returns `false` if it was already known.
    pub fn discover_recipe(&mut self, recipe: &str) -> bool {
        discovery::discover_recipe(&mut self.state, &self.catalog, recipe)
    }

    /// Level up a hero.
    pub fn level_up_hero(&mut self, hero: &HeroId) -> HeroLevelUp {
        heroes::level_up_hero(&mut self.state, &self.rules, hero)
    }

    /// Prestige reset; returns the crystal gained.
    ///
    /// # Errors
    ///
    /// See [`prestige::reset`].
    pub fn prestige(&mut self) -> std::result::Result<u64, Rejection> {
        prestige::reset(&mut self.state, &self.start, &self.rules)
    }

    /// Mutable access to the random source.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Mutable access to the economy, for test setup and tooling.
    pub fn state_mut(&mut self) -> &mut EconomyState {
        &mut self.state
    }

    /// Restore state from [`Simulation::snapshot`] bytes. The random source
    /// is not part of the snapshot and keeps its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid snapshot.
    pub fn restore_snapshot(&mut self, data: &[u8]) -> Result<()> {
        let snapshot: Snapshot = bincode::deserialize(data).map_err(|e| {
            GameError::InvalidState(format!("Failed to deserialize snapshot: {e}"))
        })?;
        self.state = snapshot.state;
        self.forge_ticks = snapshot.forge_ticks;
        Ok(())
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        assert!(self.state.resources.is_non_negative(), "negative balance");
        assert!(self.state.stage >= 1, "stage below 1");
        assert!(
            self.state.forge.queue.len() <= self.rules.queue_limit,
            "queue over limit"
        );
        assert!(
            self.state.log.len() <= self.state.log.capacity(),
            "event log over capacity"
        );
    }

    #[cfg(not(feature = "debug-validation"))]
    #[allow(clippy::unused_self)]
    fn check_invariants(&self) {}
}

impl<R> Simulation<R> {
    // --- Queries ---

    /// The static catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The active rules.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// The starting state (and prestige reset target).
    #[must_use]
    pub const fn starting_state(&self) -> &StartingState {
        &self.start
    }

    /// The whole economy state.
    #[must_use]
    pub const fn state(&self) -> &EconomyState {
        &self.state
    }

    /// Current balances.
    #[must_use]
    pub const fn resources(&self) -> &ResourceLedger {
        &self.state.resources
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> u32 {
        self.state.stage
    }

    /// Current player level.
    #[must_use]
    pub const fn player_level(&self) -> u32 {
        self.state.player_level
    }

    /// Region the bastion is stationed in.
    ///
    /// # Panics
    ///
    /// Never in practice: the region is validated on construction and on travel.
    #[must_use]
    pub fn region(&self) -> &RegionData {
        self.catalog.expect_region(self.state.region.as_str())
    }

    /// Hero roster.
    #[must_use]
    pub fn heroes(&self) -> &[Hero] {
        &self.state.heroes
    }

    /// Discovered recipes.
    #[must_use]
    pub const fn discovered(&self) -> &BTreeSet<RecipeId> {
        &self.state.discovered
    }

    /// Conquered POIs.
    #[must_use]
    pub const fn conquered(&self) -> &BTreeSet<PoiId> {
        &self.state.conquered
    }

    /// Level of every catalog recipe, defaulting to 1.
    #[must_use]
    pub fn recipe_levels(&self) -> BTreeMap<RecipeId, u32> {
        self.catalog
            .recipes
            .iter()
            .map(|r| (r.id.clone(), self.state.recipe_level(r.id.as_str())))
            .collect()
    }

    /// Recent events, most recent first.
    #[must_use]
    pub const fn log(&self) -> &EventLog {
        &self.state.log
    }

    /// Effective cost, duration and upgrade price of a recipe right now.
    ///
    /// `None` if the recipe is not in the catalog.
    #[must_use]
    pub fn effective_stats(&self, recipe: &str) -> Option<EffectiveStats> {
        self.catalog.recipe(recipe)?;
        Some(crafting::stats_for(
            &self.state,
            &self.catalog,
            &self.rules,
            recipe,
        ))
    }

    /// Per-second income of every resource.
    #[must_use]
    pub fn production_rates(&self) -> ResourceLedger {
        production::production_rates(&self.state, &self.catalog, &self.rules)
    }

    /// Crystal a prestige would award right now.
    #[must_use]
    pub fn crystal_gain_preview(&self) -> u64 {
        prestige::crystal_gain_preview(self.state.stage, &self.rules)
    }

    /// Forge ticks elapsed.
    #[must_use]
    pub const fn forge_ticks(&self) -> u64 {
        self.forge_ticks
    }

    /// Hash of the economy state, for desync and determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.state.hash(&mut hasher);
        self.forge_ticks.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the economy state and forge clock.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        #[derive(Serialize)]
        struct SnapshotRef<'a> {
            state: &'a EconomyState,
            forge_ticks: u64,
        }
        bincode::serialize(&SnapshotRef {
            state: &self.state,
            forge_ticks: self.forge_ticks,
        })
        .map_err(|e| GameError::InvalidState(format!("Failed to serialize snapshot: {e}")))
    }
}

fn unknown(kind: &'static str, id: &str) -> GameError {
    GameError::UnknownId {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use bastion_test_utils::rng::ScriptedRng;

    use super::*;

    #[test]
    fn test_new_simulation() {
        let sim = Simulation::with_seed(1);
        assert_eq!(sim.state().tick, 0);
        assert_eq!(sim.stage(), 1);
        assert_eq!(sim.region().name, "Emerald Plains");
        assert_eq!(sim.recipe_levels().len(), 5);
        assert!(sim.recipe_levels().values().all(|level| *level == 1));
    }

    #[test]
    fn test_same_seed_same_hash() {
        let mut a = Simulation::with_seed(7);
        let mut b = Simulation::with_seed(7);
        for _ in 0..200 {
            a.advance();
            b.advance();
        }
        assert_eq!(a.state_hash(), b.state_hash());
        assert!(a.stage() > 1);
    }

    #[test]
    fn test_forge_tick_is_noop_when_idle() {
        let mut sim = Simulation::with_seed(3);
        let before = sim.state().clone();
        assert_eq!(sim.advance_forge_tick(), None);
        assert_eq!(sim.state(), &before);
    }

    #[test]
    fn test_infusion_resolves_on_second_world_tick() {
        // A zero roll never advances the stage, so progression cannot find RCP2 first.
        let mut sim = Simulation::with_rng(
            Catalog::standard(),
            Rules::default(),
            StartingState::default(),
            ScriptedRng::new(vec![0]),
        )
        .unwrap();
        sim.state_mut()
            .resources
            .set(ResourceKind::Crystal, crate::math::Fixed::from_num(60));
        let effect = sim
            .execute(&Command::Infuse {
                primary: Some(ResourceKind::Crystal),
                secondary: Some(ResourceKind::Iron),
            })
            .unwrap();
        assert_eq!(effect, CommandEffect::InfusionStarted { ready_at: 2 });

        assert_eq!(sim.advance_world_tick().infusion, None);
        assert_eq!(
            sim.advance_world_tick().infusion,
            Some(InfusionOutcome::Discovered(RecipeId::new("RCP2")))
        );
    }

    #[test]
    fn test_check_ids() {
        let sim = Simulation::with_seed(0);
        assert!(sim
            .check_ids(&Command::Travel {
                region: "R9".into()
            })
            .is_err());
        assert!(sim
            .check_ids(&Command::LevelUp { hero: "h1".into() })
            .is_ok());
        assert!(matches!(
            sim.check_ids(&Command::Enqueue {
                recipe: "nope".into()
            }),
            Err(GameError::UnknownId { kind: "recipe", .. })
        ));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut sim = Simulation::with_seed(11);
        sim.execute(&Command::Conquer { poi: "P1".into() }).unwrap();
        sim.execute(&Command::Enqueue {
            recipe: "RCP1".into(),
        })
        .unwrap();
        for _ in 0..3 {
            sim.advance();
        }
        let bytes = sim.snapshot().unwrap();
        let hash = sim.state_hash();

        let mut other = Simulation::with_seed(99);
        other.restore_snapshot(&bytes).unwrap();
        assert_eq!(other.state_hash(), hash);
        assert!(other.restore_snapshot(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_from_parts_rejects_bad_start() {
        let start = StartingState {
            region: RegionId::new("R9"),
            ..StartingState::default()
        };
        let result = Simulation::from_parts(Catalog::standard(), Rules::default(), start, 0);
        assert!(matches!(result, Err(GameError::UnknownId { kind: "region", .. })));
    }
}
