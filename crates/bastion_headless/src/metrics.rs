//! Game metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] watches one game through its tick reports, forge
//! events and command outcomes; [`BatchSummary`] aggregates many games.

use std::collections::BTreeMap;

use bastion_core::crafting::ForgeEvent;
use bastion_core::discovery::InfusionOutcome;
use bastion_core::resources::ResourceKind;
use bastion_core::simulation::{CommandEffect, CommandOutcome, Simulation, WorldTickReport};
use serde::{Deserialize, Serialize};

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// World ticks simulated.
    pub duration_ticks: u64,
    /// Stage at the end.
    pub final_stage: u32,
    /// Highest stage reached in any run of this game.
    pub max_stage: u32,
    /// Player level at the end.
    pub final_player_level: u32,
    /// Prestige resets performed.
    pub prestige_count: u32,
    /// Crystal banked through prestige.
    pub crystal_earned: u64,
    /// Tick of the first prestige.
    pub first_prestige_tick: Option<u64>,
    /// Recipes known at the end.
    pub recipes_discovered: usize,
    /// Recipes found by stage progression.
    pub auto_discoveries: u32,
    /// Infusions resolved, successful or not.
    pub infusions: u32,
    /// Infusions that revealed a recipe.
    pub infusion_discoveries: u32,
    /// Fabrications finished, by recipe id.
    pub crafts_completed: BTreeMap<String, u32>,
    /// Upgrades bought.
    pub upgrades: u32,
    /// Regions travelled to.
    pub travels: u32,
    /// POIs conquered (first time only).
    pub conquests: u32,
    /// Commands the rules accepted.
    pub commands_accepted: u32,
    /// Rejections by reason code.
    pub rejections: BTreeMap<String, u32>,
    /// Whole balances at the end.
    pub final_resources: BTreeMap<ResourceKind, u64>,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new game metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            game_id: game_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Total fabrications finished.
    #[must_use]
    pub fn total_crafts(&self) -> u32 {
        self.crafts_completed.values().sum()
    }

    /// Total rejected commands.
    #[must_use]
    pub fn total_rejections(&self) -> u32 {
        self.rejections.values().sum()
    }
}

/// Accumulates metrics while a game runs.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    metrics: GameMetrics,
}

impl MetricsCollector {
    /// Start collecting for a new game.
    #[must_use]
    pub fn new(game_id: &str, scenario: &str, seed: u64) -> Self {
        Self {
            metrics: GameMetrics::new(game_id, scenario, seed),
        }
    }

    /// Record a world tick.
    pub fn on_world_tick(&mut self, report: &WorldTickReport) {
        if let Some(stage) = report.progression.advanced_to {
            self.metrics.max_stage = self.metrics.max_stage.max(stage);
        }
        if report.progression.discovered.is_some() {
            self.metrics.auto_discoveries += 1;
        }
        if let Some(outcome) = &report.infusion {
            self.metrics.infusions += 1;
            if matches!(outcome, InfusionOutcome::Discovered(_)) {
                self.metrics.infusion_discoveries += 1;
            }
        }
    }

    /// Record a forge tick.
    pub fn on_forge_event(&mut self, event: Option<&ForgeEvent>) {
        if let Some(ForgeEvent::Completed { recipe }) = event {
            *self
                .metrics
                .crafts_completed
                .entry(recipe.as_str().to_string())
                .or_default() += 1;
        }
    }

    /// Record a command outcome at the given tick.
    pub fn on_command(&mut self, tick: u64, outcome: &CommandOutcome) {
        match outcome {
            Ok(effect) => {
                self.metrics.commands_accepted += 1;
                match effect {
                    CommandEffect::Travelled => self.metrics.travels += 1,
                    CommandEffect::Conquered { newly: true } => self.metrics.conquests += 1,
                    CommandEffect::Upgraded { .. } => self.metrics.upgrades += 1,
                    CommandEffect::Prestiged { .. } => {
                        self.metrics.first_prestige_tick.get_or_insert(tick);
                    }
                    _ => {}
                }
            }
            Err(reason) => {
                *self
                    .metrics
                    .rejections
                    .entry(reason.code().to_string())
                    .or_default() += 1;
            }
        }
    }

    /// Finish the game and take the final readings.
    #[must_use]
    pub fn finalize<R>(mut self, sim: &Simulation<R>) -> GameMetrics {
        let state = sim.state();
        self.metrics.duration_ticks = state.tick;
        self.metrics.final_stage = state.stage;
        self.metrics.max_stage = self.metrics.max_stage.max(state.stage);
        self.metrics.final_player_level = state.player_level;
        self.metrics.prestige_count = state.prestige_count;
        self.metrics.crystal_earned = state.crystal_earned;
        self.metrics.recipes_discovered = state.discovered.len();
        self.metrics.final_resources = state.resources.to_whole_amounts();
        self.metrics.final_state_hash = sim.state_hash();
        self.metrics
    }
}

/// Summary statistics across multiple games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Average final stage.
    pub avg_final_stage: f64,
    /// Average highest stage.
    pub avg_max_stage: f64,
    /// Lowest highest-stage across games.
    pub min_max_stage: u32,
    /// Highest stage seen in any game.
    pub max_max_stage: u32,
    /// Average prestige resets per game.
    pub avg_prestiges: f64,
    /// Average crystal banked per game.
    pub avg_crystal_earned: f64,
    /// Average tick of the first prestige, over games that prestiged.
    pub avg_first_prestige_tick: Option<f64>,
    /// Average recipes known at the end.
    pub avg_recipes_discovered: f64,
    /// Average fabrications per game, by recipe.
    pub avg_crafts: BTreeMap<String, f64>,
    /// Fraction of commands rejected.
    pub rejection_rate: f64,
    /// Average final balance, by resource.
    pub avg_final_resources: BTreeMap<ResourceKind, f64>,
}

impl BatchSummary {
    /// Calculate summary from a list of game metrics.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }
        let count = games.len() as f64;
        let mean = |f: &dyn Fn(&GameMetrics) -> f64| games.iter().map(f).sum::<f64>() / count;

        let mut crafts: BTreeMap<String, u64> = BTreeMap::new();
        let mut resources: BTreeMap<ResourceKind, u64> = BTreeMap::new();
        for game in games {
            for (recipe, n) in &game.crafts_completed {
                *crafts.entry(recipe.clone()).or_default() += u64::from(*n);
            }
            for (kind, amount) in &game.final_resources {
                let total = resources.entry(*kind).or_default();
                *total = total.saturating_add(*amount);
            }
        }

        let first_prestiges: Vec<u64> = games.iter().filter_map(|g| g.first_prestige_tick).collect();
        let accepted: u64 = games.iter().map(|g| u64::from(g.commands_accepted)).sum();
        let rejected: u64 = games.iter().map(|g| u64::from(g.total_rejections())).sum();

        Self {
            total_games: games.len() as u32,
            avg_final_stage: mean(&|g| f64::from(g.final_stage)),
            avg_max_stage: mean(&|g| f64::from(g.max_stage)),
            min_max_stage: games.iter().map(|g| g.max_stage).min().unwrap_or(0),
            max_max_stage: games.iter().map(|g| g.max_stage).max().unwrap_or(0),
            avg_prestiges: mean(&|g| f64::from(g.prestige_count)),
            avg_crystal_earned: mean(&|g| g.crystal_earned as f64),
            avg_first_prestige_tick: (!first_prestiges.is_empty()).then(|| {
                first_prestiges.iter().sum::<u64>() as f64 / first_prestiges.len() as f64
            }),
            avg_recipes_discovered: mean(&|g| g.recipes_discovered as f64),
            avg_crafts: crafts
                .into_iter()
                .map(|(recipe, total)| (recipe, total as f64 / count))
                .collect(),
            rejection_rate: if accepted + rejected == 0 {
                0.0
            } else {
                rejected as f64 / (accepted + rejected) as f64
            },
            avg_final_resources: resources
                .into_iter()
                .map(|(kind, total)| (kind, total as f64 / count))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::error::Rejection;

    fn game(seed: u64, max_stage: u32, prestiges: u32) -> GameMetrics {
        GameMetrics {
            max_stage,
            final_stage: max_stage,
            prestige_count: prestiges,
            first_prestige_tick: (prestiges > 0).then_some(100),
            commands_accepted: 3,
            rejections: [("queue_full".to_string(), 1)].into_iter().collect(),
            crafts_completed: [("RCP1".to_string(), 2)].into_iter().collect(),
            ..GameMetrics::new(format!("game_{seed}"), "test", seed)
        }
    }

    #[test]
    fn test_collector_counts_commands() {
        let sim = Simulation::with_seed(1);
        let mut collector = MetricsCollector::new("g", "s", 1);
        collector.on_command(0, &Ok(CommandEffect::Conquered { newly: true }));
        collector.on_command(0, &Ok(CommandEffect::Conquered { newly: false }));
        collector.on_command(3, &Ok(CommandEffect::Prestiged { crystal_gain: 2 }));
        collector.on_command(9, &Ok(CommandEffect::Prestiged { crystal_gain: 2 }));
        collector.on_command(4, &Err(Rejection::OperationPending));

        let metrics = collector.finalize(&sim);
        assert_eq!(metrics.commands_accepted, 4);
        assert_eq!(metrics.conquests, 1);
        assert_eq!(metrics.first_prestige_tick, Some(3));
        assert_eq!(metrics.rejections["operation_pending"], 1);
        assert_eq!(metrics.final_stage, 1);
        assert_eq!(metrics.final_resources[&ResourceKind::Gold], 500);
    }

    #[test]
    fn test_collector_counts_crafts() {
        let sim = Simulation::with_seed(1);
        let mut collector = MetricsCollector::new("g", "s", 1);
        let done = ForgeEvent::Completed {
            recipe: "RCP3".into(),
        };
        collector.on_forge_event(Some(&done));
        collector.on_forge_event(None);
        collector.on_forge_event(Some(&done));
        assert_eq!(collector.finalize(&sim).total_crafts(), 2);
    }

    #[test]
    fn test_summary_from_games() {
        let games = vec![game(1, 10, 0), game(2, 30, 2)];
        let summary = BatchSummary::from_games(&games);

        assert_eq!(summary.total_games, 2);
        assert!((summary.avg_max_stage - 20.0).abs() < f64::EPSILON);
        assert_eq!(summary.min_max_stage, 10);
        assert_eq!(summary.max_max_stage, 30);
        assert!((summary.avg_prestiges - 1.0).abs() < f64::EPSILON);
        assert_eq!(summary.avg_first_prestige_tick, Some(100.0));
        assert!((summary.avg_crafts["RCP1"] - 2.0).abs() < f64::EPSILON);
        assert!((summary.rejection_rate - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(BatchSummary::from_games(&[]), BatchSummary::default());
    }
}
