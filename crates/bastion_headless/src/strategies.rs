//! Scripted player strategies for headless playtesting.
//!
//! A strategy is a small set of priorities evaluated every decision
//! interval: conquer, expand, infuse, upgrade, craft, level heroes and
//! prestige. It only reads the simulation and proposes commands; the game
//! runner applies them, so a strategy can never bypass the rules.

use std::path::Path;

use bastion_core::data::RecipeId;
use bastion_core::resources::ResourceKind;
use bastion_core::simulation::{Command, Simulation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// No preset with this name.
    #[error("Unknown strategy preset: {0}")]
    UnknownPreset(String),
}

/// A complete scripted strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Seconds between decisions (0 is treated as 1).
    pub decision_interval: u64,
    /// Conquer every POI of the current region.
    pub conquer: bool,
    /// Travel to the highest unlocked region when fuel allows.
    pub expand: bool,
    /// Recipes to keep the forge busy with, first affordable wins.
    pub craft_order: Vec<RecipeId>,
    /// Recipes to upgrade, in priority order.
    pub upgrade_priority: Vec<RecipeId>,
    /// Gold never spent on upgrades.
    pub gold_reserve: u64,
    /// Infusion pairs to try while their blueprint is still unknown.
    pub infusions: Vec<(ResourceKind, ResourceKind)>,
    /// Level every hero each time this many seconds pass.
    pub level_heroes_every: Option<u64>,
    /// Prestige once this stage is reached.
    pub prestige_at_stage: Option<u32>,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::greedy()
    }
}

impl Strategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a strategy from RON text.
    pub fn from_ron_str(ron_text: &str) -> Result<Self, StrategyError> {
        Ok(ron::from_str(ron_text)?)
    }

    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Result<Self, StrategyError> {
        match name {
            "greedy" | "default" => Ok(Self::greedy()),
            "idle" => Ok(Self::idle()),
            "crafter" => Ok(Self::crafter()),
            "ascender" => Ok(Self::ascender()),
            other => Err(StrategyError::UnknownPreset(other.to_string())),
        }
    }

    /// Names accepted by [`Strategy::preset`].
    #[must_use]
    pub const fn preset_names() -> &'static [&'static str] {
        &["greedy", "idle", "crafter", "ascender"]
    }

    /// Do everything the economy allows, never prestige.
    #[must_use]
    pub fn greedy() -> Self {
        Self {
            name: "Greedy".to_string(),
            description: "Conquer, expand, craft and upgrade whenever affordable".to_string(),
            decision_interval: 5,
            conquer: true,
            expand: true,
            craft_order: vec![RecipeId::new("RCP3"), RecipeId::new("RCP1")],
            upgrade_priority: vec![RecipeId::new("RCP3"), RecipeId::new("RCP1")],
            gold_reserve: 0,
            infusions: vec![
                (ResourceKind::Crystal, ResourceKind::Iron),
                (ResourceKind::Obsidian, ResourceKind::Iron),
                (ResourceKind::Crystal, ResourceKind::Wood),
            ],
            level_heroes_every: Some(600),
            prestige_at_stage: None,
        }
    }

    /// Issue no commands at all; measures passive income only.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            name: "Idle".to_string(),
            description: "Never touch the controls".to_string(),
            decision_interval: 60,
            conquer: false,
            expand: false,
            craft_order: Vec::new(),
            upgrade_priority: Vec::new(),
            gold_reserve: 0,
            infusions: Vec::new(),
            level_heroes_every: None,
            prestige_at_stage: None,
        }
    }

    /// Stay home and keep the forge running.
    #[must_use]
    pub fn crafter() -> Self {
        Self {
            name: "Crafter".to_string(),
            description: "Home region only, forge always busy, upgrades with spare gold".to_string(),
            expand: false,
            gold_reserve: 500,
            level_heroes_every: None,
            infusions: Vec::new(),
            ..Self::greedy()
        }
    }

    /// Greedy, but reset as soon as prestige pays out.
    #[must_use]
    pub fn ascender() -> Self {
        Self {
            name: "Ascender".to_string(),
            description: "Greedy play with a prestige at the first eligible stage".to_string(),
            prestige_at_stage: Some(20),
            ..Self::greedy()
        }
    }

    /// Commands to issue this second. Empty between decision points.
    #[must_use]
    pub fn next_commands<R>(&self, sim: &Simulation<R>) -> Vec<Command> {
        let tick = sim.state().tick;
        if tick % self.decision_interval.max(1) != 0 {
            return Vec::new();
        }

        if self
            .prestige_at_stage
            .is_some_and(|stage| sim.stage() >= stage)
        {
            return vec![Command::Prestige];
        }

        let mut commands = Vec::new();
        if self.conquer {
            commands.extend(Self::conquests(sim));
        }
        if self.expand {
            commands.extend(Self::expansion(sim));
        }
        commands.extend(self.infusion(sim));
        commands.extend(self.upgrade(sim));
        commands.extend(self.craft(sim));
        if let Some(every) = self.level_heroes_every {
            if tick > 0 && tick % every.max(1) == 0 {
                commands.extend(sim.heroes().iter().map(|hero| Command::LevelUp {
                    hero: hero.id.clone(),
                }));
            }
        }
        commands
    }

    fn conquests<R>(sim: &Simulation<R>) -> Vec<Command> {
        let region = sim.state().region.as_str();
        sim.catalog()
            .pois_in_region(region)
            .filter(|poi| !sim.conquered().contains(&poi.id))
            .map(|poi| Command::Conquer {
                poi: poi.id.clone(),
            })
            .collect()
    }

    fn expansion<R>(sim: &Simulation<R>) -> Option<Command> {
        let fuel = sim.resources().whole(ResourceKind::Fuel);
        if fuel < u64::from(sim.rules().travel_fuel_cost) {
            return None;
        }
        let current = sim.region();
        sim.catalog()
            .regions
            .iter()
            .filter(|region| {
                region.required_stage <= sim.stage()
                    && region.required_stage > current.required_stage
            })
            .max_by_key(|region| region.required_stage)
            .map(|region| Command::Travel {
                region: region.id.clone(),
            })
    }

    fn infusion<R>(&self, sim: &Simulation<R>) -> Option<Command> {
        if sim.state().infusion.is_pending() {
            return None;
        }
        let cost = u64::from(sim.rules().infusion_cost);
        self.infusions
            .iter()
            .find(|(a, b)| {
                let unknown = sim
                    .catalog()
                    .infusion_target(*a, *b)
                    .is_some_and(|recipe| !sim.discovered().contains(recipe));
                unknown && sim.resources().whole(*a) >= cost && sim.resources().whole(*b) >= cost
            })
            .map(|(a, b)| Command::Infuse {
                primary: Some(*a),
                secondary: Some(*b),
            })
    }

    fn upgrade<R>(&self, sim: &Simulation<R>) -> Option<Command> {
        let gold = sim.resources().whole(ResourceKind::Gold);
        self.upgrade_priority
            .iter()
            .filter(|recipe| sim.discovered().contains(*recipe))
            .find(|recipe| {
                sim.effective_stats(recipe.as_str())
                    .is_some_and(|stats| gold >= stats.upgrade_cost.saturating_add(self.gold_reserve))
            })
            .map(|recipe| Command::Upgrade {
                recipe: recipe.clone(),
            })
    }

    fn craft<R>(&self, sim: &Simulation<R>) -> Option<Command> {
        if sim.state().forge.queue.len() >= sim.rules().queue_limit {
            return None;
        }
        self.craft_order
            .iter()
            .filter(|recipe| sim.discovered().contains(*recipe))
            .find(|recipe| {
                sim.effective_stats(recipe.as_str()).is_some_and(|stats| {
                    stats
                        .costs
                        .iter()
                        .all(|(kind, cost)| sim.resources().whole(kind) >= u64::from(cost))
                })
            })
            .map(|recipe| Command::Enqueue {
                recipe: recipe.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_resolve() {
        for name in Strategy::preset_names() {
            assert!(Strategy::preset(name).is_ok(), "preset {name}");
        }
        assert!(matches!(
            Strategy::preset("turtle"),
            Err(StrategyError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_idle_issues_nothing() {
        let sim = Simulation::with_seed(1);
        assert!(Strategy::idle().next_commands(&sim).is_empty());
    }

    #[test]
    fn test_greedy_opening() {
        let sim = Simulation::with_seed(1);
        let commands = Strategy::greedy().next_commands(&sim);
        // Home POIs, then the first affordable recipe in craft order.
        assert!(commands.contains(&Command::Conquer { poi: "P1".into() }));
        assert!(commands.contains(&Command::Conquer { poi: "P2".into() }));
        assert!(commands.contains(&Command::Enqueue {
            recipe: "RCP3".into()
        }));
        assert!(!commands
            .iter()
            .any(|c| matches!(c, Command::Upgrade { .. })));
        assert!(!commands
            .iter()
            .any(|c| matches!(c, Command::Travel { .. })));
    }

    #[test]
    fn test_ascender_prestiges_when_eligible() {
        let mut sim = Simulation::with_seed(1);
        sim.state_mut().stage = 20;
        assert_eq!(
            Strategy::ascender().next_commands(&sim),
            vec![Command::Prestige]
        );
    }

    #[test]
    fn test_waits_between_decisions() {
        let mut sim = Simulation::with_seed(1);
        sim.advance_world_tick();
        assert!(Strategy::greedy().next_commands(&sim).is_empty());
    }

    #[test]
    fn test_parse_from_ron() {
        let strategy = Strategy::from_ron_str(
            r#"(
                name: "Forge Only",
                conquer: false,
                expand: false,
                craft_order: ["RCP1"],
                prestige_at_stage: Some(30),
            )"#,
        )
        .unwrap();
        assert_eq!(strategy.name, "Forge Only");
        assert_eq!(strategy.craft_order, vec![RecipeId::new("RCP1")]);
        assert_eq!(strategy.prestige_at_stage, Some(30));
        // Unlisted fields come from the greedy preset.
        assert_eq!(strategy.decision_interval, 5);
    }
}
