//! Scenario loading and configuration.
//!
//! Scenarios define the initial economy for headless testing: the catalog
//! to play on, rule overrides, the starting state, a tick budget and the
//! scripted strategy that plays it.

use std::path::{Path, PathBuf};

use bastion_core::catalog::Catalog;
use bastion_core::error::GameError;
use bastion_core::rules::Rules;
use bastion_core::simulation::Simulation;
use bastion_core::state::StartingState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strategies::Strategy;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario's data does not form a valid game.
    #[error("Invalid scenario data: {0}")]
    Game(#[from] GameError),
}

fn default_max_ticks() -> u64 {
    // One in-game hour.
    3_600
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Random seed.
    #[serde(default)]
    pub seed: u64,
    /// Catalog RON file; the built-in catalog when absent. Relative paths
    /// resolve against the scenario file's directory.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Rule overrides.
    #[serde(default)]
    pub rules: Option<Rules>,
    /// Starting state overrides.
    #[serde(default)]
    pub start: Option<StartingState>,
    /// Seconds to simulate.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Strategy that plays the scenario.
    #[serde(default)]
    pub strategy: Strategy,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Standard Opening".to_string(),
            description: "Base catalog, default rules, one hour of greedy play".to_string(),
            seed: 0,
            catalog_path: None,
            rules: None,
            start: None,
            max_ticks: default_max_ticks(),
            strategy: Strategy::greedy(),
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_ron_str(&contents)?;
        if let (Some(catalog), Some(dir)) = (&scenario.catalog_path, path.parent()) {
            if catalog.is_relative() {
                scenario.catalog_path = Some(dir.join(catalog));
            }
        }
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron_text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron_text)?;
        Ok(scenario)
    }

    /// A short prestige-loop scenario: starts at the prestige floor.
    #[must_use]
    pub fn ascension() -> Self {
        Self {
            name: "Ascension Loop".to_string(),
            description: "Start eligible for prestige and keep resetting".to_string(),
            start: Some(StartingState {
                stage: 20,
                ..StartingState::default()
            }),
            max_ticks: 1_800,
            strategy: Strategy::ascender(),
            ..Self::default()
        }
    }

    /// The catalog this scenario plays on.
    pub fn catalog(&self) -> Result<Catalog, ScenarioError> {
        match &self.catalog_path {
            Some(path) => Ok(Catalog::load(path)?),
            None => Ok(Catalog::standard()),
        }
    }

    /// Build a fresh simulation for this scenario with the given seed.
    pub fn build_simulation(&self, seed: u64) -> Result<Simulation, ScenarioError> {
        let sim = Simulation::from_parts(
            self.catalog()?,
            self.rules.clone().unwrap_or_default(),
            self.start.clone().unwrap_or_default(),
            seed,
        )?;
        Ok(sim)
    }
}
