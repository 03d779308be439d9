//! # Bastion Core
//!
//! Deterministic economy simulation core for Neon Bastion, an idle RPG.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO beyond loading data files and replays on request
//! - No ambient randomness (the random source is injected)
//! - No floating-point math (balances are fixed-point, multipliers rational)
//!
//! This separation enables:
//! - Headless runners and batch balancing
//! - Replay recording and verification
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`catalog`] / [`data`] - Static regions, POIs, recipes and the rank ladder
//! - [`state`] - The economy aggregate and event log
//! - [`production`], [`progression`], [`crafting`], [`discovery`],
//!   [`territory`], [`heroes`], [`prestige`] - One module per engine
//! - [`simulation`] - Tick entry points, commands and queries
//! - [`replay`] - Recording and verified playback
//! - [`math`] - Fixed-point and rational utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod catalog;
pub mod crafting;
pub mod data;
pub mod discovery;
pub mod error;
pub mod heroes;
pub mod math;
pub mod prestige;
pub mod production;
pub mod progression;
pub mod replay;
pub mod resources;
pub mod rules;
pub mod simulation;
pub mod state;
pub mod territory;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::crafting::{CraftJob, EffectiveStats, Forge, ForgeEvent};
    pub use crate::data::{
        HeroId, InfusionData, PoiData, PoiId, PoiKind, Rank, RecipeData, RecipeId, RegionData,
        RegionId,
    };
    pub use crate::discovery::{InfusionOutcome, InfusionState};
    pub use crate::error::{GameError, Rejection, Result};
    pub use crate::heroes::{Hero, HeroLevelUp, Profession, Role};
    pub use crate::math::{Fixed, Ratio};
    pub use crate::progression::ProgressionOutcome;
    pub use crate::replay::{Replay, ReplayStep};
    pub use crate::resources::{ResourceAmounts, ResourceKind, ResourceLedger};
    pub use crate::rules::Rules;
    pub use crate::simulation::{
        Command, CommandEffect, CommandOutcome, Simulation, WorldTickReport,
    };
    pub use crate::state::{EconomyState, EventLog, GameEvent, LogEntry, StartingState};
}
