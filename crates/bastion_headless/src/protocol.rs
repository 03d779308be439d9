//! JSON protocol for headless game communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Responses and state reports
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","tick":0}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every command with one or more responses
//! 4. On `quit` (or end of input), outputs `{"type":"bye"}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0}
//! -> {"cmd":"conquer","poi":"P2"}
//! <- {"type":"ack","cmd":"conquer"}
//! -> {"cmd":"enqueue","recipe":"RCP1"}
//! <- {"type":"ack","cmd":"enqueue"}
//! -> {"cmd":"tick","count":60}
//! <- {"type":"ack","cmd":"tick"}
//! -> {"cmd":"travel","region":"R2"}
//! <- {"type":"rejected","cmd":"travel","reason":"gate_not_met","message":"..."}
//! -> {"cmd":"query"}
//! <- {"type":"state","tick":60,...}
//! ```

use std::collections::BTreeMap;

use bastion_core::crafting::{CraftJob, EffectiveStats};
use bastion_core::data::{HeroId, PoiId, RecipeId, RegionId};
use bastion_core::error::Rejection;
use bastion_core::heroes::Hero;
use bastion_core::resources::ResourceKind;
use bastion_core::simulation::{Command as CoreCommand, Simulation};
use serde::{Deserialize, Serialize};

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the world clock N seconds (default: 1).
    WorldTick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Advance the forge clock N seconds (default: 1).
    ForgeTick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Advance both clocks N seconds (default: 1).
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Jump to another region.
    Travel { region: String },

    /// Conquer a POI.
    Conquer { poi: String },

    /// Queue a fabrication.
    Enqueue { recipe: String },

    /// Drop a waiting queue entry.
    CancelQueued { index: usize },

    /// Upgrade a recipe.
    Upgrade { recipe: String },

    /// Start an infusion. Missing slots are empty.
    Infuse {
        #[serde(default)]
        primary: Option<ResourceKind>,
        #[serde(default)]
        secondary: Option<ResourceKind>,
    },

    /// Level up a hero.
    LevelUp { hero: String },

    /// Prestige reset.
    Prestige,

    /// Query current game state without advancing time.
    Query,

    /// Effective stats of a recipe.
    Stats { recipe: String },

    /// Current state hash (for determinism verification).
    Hash,

    /// Quit the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::WorldTick { .. } => "world_tick",
            Self::ForgeTick { .. } => "forge_tick",
            Self::Tick { .. } => "tick",
            Self::Travel { .. } => "travel",
            Self::Conquer { .. } => "conquer",
            Self::Enqueue { .. } => "enqueue",
            Self::CancelQueued { .. } => "cancel_queued",
            Self::Upgrade { .. } => "upgrade",
            Self::Infuse { .. } => "infuse",
            Self::LevelUp { .. } => "level_up",
            Self::Prestige => "prestige",
            Self::Query => "query",
            Self::Stats { .. } => "stats",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }

    /// The simulation command this maps to, if it is a player action.
    pub fn to_core(&self) -> Option<CoreCommand> {
        let command = match self {
            Self::Travel { region } => CoreCommand::Travel {
                region: RegionId::new(region.as_str()),
            },
            Self::Conquer { poi } => CoreCommand::Conquer {
                poi: PoiId::new(poi.as_str()),
            },
            Self::Enqueue { recipe } => CoreCommand::Enqueue {
                recipe: RecipeId::new(recipe.as_str()),
            },
            Self::CancelQueued { index } => CoreCommand::CancelQueued { index: *index },
            Self::Upgrade { recipe } => CoreCommand::Upgrade {
                recipe: RecipeId::new(recipe.as_str()),
            },
            Self::Infuse { primary, secondary } => CoreCommand::Infuse {
                primary: *primary,
                secondary: *secondary,
            },
            Self::LevelUp { hero } => CoreCommand::LevelUp {
                hero: HeroId::new(hero.as_str()),
            },
            Self::Prestige => CoreCommand::Prestige,
            _ => return None,
        };
        Some(command)
    }
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, tick: u64 },

    /// A command was applied.
    Ack { cmd: String },

    /// A player action was refused by the game rules.
    Rejected {
        cmd: String,
        reason: String,
        message: String,
    },

    /// Error processing a command (bad JSON, unknown id).
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Current game state.
    State(Box<StateReport>),

    /// Effective stats of a recipe.
    Stats {
        recipe: String,
        stats: EffectiveStats,
    },

    /// State hash for determinism verification.
    StateHash { tick: u64, hash: u64 },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// Snapshot of the economy for controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    /// World ticks elapsed.
    pub tick: u64,
    /// Forge ticks elapsed.
    pub forge_ticks: u64,
    /// Current stage.
    pub stage: u32,
    /// Player level.
    pub player_level: u32,
    /// Current region id.
    pub region: RegionId,
    /// Whole balances.
    pub resources: BTreeMap<ResourceKind, u64>,
    /// Per-second income.
    pub rates: BTreeMap<ResourceKind, f64>,
    /// Hero roster.
    pub heroes: Vec<Hero>,
    /// Discovered recipes.
    pub discovered: Vec<RecipeId>,
    /// Conquered POIs.
    pub conquered: Vec<PoiId>,
    /// Recipe levels.
    pub recipe_levels: BTreeMap<RecipeId, u32>,
    /// Waiting fabrications.
    pub queue: Vec<RecipeId>,
    /// Fabrication in progress.
    pub active: Option<CraftJob>,
    /// Whether an infusion is running.
    pub infusing: bool,
    /// Event log, most recent first.
    pub log: Vec<String>,
    /// Prestige resets performed.
    pub prestige_count: u32,
    /// State hash.
    pub hash: u64,
}

impl StateReport {
    /// Capture the current state of a simulation.
    #[must_use]
    pub fn capture<R>(sim: &Simulation<R>) -> Self {
        let state = sim.state();
        Self {
            tick: state.tick,
            forge_ticks: sim.forge_ticks(),
            stage: state.stage,
            player_level: state.player_level,
            region: state.region.clone(),
            resources: state.resources.to_whole_amounts(),
            rates: sim
                .production_rates()
                .iter()
                .map(|(kind, rate)| (kind, rate.to_num::<f64>()))
                .collect(),
            heroes: state.heroes.clone(),
            discovered: state.discovered.iter().cloned().collect(),
            conquered: state.conquered.iter().cloned().collect(),
            recipe_levels: sim.recipe_levels(),
            queue: state.forge.queue.iter().cloned().collect(),
            active: state.forge.active.clone(),
            infusing: state.infusion.is_pending(),
            log: state.log.messages(),
            prestige_count: state.prestige_count,
            hash: sim.state_hash(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(tick: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create a rejection response.
    pub fn rejected(cmd: &str, reason: &Rejection) -> Self {
        Self::Rejected {
            cmd: cmd.to_string(),
            reason: reason.code().to_string(),
            message: reason.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}
