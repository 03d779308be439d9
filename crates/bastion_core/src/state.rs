//! The economy aggregate and its event log.
//!
//! [`EconomyState`] is the single source of truth for player progress. The
//! engines mutate it through `&mut` borrows, so two mutations can never
//! interleave.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crafting::Forge;
use crate::data::{PoiId, RecipeId, RegionId};
use crate::discovery::InfusionState;
use crate::heroes::Hero;
use crate::resources::{ResourceAmounts, ResourceKind, ResourceLedger};

/// Initial values for a new game (and the reset target of prestige).
///
/// ```ron
/// (
///     resources: { GOLD: 500, IRON: 50, WOOD: 50, FUEL: 100 },
///     stage: 1,
///     player_level: 1,
///     region: "R1",
///     discovered: ["RCP1", "RCP3"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingState {
    /// Starting balances; unlisted resources start at zero.
    pub resources: ResourceAmounts,
    /// Starting stage.
    pub stage: u32,
    /// Starting player level.
    pub player_level: u32,
    /// Starting region.
    pub region: RegionId,
    /// Recipes known from the start.
    pub discovered: Vec<RecipeId>,
    /// Starting roster.
    pub heroes: Vec<Hero>,
}

impl Default for StartingState {
    fn default() -> Self {
        Self {
            resources: ResourceAmounts::new()
                .with(ResourceKind::Gold, 500)
                .with(ResourceKind::Iron, 50)
                .with(ResourceKind::Wood, 50)
                .with(ResourceKind::Obsidian, 0)
                .with(ResourceKind::Crystal, 0)
                .with(ResourceKind::Fuel, 100),
            stage: 1,
            player_level: 1,
            region: RegionId::new("R1"),
            discovered: vec![RecipeId::new("RCP1"), RecipeId::new("RCP3")],
            heroes: vec![Hero::thorin()],
        }
    }
}

/// A player-visible game event.
///
/// `Display` renders the message shown in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEvent {
    /// A new game started.
    SystemOnline,
    /// A stage milestone was reached.
    StageReached {
        /// The stage reached.
        stage: u32,
    },
    /// A blueprint was found during stage progression.
    BlueprintRecovered {
        /// Recipe discovered.
        recipe: RecipeId,
        /// Recipe display name.
        name: String,
    },
    /// A fabrication was queued.
    CraftScheduled {
        /// Recipe queued.
        recipe: RecipeId,
        /// Recipe display name.
        name: String,
    },
    /// A fabrication finished.
    CraftCompleted {
        /// Recipe completed.
        recipe: RecipeId,
        /// Description of the produced item.
        result: String,
    },
    /// An infusion revealed a recipe.
    InfusionDiscovered {
        /// Recipe discovered.
        recipe: RecipeId,
        /// Recipe display name.
        name: String,
    },
    /// An infusion revealed nothing new.
    InfusionFailed,
    /// The bastion moved to another region.
    Travelled {
        /// Destination.
        region: RegionId,
        /// Destination display name.
        name: String,
    },
    /// A POI was conquered.
    PoiConquered {
        /// POI conquered.
        poi: PoiId,
    },
    /// The player prestiged.
    Ascended {
        /// Crystal awarded.
        crystal_gain: u64,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemOnline => f.write_str("Neural link established. System online."),
            Self::StageReached { stage } => write!(f, "Reached Stage {stage}"),
            Self::BlueprintRecovered { name, .. } => write!(f, "NEW BLUEPRINT: {name} recovered."),
            Self::CraftScheduled { name, .. } => write!(f, "Queue: {name} fabrication scheduled."),
            Self::CraftCompleted { result, .. } => write!(f, "FORGE COMPLETE: {result}"),
            Self::InfusionDiscovered { name, .. } => {
                write!(f, "DISCOVERY: {name} blueprint recovered.")
            }
            Self::InfusionFailed => f.write_str("Infusion unstable. No new pattern detected."),
            Self::Travelled { name, .. } => write!(f, "Bastion jumped to sector: {name}."),
            Self::PoiConquered { .. } => {
                f.write_str("POI Conquered: Automated resource extraction active.")
            }
            Self::Ascended { crystal_gain } => {
                write!(f, "ASCENSION: Timeline reset. +{crystal_gain} Crystal banked.")
            }
        }
    }
}

/// An event stamped with the world tick it happened on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEntry {
    /// World tick of the event.
    pub tick: u64,
    /// What happened.
    pub event: GameEvent,
}

/// Bounded event log, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventLog {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl EventLog {
    /// Create an empty log keeping at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Prepend an entry, dropping the oldest past capacity.
    pub fn push(&mut self, tick: u64, event: GameEvent) {
        tracing::debug!(tick, message = %event, "Event logged");
        self.entries.push_front(LogEntry { tick, event });
        self.entries.truncate(self.capacity);
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Rendered messages, most recent first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.event.to_string()).collect()
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// All mutable player-owned facts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EconomyState {
    /// World ticks elapsed.
    pub tick: u64,
    /// Resource balances.
    pub resources: ResourceLedger,
    /// Current stage (at least 1).
    pub stage: u32,
    /// Player level (at least 1).
    pub player_level: u32,
    /// Region the bastion is stationed in.
    pub region: RegionId,
    /// Conquered POIs.
    pub conquered: BTreeSet<PoiId>,
    /// Recipes available for fabrication.
    pub discovered: BTreeSet<RecipeId>,
    /// Upgrade level per recipe. Absent means level 1.
    pub recipe_levels: BTreeMap<RecipeId, u32>,
    /// Hero roster, in recruitment order.
    pub heroes: Vec<Hero>,
    /// Fabrication queue and active job.
    pub forge: Forge,
    /// Pending infusion, if any.
    pub infusion: InfusionState,
    /// Recent events.
    pub log: EventLog,
    /// Number of prestige resets performed.
    pub prestige_count: u32,
    /// Crystal earned through prestige over the whole game.
    pub crystal_earned: u64,
}

impl EconomyState {
    /// Build the state of a fresh game.
    #[must_use]
    pub fn new(start: &StartingState, log_capacity: usize) -> Self {
        let mut log = EventLog::new(log_capacity);
        log.push(0, GameEvent::SystemOnline);
        Self {
            tick: 0,
            resources: ResourceLedger::from_amounts(&start.resources),
            stage: start.stage.max(1),
            player_level: start.player_level.max(1),
            region: start.region.clone(),
            conquered: BTreeSet::new(),
            discovered: start.discovered.iter().cloned().collect(),
            recipe_levels: BTreeMap::new(),
            heroes: start.heroes.clone(),
            forge: Forge::default(),
            infusion: InfusionState::Idle,
            log,
            prestige_count: 0,
            crystal_earned: 0,
        }
    }

    /// Append an event stamped with the current world tick.
    pub fn record(&mut self, event: GameEvent) {
        self.log.push(self.tick, event);
    }

    /// Upgrade level of a recipe (1 if never upgraded).
    #[must_use]
    pub fn recipe_level(&self, id: &str) -> u32 {
        self.recipe_levels.get(id).copied().unwrap_or(1)
    }

    /// Whether a recipe has been discovered.
    #[must_use]
    pub fn is_discovered(&self, id: &str) -> bool {
        self.discovered.contains(id)
    }

    /// Whether a POI has been conquered.
    #[must_use]
    pub fn is_conquered(&self, id: &str) -> bool {
        self.conquered.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    #[test]
    fn test_new_game_defaults() {
        let state = EconomyState::new(&StartingState::default(), 10);
        assert_eq!(state.resources.whole(ResourceKind::Gold), 500);
        assert_eq!(state.resources.whole(ResourceKind::Fuel), 100);
        assert_eq!(state.resources.get(ResourceKind::Crystal), Fixed::ZERO);
        assert_eq!(state.stage, 1);
        assert_eq!(state.region.as_str(), "R1");
        assert!(state.is_discovered("RCP1"));
        assert!(state.is_discovered("RCP3"));
        assert!(!state.is_discovered("RCP2"));
        assert_eq!(state.recipe_level("RCP1"), 1);
        assert_eq!(state.heroes.len(), 1);
        assert_eq!(
            state.log.messages(),
            vec!["Neural link established. System online.".to_string()]
        );
    }

    #[test]
    fn test_log_is_bounded_and_most_recent_first() {
        let mut log = EventLog::new(10);
        for stage in 1..=12 {
            log.push(u64::from(stage), GameEvent::StageReached { stage });
        }
        assert_eq!(log.len(), 10);
        assert_eq!(log.latest().map(|e| e.tick), Some(12));
        assert_eq!(log.iter().last().map(|e| e.tick), Some(3));
    }

    #[test]
    fn test_event_messages() {
        let event = GameEvent::CraftCompleted {
            recipe: RecipeId::new("RCP3"),
            result: "Fuel x20".to_string(),
        };
        assert_eq!(event.to_string(), "FORGE COMPLETE: Fuel x20");
        assert_eq!(
            GameEvent::Travelled {
                region: RegionId::new("R2"),
                name: "Cobalt Spires".to_string(),
            }
            .to_string(),
            "Bastion jumped to sector: Cobalt Spires."
        );
    }
}
