//! Region data structures for data-driven region definitions.

use serde::{Deserialize, Serialize};

use super::ids::RegionId;
use super::rank::Rank;

/// Data-driven region definition.
///
/// # Example RON
///
/// ```ron
/// RegionData(
///     id: "R2",
///     name: "Cobalt Spires",
///     biome: "Canyon",
///     min_rank: D,
///     required_stage: 15,
///     yield_percent: 150,
///     effects: ["+50% Iron Yield", "High Gravity"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionData {
    /// Unique identifier.
    pub id: RegionId,

    /// Display name.
    pub name: String,

    /// Biome label (cosmetic).
    pub biome: String,

    /// Advisory rank recommendation. Not enforced by travel.
    #[serde(default)]
    pub min_rank: Rank,

    /// Stage the player must have reached to travel here.
    pub required_stage: u32,

    /// Gold yield multiplier in percent (`150` is 1.5x).
    pub yield_percent: u32,

    /// Narrative effect tags shown to the player.
    #[serde(default)]
    pub effects: Vec<String>,
}

impl RegionData {
    /// Check whether `stage` satisfies this region's travel gate.
    #[must_use]
    pub const fn is_unlocked_at(&self, stage: u32) -> bool {
        stage >= self.required_stage
    }
}
