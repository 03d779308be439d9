//! Recipe data structures for the fabrication forge.

use serde::{Deserialize, Serialize};

use super::ids::RecipeId;
use crate::resources::ResourceAmounts;

/// Data-driven recipe definition.
///
/// Player progress over a recipe (discovered or not, upgrade level) is
/// tracked by the economy state; this definition never changes.
///
/// # Example RON
///
/// ```ron
/// RecipeData(
///     id: "RCP3",
///     name: "Bastion Fuel",
///     costs: { WOOD: 50, GOLD: 100 },
///     result: "Fuel x20",
///     duration_secs: 10,
///     completion_reward: { FUEL: 20 },
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeData {
    /// Unique identifier.
    pub id: RecipeId,

    /// Display name.
    pub name: String,

    /// Base cost at recipe level 1.
    pub costs: ResourceAmounts,

    /// Description of the fabricated item.
    pub result: String,

    /// Base fabrication time in seconds at level 1.
    pub duration_secs: u32,

    /// Resources credited when a fabrication of this recipe completes.
    #[serde(default)]
    pub completion_reward: ResourceAmounts,
}
