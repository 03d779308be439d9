//! Infusion pairings: which two resources reveal which recipe.

use serde::{Deserialize, Serialize};

use super::ids::RecipeId;
use crate::resources::ResourceKind;

/// One infusion pairing. The pair is unordered.
///
/// # Example RON
///
/// ```ron
/// InfusionData(pair: (CRYSTAL, IRON), recipe: "RCP2")
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfusionData {
    /// The two resources to combine, in any order.
    pub pair: (ResourceKind, ResourceKind),

    /// Recipe revealed by this pairing.
    pub recipe: RecipeId,
}

impl InfusionData {
    /// Check whether `a` and `b` (in either order) match this pairing.
    #[must_use]
    pub fn matches(&self, a: ResourceKind, b: ResourceKind) -> bool {
        (self.pair.0 == a && self.pair.1 == b) || (self.pair.0 == b && self.pair.1 == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_is_order_insensitive() {
        let pairing = InfusionData {
            pair: (ResourceKind::Crystal, ResourceKind::Iron),
            recipe: RecipeId::new("RCP2"),
        };
        assert!(pairing.matches(ResourceKind::Crystal, ResourceKind::Iron));
        assert!(pairing.matches(ResourceKind::Iron, ResourceKind::Crystal));
        assert!(!pairing.matches(ResourceKind::Iron, ResourceKind::Iron));
    }
}
