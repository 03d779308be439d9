//! Point-of-interest data structures.
//!
//! Conquest state is player progress and lives in the economy state, not
//! here. A POI definition never changes after load.

use serde::{Deserialize, Serialize};

use super::ids::{PoiId, RegionId};
use crate::resources::ResourceKind;

/// Kind of point of interest. Only `Resource` POIs produce anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoiKind {
    /// Permanently yields a resource once conquered.
    Resource,
    /// Narrative quest location (no logic yet).
    Quest,
    /// Dungeon location (no logic yet).
    Dungeon,
}

/// Data-driven point-of-interest definition.
///
/// # Example RON
///
/// ```ron
/// PoiData(
///     id: "P1",
///     region: "R1",
///     name: "Oak Forest",
///     kind: RESOURCE,
///     produces: Some(WOOD),
///     rate_per_hour: Some(120),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiData {
    /// Unique identifier.
    pub id: PoiId,

    /// Region this POI belongs to.
    pub region: RegionId,

    /// Display name.
    pub name: String,

    /// What kind of location this is.
    pub kind: PoiKind,

    /// Resource produced once conquered.
    #[serde(default)]
    pub produces: Option<ResourceKind>,

    /// Whole units produced per hour once conquered.
    #[serde(default)]
    pub rate_per_hour: Option<u32>,
}

impl PoiData {
    /// The resource and hourly rate this POI yields, if it yields anything.
    ///
    /// Non-resource POIs and resource POIs missing either field yield nothing.
    #[must_use]
    pub fn hourly_yield(&self) -> Option<(ResourceKind, u32)> {
        if self.kind != PoiKind::Resource {
            return None;
        }
        Some((self.produces?, self.rate_per_hour.unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poi(kind: PoiKind, produces: Option<ResourceKind>) -> PoiData {
        PoiData {
            id: PoiId::new("PX"),
            region: RegionId::new("R1"),
            name: "Test Site".to_string(),
            kind,
            produces,
            rate_per_hour: Some(60),
        }
    }

    #[test]
    fn test_resource_poi_yields() {
        let p = poi(PoiKind::Resource, Some(ResourceKind::Iron));
        assert_eq!(p.hourly_yield(), Some((ResourceKind::Iron, 60)));
    }

    #[test]
    fn test_non_resource_or_missing_output_yields_nothing() {
        assert_eq!(poi(PoiKind::Quest, Some(ResourceKind::Iron)).hourly_yield(), None);
        assert_eq!(poi(PoiKind::Resource, None).hourly_yield(), None);
    }
}
