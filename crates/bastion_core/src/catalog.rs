//! The static game catalog: regions, POIs, recipes and infusion pairings.
//!
//! The catalog is loaded once and never mutated. Lookups by id come in two
//! flavours: `region`/`poi`/`recipe` return `Option` for callers holding
//! untrusted ids, while the `expect_*` variants panic, because an unknown id
//! reaching an engine is a caller bug.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{
    InfusionData, PoiData, PoiId, PoiKind, Rank, RecipeData, RecipeId, RegionData, RegionId,
};
use crate::error::{GameError, Result};
use crate::resources::{ResourceAmounts, ResourceKind};

/// Registry of all static game data, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Region definitions.
    pub regions: Vec<RegionData>,
    /// Point-of-interest definitions.
    pub pois: Vec<PoiData>,
    /// Recipe definitions.
    pub recipes: Vec<RecipeData>,
    /// Infusion pairings.
    #[serde(default)]
    pub infusions: Vec<InfusionData>,
}

impl Catalog {
    /// The catalog of the base game.
    #[must_use]
    pub fn standard() -> Self {
        use ResourceKind::{Crystal, Fuel, Gold, Iron, Obsidian, Wood};

        let region = |id: &str,
                      name: &str,
                      biome: &str,
                      min_rank: Rank,
                      required_stage: u32,
                      yield_percent: u32,
                      effects: [&str; 2]| RegionData {
            id: RegionId::new(id),
            name: name.to_string(),
            biome: biome.to_string(),
            min_rank,
            required_stage,
            yield_percent,
            effects: effects.iter().map(ToString::to_string).collect(),
        };
        let poi = |id: &str, region: &str, name: &str, produces: ResourceKind, rate: u32| PoiData {
            id: PoiId::new(id),
            region: RegionId::new(region),
            name: name.to_string(),
            kind: PoiKind::Resource,
            produces: Some(produces),
            rate_per_hour: Some(rate),
        };
        let recipe = |id: &str, name: &str, costs: ResourceAmounts, result: &str, secs: u32| {
            RecipeData {
                id: RecipeId::new(id),
                name: name.to_string(),
                costs,
                result: result.to_string(),
                duration_secs: secs,
                completion_reward: ResourceAmounts::new(),
            }
        };
        let costs = |a: (ResourceKind, u32), b: (ResourceKind, u32)| {
            ResourceAmounts::new().with(a.0, a.1).with(b.0, b.1)
        };
        let infusion = |a: ResourceKind, b: ResourceKind, id: &str| InfusionData {
            pair: (a, b),
            recipe: RecipeId::new(id),
        };

        let mut fuel = recipe(
            "RCP3",
            "Bastion Fuel",
            costs((Wood, 50), (Gold, 100)),
            "Fuel x20",
            10,
        );
        fuel.completion_reward = ResourceAmounts::new().with(Fuel, 20);

        Self {
            regions: vec![
                region("R1", "Emerald Plains", "Plains", Rank::F, 1, 100, ["Abundant Wood", "Low Danger"]),
                region("R2", "Cobalt Spires", "Canyon", Rank::D, 15, 150, ["+50% Iron Yield", "High Gravity"]),
                region("R3", "Frozen Peak", "Mountain", Rank::B, 50, 220, ["-20% Attack Speed", "Crystal Deposits"]),
                region("R4", "Scorched Lands", "Volcano", Rank::S, 120, 400, ["DOT Damage: 50/s", "Obsidian Found"]),
            ],
            pois: vec![
                poi("P1", "R1", "Oak Forest", Wood, 120),
                poi("P2", "R1", "Scrap Mine", Iron, 60),
                poi("P3", "R2", "Deep Canyon Mine", Iron, 300),
                poi("P4", "R3", "Crystal Cave", Crystal, 50),
                poi("P5", "R4", "Magma Core", Obsidian, 40),
            ],
            recipes: vec![
                recipe("RCP1", "Iron Sword", costs((Iron, 50), (Wood, 20)), "Iron Sword (+150% DMG)", 5),
                recipe("RCP2", "Ice Armor", costs((Crystal, 10), (Iron, 100)), "Ice Armor (+20% RES)", 15),
                fuel,
                recipe("RCP4", "Dark Plate", costs((Obsidian, 20), (Iron, 200)), "Dark Plate (+40% HP)", 30),
                recipe("RCP5", "Void Core", costs((Obsidian, 50), (Crystal, 50)), "Void Core (+50% ATK Speed)", 60),
            ],
            infusions: vec![
                infusion(Crystal, Iron, "RCP2"),
                infusion(Obsidian, Iron, "RCP4"),
                infusion(Obsidian, Crystal, "RCP5"),
            ],
        }
    }

    /// Parse and validate a catalog from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the text is not a valid
    /// catalog, or [`GameError::InvalidCatalog`] if it is inconsistent.
    pub fn from_ron_str(ron_text: &str) -> Result<Self> {
        Self::parse("<inline>", ron_text)
    }

    /// Load and validate a catalog RON file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the file cannot be read or
    /// parsed, or [`GameError::InvalidCatalog`] if it is inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&path.display().to_string(), &contents)
    }

    fn parse(origin: &str, ron_text: &str) -> Result<Self> {
        let catalog: Self = ron::from_str(ron_text).map_err(|e| GameError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        catalog.validate()?;
        tracing::debug!(
            origin,
            regions = catalog.regions.len(),
            pois = catalog.pois.len(),
            recipes = catalog.recipes.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Check internal consistency: unique ids and resolvable references.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidCatalog`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(GameError::InvalidCatalog("no regions defined".into()));
        }
        check_unique("region", self.regions.iter().map(|r| r.id.as_str()))?;
        check_unique("POI", self.pois.iter().map(|p| p.id.as_str()))?;
        check_unique("recipe", self.recipes.iter().map(|r| r.id.as_str()))?;

        for poi in &self.pois {
            if self.region(poi.region.as_str()).is_none() {
                return Err(GameError::InvalidCatalog(format!(
                    "POI {} references unknown region {}",
                    poi.id, poi.region
                )));
            }
        }
        for infusion in &self.infusions {
            if self.recipe(infusion.recipe.as_str()).is_none() {
                return Err(GameError::InvalidCatalog(format!(
                    "infusion {}+{} references unknown recipe {}",
                    infusion.pair.0, infusion.pair.1, infusion.recipe
                )));
            }
        }
        Ok(())
    }

    /// Look up a region by id.
    #[must_use]
    pub fn region(&self, id: &str) -> Option<&RegionData> {
        self.regions.iter().find(|r| r.id.as_str() == id)
    }

    /// Look up a POI by id.
    #[must_use]
    pub fn poi(&self, id: &str) -> Option<&PoiData> {
        self.pois.iter().find(|p| p.id.as_str() == id)
    }

    /// Look up a recipe by id.
    #[must_use]
    pub fn recipe(&self, id: &str) -> Option<&RecipeData> {
        self.recipes.iter().find(|r| r.id.as_str() == id)
    }

    /// Look up a region that must exist.
    ///
    /// # Panics
    ///
    /// Panics if the id is not in the catalog.
    #[must_use]
    pub fn expect_region(&self, id: &str) -> &RegionData {
        self.region(id)
            .unwrap_or_else(|| panic!("unknown region id: {id}"))
    }

    /// Look up a POI that must exist.
    ///
    /// # Panics
    ///
    /// Panics if the id is not in the catalog.
    #[must_use]
    pub fn expect_poi(&self, id: &str) -> &PoiData {
        self.poi(id).unwrap_or_else(|| panic!("unknown POI id: {id}"))
    }

    /// Look up a recipe that must exist.
    ///
    /// # Panics
    ///
    /// Panics if the id is not in the catalog.
    #[must_use]
    pub fn expect_recipe(&self, id: &str) -> &RecipeData {
        self.recipe(id)
            .unwrap_or_else(|| panic!("unknown recipe id: {id}"))
    }

    /// All POIs belonging to a region, in catalog order.
    pub fn pois_in_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a PoiData> + 'a {
        self.pois.iter().filter(move |p| p.region.as_str() == region)
    }

    /// Recipe revealed by infusing `a` with `b`, in either order.
    #[must_use]
    pub fn infusion_target(&self, a: ResourceKind, b: ResourceKind) -> Option<&RecipeId> {
        self.infusions
            .iter()
            .find(|infusion| infusion.matches(a, b))
            .map(|infusion| &infusion.recipe)
    }
}

fn check_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(GameError::InvalidCatalog(format!("duplicate {kind} id: {id}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = Catalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.regions.len(), 4);
        assert_eq!(catalog.pois.len(), 5);
        assert_eq!(catalog.recipes.len(), 5);
    }

    #[test]
    fn test_bundled_data_file_matches_standard() {
        let text = include_str!("../../../assets/data/catalog.ron");
        let catalog = Catalog::from_ron_str(text).unwrap();
        assert_eq!(catalog, Catalog::standard());
    }

    #[test]
    fn test_lookups() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.expect_region("R2").required_stage, 15);
        assert_eq!(catalog.expect_recipe("RCP3").completion_reward.get(ResourceKind::Fuel), 20);
        assert!(catalog.poi("P9").is_none());

        let r1: Vec<&str> = catalog.pois_in_region("R1").map(|p| p.id.as_str()).collect();
        assert_eq!(r1, vec!["P1", "P2"]);
    }

    #[test]
    fn test_infusion_target_either_order() {
        let catalog = Catalog::standard();
        let forward = catalog.infusion_target(ResourceKind::Crystal, ResourceKind::Iron);
        let backward = catalog.infusion_target(ResourceKind::Iron, ResourceKind::Crystal);
        assert_eq!(forward.map(RecipeId::as_str), Some("RCP2"));
        assert_eq!(forward, backward);
        assert!(catalog
            .infusion_target(ResourceKind::Gold, ResourceKind::Wood)
            .is_none());
    }

    #[test]
    #[should_panic(expected = "unknown recipe id: RCP9")]
    fn test_expect_unknown_recipe_panics() {
        let _ = Catalog::standard().expect_recipe("RCP9");
    }

    #[test]
    fn test_validate_rejects_duplicates_and_dangling_refs() {
        let mut catalog = Catalog::standard();
        catalog.recipes.push(catalog.recipes[0].clone());
        assert!(matches!(catalog.validate(), Err(GameError::InvalidCatalog(_))));

        let mut catalog = Catalog::standard();
        catalog.pois[0].region = RegionId::new("R9");
        assert!(matches!(catalog.validate(), Err(GameError::InvalidCatalog(_))));
    }

    #[test]
    fn test_parse_error_reports_origin() {
        let err = Catalog::from_ron_str("(regions: [").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { ref path, .. } if path == "<inline>"));
    }
}
