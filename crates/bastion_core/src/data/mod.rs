//! Data structures for the static game catalog.
//!
//! This module contains pure data structures that define regions, points
//! of interest, recipes, infusion pairings and the rank ladder. All structs
//! are designed to be deserialized from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading lives in [`crate::catalog`].

mod ids;
mod infusion_data;
mod poi_data;
mod rank;
mod recipe_data;
mod region_data;

pub use ids::{HeroId, PoiId, RecipeId, RegionId};
pub use infusion_data::InfusionData;
pub use poi_data::{PoiData, PoiKind};
pub use rank::Rank;
pub use recipe_data::RecipeData;
pub use region_data::RegionData;
