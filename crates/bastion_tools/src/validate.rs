//! Data validation utilities.
//!
//! Every `.ron` file under a data directory is loaded as a [`Catalog`],
//! which already rejects duplicate ids and dangling references. On top of
//! that, the catalog is linted for data that loads but can never matter in
//! play; those findings are warnings, not errors.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use bastion_core::catalog::Catalog;
use bastion_core::data::PoiKind;
use bastion_core::error::{GameError, Result};

/// Findings for one data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// File checked.
    pub path: PathBuf,
    /// Lint findings; empty when the file is clean.
    pub warnings: Vec<String>,
}

/// Validate all RON data files in a directory, or a single file.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or any data file fails
/// to load as a consistent catalog.
pub fn validate_data_directory(path: &Path) -> Result<Vec<FileReport>> {
    let files = if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)
            .map_err(|e| GameError::DataParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    files
        .into_iter()
        .map(|file| {
            let catalog = Catalog::load(&file)?;
            let warnings = lint_catalog(&catalog);
            for warning in &warnings {
                tracing::warn!(file = %file.display(), "{warning}");
            }
            tracing::debug!(file = %file.display(), warnings = warnings.len(), "Checked catalog");
            Ok(FileReport {
                path: file,
                warnings,
            })
        })
        .collect()
}

/// Lint a structurally valid catalog.
#[must_use]
pub fn lint_catalog(catalog: &Catalog) -> Vec<String> {
    let mut warnings = Vec::new();

    for pair in catalog.regions.windows(2) {
        if pair[1].required_stage < pair[0].required_stage {
            warnings.push(format!(
                "region {} (stage {}) is listed after {} (stage {})",
                pair[1].id, pair[1].required_stage, pair[0].id, pair[0].required_stage
            ));
        }
    }
    for region in &catalog.regions {
        if catalog.pois_in_region(region.id.as_str()).next().is_none() {
            warnings.push(format!("region {} has no POIs", region.id));
        }
    }

    for poi in &catalog.pois {
        match (poi.kind, poi.hourly_yield()) {
            (PoiKind::Resource, None) => {
                warnings.push(format!("resource POI {} produces nothing", poi.id));
            }
            (PoiKind::Resource, Some((_, 0))) => {
                warnings.push(format!("resource POI {} has a zero rate", poi.id));
            }
            (PoiKind::Quest | PoiKind::Dungeon, _) if poi.produces.is_some() => {
                warnings.push(format!("POI {} is not a resource POI; its yield is ignored", poi.id));
            }
            _ => {}
        }
    }

    for recipe in &catalog.recipes {
        if recipe.costs.is_empty() {
            warnings.push(format!("recipe {} costs nothing", recipe.id));
        }
        if recipe.duration_secs == 0 {
            warnings.push(format!("recipe {} has zero duration", recipe.id));
        }
    }

    let mut pairs = BTreeSet::new();
    for infusion in &catalog.infusions {
        let (a, b) = infusion.pair;
        if a == b {
            warnings.push(format!(
                "infusion {a}+{b} can never be selected (identical resources)"
            ));
        }
        if !pairs.insert((a.min(b), a.max(b))) {
            warnings.push(format!(
                "infusion {a}+{b} repeats an earlier pairing; only the first applies"
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::data::{InfusionData, RecipeId};
    use bastion_core::resources::ResourceKind;

    #[test]
    fn test_standard_catalog_is_clean() {
        assert!(lint_catalog(&Catalog::standard()).is_empty());
    }

    #[test]
    fn test_shipped_data_directory() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data");
        let reports = validate_data_directory(&dir).unwrap();
        assert!(!reports.is_empty());
        assert!(reports.iter().all(|r| r.warnings.is_empty()));
    }

    #[test]
    fn test_duplicate_and_identical_infusions_warn() {
        let mut catalog = Catalog::standard();
        catalog.infusions.push(InfusionData {
            pair: (ResourceKind::Iron, ResourceKind::Crystal),
            recipe: RecipeId::new("RCP5"),
        });
        catalog.infusions.push(InfusionData {
            pair: (ResourceKind::Gold, ResourceKind::Gold),
            recipe: RecipeId::new("RCP5"),
        });
        let warnings = lint_catalog(&catalog);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("repeats"));
        assert!(warnings[1].contains("identical"));
    }

    #[test]
    fn test_region_without_pois_warns() {
        let mut catalog = Catalog::standard();
        catalog.pois.retain(|poi| poi.region.as_str() != "R4");
        assert_eq!(lint_catalog(&catalog), vec!["region R4 has no POIs".to_string()]);
    }

    #[test]
    fn test_broken_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.ron"), "(regions: [])").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        assert!(matches!(
            validate_data_directory(dir.path()),
            Err(GameError::DataParseError { .. } | GameError::InvalidCatalog(_))
        ));
    }
}
