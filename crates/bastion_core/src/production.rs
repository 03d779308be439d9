//! Passive production: gold from stage progress and output of conquered POIs.
//!
//! Rates are derived from the current state on every call, so there is no
//! cached income to fall out of sync after travel, conquest or recruitment.

use crate::catalog::Catalog;
use crate::heroes::yield_multiplier;
use crate::math::{Fixed, Ratio};
use crate::resources::{ResourceKind, ResourceLedger};
use crate::rules::Rules;
use crate::state::EconomyState;

const SECONDS_PER_HOUR: u64 = 3600;

/// Per-second income for every resource, as a ledger of rates.
///
/// Gold is `stage × 0.5 × region multiplier`. Each conquered resource POI
/// adds `rate_per_hour / 3600 × (1 + 0.15 × miners)` of its resource. POIs
/// without a produced resource are skipped.
///
/// # Panics
///
/// Panics if the current region or a conquered POI is not in the catalog.
#[must_use]
pub fn production_rates(state: &EconomyState, catalog: &Catalog, rules: &Rules) -> ResourceLedger {
    income(state, catalog, rules, 1)
}

/// Credit `elapsed_secs` seconds of passive income. Never fails.
///
/// # Panics
///
/// Panics if the current region or a conquered POI is not in the catalog.
pub fn apply_passive_tick(
    state: &mut EconomyState,
    catalog: &Catalog,
    rules: &Rules,
    elapsed_secs: u32,
) {
    let earned = income(state, catalog, rules, elapsed_secs);
    state.resources.absorb(&earned);
}

/// Income over `elapsed_secs`, each amount rounded once from an exact rational.
fn income(
    state: &EconomyState,
    catalog: &Catalog,
    rules: &Rules,
    elapsed_secs: u32,
) -> ResourceLedger {
    let mut earned = ResourceLedger::ZERO;
    let elapsed = u64::from(elapsed_secs);

    let region = catalog.expect_region(state.region.as_str());
    let gold = Ratio::percent(u64::from(rules.gold_per_stage_percent))
        .mul(Ratio::percent(u64::from(region.yield_percent)))
        .mul(Ratio::new(u64::from(state.stage) * elapsed, 1));
    earned.credit(ResourceKind::Gold, gold.to_fixed());

    let poi_yield = yield_multiplier(&state.heroes, rules);
    for id in &state.conquered {
        let poi = catalog.expect_poi(id.as_str());
        let Some((kind, per_hour)) = poi.hourly_yield() else {
            continue;
        };
        let amount = Ratio::new(u64::from(per_hour) * elapsed, SECONDS_PER_HOUR).mul(poi_yield);
        earned.credit(kind, amount.to_fixed());
    }

    earned
}
