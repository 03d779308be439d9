//! Region travel and POI conquest.

use crate::catalog::Catalog;
use crate::error::Rejection;
use crate::resources::{ResourceAmounts, ResourceKind};
use crate::rules::Rules;
use crate::state::{EconomyState, GameEvent};

/// Move the bastion to another region for a fixed fuel cost.
///
/// # Errors
///
/// Checked in order: [`Rejection::AlreadyInRegion`],
/// [`Rejection::InsufficientResources`] for fuel, then
/// [`Rejection::GateNotMet`] if the stage is below the region's requirement.
///
/// # Panics
///
/// Panics if the region is not in the catalog.
pub fn travel(
    state: &mut EconomyState,
    catalog: &Catalog,
    rules: &Rules,
    region: &str,
) -> Result<(), Rejection> {
    let target = catalog.expect_region(region);
    if state.region == target.id {
        return Err(Rejection::AlreadyInRegion);
    }

    let fare = ResourceAmounts::new().with(ResourceKind::Fuel, rules.travel_fuel_cost);
    if let Some(short) = state.resources.shortfall(&fare) {
        return Err(short);
    }
    if !target.is_unlocked_at(state.stage) {
        return Err(Rejection::GateNotMet {
            required_stage: target.required_stage,
            stage: state.stage,
        });
    }

    state.resources.try_spend(&fare)?;
    state.region = target.id.clone();
    state.record(GameEvent::Travelled {
        region: target.id.clone(),
        name: target.name.clone(),
    });
    tracing::info!(region, stage = state.stage, "Bastion jumped");
    Ok(())
}

/// Conquer a POI. Free and idempotent.
///
/// Returns `true` the first time; repeat calls change nothing and log nothing.
///
/// # Panics
///
/// Panics if the POI is not in the catalog.
pub fn conquer(state: &mut EconomyState, catalog: &Catalog, poi: &str) -> bool {
    let data = catalog.expect_poi(poi);
    if !state.conquered.insert(data.id.clone()) {
        return false;
    }
    state.record(GameEvent::PoiConquered {
        poi: data.id.clone(),
    });
    tracing::info!(poi, region = %data.region, "POI conquered");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;
    use crate::state::StartingState;

    fn setup() -> (EconomyState, Catalog, Rules) {
        let rules = Rules::default();
        (
            EconomyState::new(&StartingState::default(), rules.event_log_capacity),
            Catalog::standard(),
            rules,
        )
    }

    #[test]
    fn test_travel_gate_then_success() {
        let (mut state, catalog, rules) = setup();
        state.stage = 10;
        state.resources.set(ResourceKind::Fuel, Fixed::from_num(25));
        let before = state.clone();
        assert_eq!(
            travel(&mut state, &catalog, &rules, "R2"),
            Err(Rejection::GateNotMet {
                required_stage: 15,
                stage: 10,
            })
        );
        assert_eq!(state, before);

        state.stage = 15;
        assert_eq!(travel(&mut state, &catalog, &rules, "R2"), Ok(()));
        assert_eq!(state.resources.get(ResourceKind::Fuel), Fixed::ZERO);
        assert_eq!(state.region.as_str(), "R2");
        assert_eq!(
            state.log.messages()[0],
            "Bastion jumped to sector: Cobalt Spires."
        );
    }

    #[test]
    fn test_travel_needs_fuel_and_a_new_region() {
        let (mut state, catalog, rules) = setup();
        assert_eq!(
            travel(&mut state, &catalog, &rules, "R1"),
            Err(Rejection::AlreadyInRegion)
        );
        state.stage = 200;
        state.resources.set(ResourceKind::Fuel, Fixed::from_num(24));
        assert!(matches!(
            travel(&mut state, &catalog, &rules, "R4"),
            Err(Rejection::InsufficientResources {
                resource: ResourceKind::Fuel,
                required: 25,
                available: 24,
            })
        ));
    }

    #[test]
    fn test_conquest_is_idempotent() {
        let (mut state, catalog, _) = setup();
        assert!(conquer(&mut state, &catalog, "P1"));
        let after_first = state.clone();
        assert!(!conquer(&mut state, &catalog, "P1"));
        assert_eq!(state, after_first);
        assert_eq!(state.conquered.len(), 1);
    }
}
