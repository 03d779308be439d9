//! Tunable numbers of the economy.
//!
//! Every constant the engines consult lives here so scenarios can override
//! them from RON. Percentages are whole integers (`85` means 85%).

use serde::{Deserialize, Serialize};

use crate::math::{percent, Fixed, Ratio};

/// Economy rules.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// scenario only needs to list what it changes:
///
/// ```ron
/// (queue_limit: 3, travel_fuel_cost: 10)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Maximum number of waiting fabrication entries.
    pub queue_limit: usize,
    /// Amount of each chosen resource consumed by an infusion.
    pub infusion_cost: u32,
    /// World ticks between starting and resolving an infusion.
    pub infusion_delay_ticks: u64,
    /// Fuel consumed by a region jump.
    pub travel_fuel_cost: u32,
    /// Lowest stage at which prestige is allowed.
    pub prestige_min_stage: u32,
    /// Stages per crystal awarded by prestige.
    pub prestige_stage_divisor: u32,
    /// Number of entries the event log keeps.
    pub event_log_capacity: usize,
    /// Gold per second per stage, in percent.
    pub gold_per_stage_percent: u32,
    /// A stage advances when a roll exceeds this percentage.
    pub stage_advance_threshold_percent: u32,
    /// After an advance, a blueprint is found when a second roll exceeds this.
    pub discovery_threshold_percent: u32,
    /// Player level rises on every stage that is a multiple of this.
    pub level_up_stage_interval: u32,
    /// Stages that are multiples of this are written to the event log.
    pub milestone_stage_interval: u32,
    /// Hero rank rises on every level that is a multiple of this.
    pub rank_up_level_interval: u32,
    /// Hit points gained per hero level.
    pub level_up_hp: u32,
    /// Attack gained per hero level.
    pub level_up_atk: u32,
    /// Craft speed bonus per Blacksmith, in percent.
    pub blacksmith_speed_percent: u32,
    /// Resource yield bonus per Miner, in percent.
    pub miner_yield_percent: u32,
    /// Cost discount per recipe level above 1, in percent.
    pub cost_step_percent: u32,
    /// Smallest cost multiplier, in percent.
    pub cost_floor_percent: u32,
    /// Duration reduction per recipe level above 1, in percent.
    pub duration_step_percent: u32,
    /// Smallest duration multiplier, in percent.
    pub duration_floor_percent: u32,
    /// Gold cost of the first recipe upgrade.
    pub upgrade_base_gold: u64,
    /// Growth of the upgrade cost per level, in percent.
    pub upgrade_growth_percent: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            queue_limit: 5,
            infusion_cost: 50,
            infusion_delay_ticks: 2,
            travel_fuel_cost: 25,
            prestige_min_stage: 20,
            prestige_stage_divisor: 10,
            event_log_capacity: 10,
            gold_per_stage_percent: 50,
            stage_advance_threshold_percent: 85,
            discovery_threshold_percent: 95,
            level_up_stage_interval: 5,
            milestone_stage_interval: 10,
            rank_up_level_interval: 10,
            level_up_hp: 10,
            level_up_atk: 2,
            blacksmith_speed_percent: 10,
            miner_yield_percent: 15,
            cost_step_percent: 5,
            cost_floor_percent: 50,
            duration_step_percent: 10,
            duration_floor_percent: 20,
            upgrade_base_gold: 1000,
            upgrade_growth_percent: 150,
        }
    }
}

impl Rules {
    /// Roll threshold for a stage advance.
    #[must_use]
    pub fn stage_advance_threshold(&self) -> Fixed {
        percent(self.stage_advance_threshold_percent)
    }

    /// Roll threshold for blueprint discovery.
    #[must_use]
    pub fn discovery_threshold(&self) -> Fixed {
        percent(self.discovery_threshold_percent)
    }

    /// Growth factor between consecutive upgrade costs.
    #[must_use]
    pub fn upgrade_growth(&self) -> Ratio {
        Ratio::percent(u64::from(self.upgrade_growth_percent))
    }
}

/// `true` when `value` is a positive multiple of `interval` (never for a zero interval).
#[must_use]
pub(crate) const fn is_multiple(value: u32, interval: u32) -> bool {
    interval != 0 && value != 0 && value % interval == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let rules: Rules = ron::from_str("(queue_limit: 3, travel_fuel_cost: 10)").unwrap();
        assert_eq!(rules.queue_limit, 3);
        assert_eq!(rules.travel_fuel_cost, 10);
        assert_eq!(rules.infusion_cost, 50);
        assert_eq!(rules.prestige_min_stage, 20);
    }

    #[test]
    fn test_is_multiple() {
        assert!(is_multiple(10, 5));
        assert!(!is_multiple(11, 5));
        assert!(!is_multiple(0, 5));
        assert!(!is_multiple(10, 0));
    }
}
