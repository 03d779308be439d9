//! Heroes, their professions, and level progression.
//!
//! Heroes do not fight yet. Their professions feed the economy: every
//! Blacksmith shortens fabrication and every Miner raises POI output.

use serde::{Deserialize, Serialize};

use crate::data::{HeroId, Rank};
use crate::math::{fixed_serde, Fixed, Ratio};
use crate::rules::{is_multiple, Rules};
use crate::state::EconomyState;

/// Combat role (cosmetic for now).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Frontline.
    Tank,
    /// Damage dealer.
    Dps,
    /// Healer / buffer.
    Support,
}

/// Profession granting a passive economy bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Profession {
    /// Faster fabrication.
    Blacksmith,
    /// No bonus yet.
    Alchemist,
    /// Higher POI yield.
    Miner,
    /// No bonus yet.
    Scout,
}

/// A hero in the player's roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hero {
    /// Roster identifier.
    pub id: HeroId,
    /// Display name.
    pub name: String,
    /// Level, starting at 1.
    pub level: u32,
    /// Current rank on the ladder.
    pub rank: Rank,
    /// Hit points.
    pub hp: u32,
    /// Attack.
    pub atk: u32,
    /// Attack speed.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Combat role.
    pub role: Role,
    /// Optional profession.
    #[serde(default)]
    pub profession: Option<Profession>,
}

impl Hero {
    /// The hero every new game starts with.
    #[must_use]
    pub fn thorin() -> Self {
        Self {
            id: HeroId::new("h1"),
            name: "Thorin".to_string(),
            level: 1,
            rank: Rank::F,
            hp: 100,
            atk: 15,
            speed: Fixed::ONE,
            role: Role::Tank,
            profession: Some(Profession::Blacksmith),
        }
    }

    /// Raise this hero one level.
    ///
    /// Returns the new rank if the level-up also promoted the hero.
    pub fn level_up(&mut self, rules: &Rules) -> Option<Rank> {
        self.level = self.level.saturating_add(1);
        self.hp = self.hp.saturating_add(rules.level_up_hp);
        self.atk = self.atk.saturating_add(rules.level_up_atk);

        if is_multiple(self.level, rules.rank_up_level_interval) {
            let next = self.rank.next();
            if next != self.rank {
                self.rank = next;
                return Some(next);
            }
        }
        None
    }
}

/// Result of [`level_up_hero`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroLevelUp {
    /// Level after the upgrade.
    pub level: u32,
    /// New rank, if the hero was promoted.
    pub promoted_to: Option<Rank>,
}

/// Level up a hero in the roster. No cost is charged.
///
/// # Panics
///
/// Panics if no hero with `id` is in the roster.
pub fn level_up_hero(state: &mut EconomyState, rules: &Rules, id: &HeroId) -> HeroLevelUp {
    let hero = state
        .heroes
        .iter_mut()
        .find(|h| &h.id == id)
        .unwrap_or_else(|| panic!("unknown hero id: {id}"));
    let promoted_to = hero.level_up(rules);
    tracing::info!(hero = %hero.id, level = hero.level, rank = %hero.rank, "Hero levelled up");
    HeroLevelUp {
        level: hero.level,
        promoted_to,
    }
}

fn count(heroes: &[Hero], profession: Profession) -> u64 {
    heroes
        .iter()
        .filter(|h| h.profession == Some(profession))
        .count() as u64
}

/// Duration factor from Blacksmiths: `1 / (1 + bonus × count)`.
#[must_use]
pub fn craft_speed_multiplier(heroes: &[Hero], rules: &Rules) -> Ratio {
    let bonus = u64::from(rules.blacksmith_speed_percent) * count(heroes, Profession::Blacksmith);
    Ratio::new(100, 100 + bonus)
}

/// POI output factor from Miners: `1 + bonus × count`.
#[must_use]
pub fn yield_multiplier(heroes: &[Hero], rules: &Rules) -> Ratio {
    let bonus = u64::from(rules.miner_yield_percent) * count(heroes, Profession::Miner);
    Ratio::new(100 + bonus, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miner() -> Hero {
        Hero {
            id: HeroId::new("h2"),
            name: "Brokk".to_string(),
            profession: Some(Profession::Miner),
            role: Role::Dps,
            ..Hero::thorin()
        }
    }

    #[test]
    fn test_level_up_grows_stats() {
        let rules = Rules::default();
        let mut hero = Hero::thorin();
        assert_eq!(hero.level_up(&rules), None);
        assert_eq!(hero.level, 2);
        assert_eq!(hero.hp, 110);
        assert_eq!(hero.atk, 17);
        assert_eq!(hero.rank, Rank::F);
    }

    #[test]
    fn test_rank_advances_when_new_level_is_multiple_of_ten() {
        let rules = Rules::default();
        let mut hero = Hero::thorin();
        for _ in 0..8 {
            hero.level_up(&rules);
        }
        assert_eq!(hero.level, 9);
        assert_eq!(hero.rank, Rank::F);

        assert_eq!(hero.level_up(&rules), Some(Rank::E));
        assert_eq!(hero.level, 10);
    }

    #[test]
    fn test_rank_stops_at_top_of_ladder() {
        let rules = Rules::default();
        let mut hero = Hero {
            level: 9,
            rank: Rank::God,
            ..Hero::thorin()
        };
        assert_eq!(hero.level_up(&rules), None);
        assert_eq!(hero.rank, Rank::God);
    }

    #[test]
    fn test_profession_multipliers() {
        let rules = Rules::default();
        let roster = vec![Hero::thorin(), miner(), miner()];
        assert_eq!(craft_speed_multiplier(&roster, &rules), Ratio::new(10, 11));
        assert_eq!(yield_multiplier(&roster, &rules), Ratio::percent(130));
        assert_eq!(craft_speed_multiplier(&[], &rules), Ratio::ONE);
    }
}
