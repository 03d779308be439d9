//! Resource kinds, the player's resource ledger, and sparse amount maps.
//!
//! The ledger is a total mapping from every [`ResourceKind`] to a
//! fixed-point balance. Balances accumulate fractions from passive
//! production; costs and rewards are always whole numbers.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::math::Fixed;

/// The six resources of the economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    /// Primary currency, produced passively by stage progress.
    Gold,
    /// Crafting metal.
    Iron,
    /// Crafting timber.
    Wood,
    /// Rare volcanic material.
    Obsidian,
    /// Rare material; also the permanent prestige currency.
    Crystal,
    /// Spent to move the bastion between regions.
    Fuel,
}

impl ResourceKind {
    /// Every resource kind, in ledger order.
    pub const ALL: [Self; 6] = [
        Self::Gold,
        Self::Iron,
        Self::Wood,
        Self::Obsidian,
        Self::Crystal,
        Self::Fuel,
    ];

    const fn index(self) -> usize {
        match self {
            Self::Gold => 0,
            Self::Iron => 1,
            Self::Wood => 2,
            Self::Obsidian => 3,
            Self::Crystal => 4,
            Self::Fuel => 5,
        }
    }

    /// Upper-case display name, as used in data files and the protocol.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gold => "GOLD",
            Self::Iron => "IRON",
            Self::Wood => "WOOD",
            Self::Obsidian => "OBSIDIAN",
            Self::Crystal => "CRYSTAL",
            Self::Fuel => "FUEL",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sparse map of whole resource amounts (recipe costs, rewards, starting stock).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceAmounts(BTreeMap<ResourceKind, u32>);

impl ResourceAmounts {
    /// Create an empty amount map.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder: add `amount` of `kind` (summing with any existing entry).
    #[must_use]
    pub fn with(mut self, kind: ResourceKind, amount: u32) -> Self {
        self.add(kind, amount);
        self
    }

    /// Add `amount` of `kind`, summing with any existing entry.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        let entry = self.0.entry(kind).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Amount for `kind` (zero if absent).
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Iterate entries in resource order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        self.0.iter().map(|(kind, amount)| (*kind, *amount))
    }

    /// Whether no resource is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Map every amount through `f`, keeping the same kinds.
    #[must_use]
    pub fn map_amounts(&self, mut f: impl FnMut(u32) -> u32) -> Self {
        Self(self.0.iter().map(|(kind, amount)| (*kind, f(*amount))).collect())
    }
}

impl FromIterator<(ResourceKind, u32)> for ResourceAmounts {
    fn from_iter<T: IntoIterator<Item = (ResourceKind, u32)>>(iter: T) -> Self {
        let mut amounts = Self::new();
        for (kind, amount) in iter {
            amounts.add(kind, amount);
        }
        amounts
    }
}

/// The player's balances for every resource kind.
///
/// Invariant: no balance is ever negative. All spending goes through
/// [`ResourceLedger::try_spend`], which checks every entry before touching any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceLedger {
    balances: [Fixed; 6],
}

impl ResourceLedger {
    /// A ledger with every balance at zero.
    pub const ZERO: Self = Self {
        balances: [Fixed::ZERO; 6],
    };

    /// Build a ledger holding exactly the given whole amounts.
    #[must_use]
    pub fn from_amounts(amounts: &ResourceAmounts) -> Self {
        let mut ledger = Self::ZERO;
        ledger.deposit(amounts);
        ledger
    }

    /// Current balance of `kind`.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> Fixed {
        self.balances[kind.index()]
    }

    /// Balance of `kind` truncated to a whole number (what the player sees).
    #[must_use]
    pub fn whole(&self, kind: ResourceKind) -> u64 {
        self.get(kind).saturating_to_num::<u64>()
    }

    /// Overwrite the balance of `kind`. Negative values are clamped to zero.
    pub fn set(&mut self, kind: ResourceKind, value: Fixed) {
        self.balances[kind.index()] = value.max(Fixed::ZERO);
    }

    /// Add a (non-negative) fractional amount.
    pub fn credit(&mut self, kind: ResourceKind, amount: Fixed) {
        let slot = &mut self.balances[kind.index()];
        *slot = slot.saturating_add(amount.max(Fixed::ZERO));
    }

    /// Add whole amounts for every listed resource.
    pub fn deposit(&mut self, amounts: &ResourceAmounts) {
        for (kind, amount) in amounts.iter() {
            self.credit(kind, Fixed::saturating_from_num(amount));
        }
    }

    /// Add every balance of another ledger.
    pub fn absorb(&mut self, other: &Self) {
        for kind in ResourceKind::ALL {
            self.credit(kind, other.get(kind));
        }
    }

    /// Check if every listed amount is covered.
    #[must_use]
    pub fn can_afford(&self, cost: &ResourceAmounts) -> bool {
        self.shortfall(cost).is_none()
    }

    /// The first resource (in resource order) that cannot be covered, as a rejection.
    #[must_use]
    pub fn shortfall(&self, cost: &ResourceAmounts) -> Option<Rejection> {
        cost.iter().find_map(|(kind, required)| {
            (self.get(kind) < Fixed::saturating_from_num(required)).then(|| {
                Rejection::InsufficientResources {
                    resource: kind,
                    required: u64::from(required),
                    available: self.whole(kind),
                }
            })
        })
    }

    /// Spend `cost` atomically: either every amount is deducted or nothing is.
    pub fn try_spend(&mut self, cost: &ResourceAmounts) -> Result<(), Rejection> {
        if let Some(rejection) = self.shortfall(cost) {
            return Err(rejection);
        }
        for (kind, amount) in cost.iter() {
            let slot = &mut self.balances[kind.index()];
            *slot -= Fixed::saturating_from_num(amount);
        }
        Ok(())
    }

    /// Iterate balances in resource order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, Fixed)> + '_ {
        ResourceKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// Whether every balance is at or above zero.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.balances.iter().all(|b| *b >= Fixed::ZERO)
    }

    /// Whole-number view of every balance.
    #[must_use]
    pub fn to_whole_amounts(&self) -> BTreeMap<ResourceKind, u64> {
        self.iter()
            .map(|(kind, _)| (kind, self.whole(kind)))
            .collect()
    }
}

/// Serialized as a map of resource name to raw fixed-point bits.
impl Serialize for ResourceLedger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter().map(|(kind, value)| (kind, value.to_bits())))
    }
}

impl<'de> Deserialize<'de> for ResourceLedger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<ResourceKind, i64>::deserialize(deserializer)?;
        let mut ledger = Self::ZERO;
        for (kind, bits) in raw {
            ledger.set(kind, Fixed::from_bits(bits));
        }
        Ok(ledger)
    }
}
