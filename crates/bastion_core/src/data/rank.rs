//! The fixed rank ladder shared by heroes and region gates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal tier from `F` (lowest) to `God` (highest).
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Rank {
    /// Entry tier.
    #[default]
    F,
    /// Tier E.
    E,
    /// Tier D.
    D,
    /// Tier C.
    C,
    /// Tier B.
    B,
    /// Tier A.
    A,
    /// Tier S.
    S,
    /// Tier SS.
    SS,
    /// Tier SSS.
    SSS,
    /// Top of the ladder.
    #[serde(rename = "GOD")]
    God,
}

impl Rank {
    /// The whole ladder in ascending order.
    pub const LADDER: [Self; 10] = [
        Self::F,
        Self::E,
        Self::D,
        Self::C,
        Self::B,
        Self::A,
        Self::S,
        Self::SS,
        Self::SSS,
        Self::God,
    ];

    /// Position on the ladder, starting at 0 for `F`.
    #[must_use]
    pub fn position(self) -> usize {
        Self::LADDER
            .iter()
            .position(|r| *r == self)
            .unwrap_or_default()
    }

    /// The next rank up, or `self` at the top of the ladder.
    #[must_use]
    pub fn next(self) -> Self {
        Self::LADDER
            .get(self.position() + 1)
            .copied()
            .unwrap_or(self)
    }

    /// Label as shown to the player.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::F => "F",
            Self::E => "E",
            Self::D => "D",
            Self::C => "C",
            Self::B => "B",
            Self::A => "A",
            Self::S => "S",
            Self::SS => "SS",
            Self::SSS => "SSS",
            Self::God => "GOD",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
