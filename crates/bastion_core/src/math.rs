//! Fixed-point and rational math utilities for deterministic simulation.
//!
//! Resource balances accumulate fractional amounts every tick, so they are
//! stored as fixed-point numbers. Multipliers derived from recipe levels and
//! hero bonuses are exact rationals, which keeps every `floor` in the
//! crafting formulas exact and platform independent.

use std::cmp::Ordering;

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = fixed::types::I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Convert a whole percentage (e.g. `85`) into a fixed-point fraction.
#[must_use]
pub fn percent(value: u32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Draw a uniform value in `[0, 1)` from 32 random bits.
///
/// The low 32 bits of an `I32F32` are its fraction, so a raw `u32` maps
/// directly onto the unit interval without touching floating point.
pub fn roll<R: RngCore + ?Sized>(rng: &mut R) -> Fixed {
    Fixed::from_bits(i64::from(rng.next_u32()))
}

/// An exact non-negative rational multiplier.
///
/// Equality and ordering compare the represented value, so `1/2 == 2/4`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ratio {
    num: u64,
    den: u64,
}

impl Ratio {
    /// The identity multiplier.
    pub const ONE: Self = Self { num: 1, den: 1 };

    /// Create a ratio `num / den`.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    #[must_use]
    pub const fn new(num: u64, den: u64) -> Self {
        assert!(den != 0, "ratio denominator must be non-zero");
        Self { num, den }
    }

    /// Create a ratio from a whole percentage (`90` is `0.9`).
    #[must_use]
    pub const fn percent(value: u64) -> Self {
        Self::new(value, 100)
    }

    /// Numerator as stored.
    #[must_use]
    pub const fn numer(self) -> u64 {
        self.num
    }

    /// Denominator as stored.
    #[must_use]
    pub const fn denom(self) -> u64 {
        self.den
    }

    /// Multiply two ratios.
    #[must_use]
    pub fn mul(self, other: Self) -> Self {
        let num = u128::from(self.num) * u128::from(other.num);
        let den = u128::from(self.den) * u128::from(other.den);
        let g = gcd(num, den);
        Self {
            num: u64::try_from(num / g).unwrap_or(u64::MAX),
            den: u64::try_from(den / g).unwrap_or(u64::MAX),
        }
    }

    /// `floor(amount * self)`, computed exactly.
    #[must_use]
    pub fn mul_floor(self, amount: u64) -> u64 {
        let scaled = u128::from(amount) * u128::from(self.num) / u128::from(self.den);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    /// Scale a fixed-point value by this ratio.
    #[must_use]
    pub fn scale(self, value: Fixed) -> Fixed {
        let num = i64::try_from(self.num).unwrap_or(i64::MAX);
        value.saturating_mul_int(num) / Fixed::saturating_from_num(self.den)
    }

    /// Approximate this ratio as a fixed-point number (for display).
    #[must_use]
    pub fn to_fixed(self) -> Fixed {
        Fixed::saturating_from_num(self.num) / Fixed::saturating_from_num(self.den)
    }
}

impl PartialEq for Ratio {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ratio {}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.num) * u128::from(other.den);
        let rhs = u128::from(other.num) * u128::from(self.den);
        lhs.cmp(&rhs)
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Greatest common divisor, with `gcd(0, 0) == 1` so it is always a safe divisor.
pub(crate) fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

/// `floor(base * (num/den)^exp)` in exact integer math, saturating at `u64::MAX`.
#[must_use]
pub fn geometric_floor(base: u64, growth: Ratio, exp: u32) -> u64 {
    let g = gcd(u128::from(growth.num), u128::from(growth.den));
    let num = u128::from(growth.num) / g;
    let den = u128::from(growth.den) / g;

    let (Some(num_pow), Some(den_pow)) = (num.checked_pow(exp), den.checked_pow(exp)) else {
        return u64::MAX;
    };
    match u128::from(base).checked_mul(num_pow) {
        Some(scaled) => u64::try_from(scaled / den_pow).unwrap_or(u64::MAX),
        None => u64::MAX,
    }
}
