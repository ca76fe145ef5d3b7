//! Percentages and the rounding rules applied to them.
//!
//! Rounding is half-up (commercial) and only ever happens when a
//! percentage is applied to, or removed from, an amount.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A percentage expressed in points, so `Percent::new(dec!(21))` is 21%.
///
/// Serialized as a string with a trailing `%` (e.g. `"21%"`); a plain
/// number string is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(points: Decimal) -> Self {
        Self(points)
    }

    /// The value in percentage points.
    pub fn points(&self) -> Decimal {
        self.0
    }

    /// The value as a fraction of one (21% → 0.21).
    pub fn factor(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// The percentage of `amount`, rounded to the amount's own precision.
    /// `None` if the product overflows.
    pub fn of(&self, amount: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(self.factor())
            .map(|v| round_half_up(v, amount.scale()))
    }

    /// Remove this percentage from an amount that already includes it,
    /// rounded to the amount's own precision.
    pub fn remove_from(&self, amount: Decimal) -> Option<Decimal> {
        self.remove_from_at(amount, amount.scale())
    }

    /// Remove this percentage from an amount that already includes it,
    /// rounded to `dp` decimal places.
    pub fn remove_from_at(&self, amount: Decimal, dp: u32) -> Option<Decimal> {
        self.back_out(amount).map(|v| round_half_up(v, dp))
    }

    /// Unrounded back-out: `amount / (1 + factor)`. `None` for -100% or
    /// on overflow.
    pub(crate) fn back_out(&self, amount: Decimal) -> Option<Decimal> {
        Decimal::ONE
            .checked_add(self.factor())
            .and_then(|divisor| amount.checked_div(divisor))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for Percent {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches('%').trim();
        Decimal::from_str(digits).map(Self)
    }
}

impl From<Decimal> for Percent {
    fn from(points: Decimal) -> Self {
        Self(points)
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::custom(format!("invalid percentage '{raw}'")))
    }
}

/// Round a Decimal to exactly `dp` decimal places using half-up
/// (commercial rounding). The result always carries `dp` places, so
/// `210` rounded to 2 serializes as `210.00`.
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}
