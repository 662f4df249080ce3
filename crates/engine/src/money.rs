use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Upper bound accepted for a single income or spending entry (1,000,000.00).
pub const MAX_AMOUNT: MoneyCents = MoneyCents::new(100_000_000);

/// An amount of money in integer cents.
///
/// Stored entries are never negative, but totals such as
/// `net = income - spending` use the same type and may go below zero.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let lunch: MoneyCents = "12,5".parse().unwrap();
/// assert_eq!(lunch.cents(), 1250);
/// assert_eq!(lunch.to_string(), "12.50");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Share of `self` in `total`, in basis points (10_000 = 100%).
    ///
    /// Zero when either side is not positive.
    #[must_use]
    pub fn share_bps(self, total: MoneyCents) -> u32 {
        if total.0 <= 0 || self.0 <= 0 {
            return 0;
        }
        let bps = i128::from(self.0) * 10_000 / i128::from(total.0);
        u32::try_from(bps).unwrap_or(u32::MAX)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0.unsigned_abs() / 100;
        let cents = self.0.unsigned_abs() % 100;
        let text = if self.0 < 0 {
            format!("-{units}.{cents:02}")
        } else {
            format!("{units}.{cents:02}")
        };
        f.pad(&text)
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0 - rhs.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

fn digits_only(part: &str) -> bool {
    part.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parse user input such as `12`, `12.5`, `12,50` or `-3.10`.
    ///
    /// Range checks are left to the command validators.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let reject = |reason: &str| {
            EngineError::validation("Amount.Invalid", format!("invalid amount: {reason}"))
                .with_metadata("input", input)
        };

        let text = input.trim();
        let (sign, body) = match text.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, text.strip_prefix('+').unwrap_or(text)),
        };
        let body = body.replace(',', ".");
        let (units, fraction) = body.split_once('.').unwrap_or((body.as_str(), ""));

        if units.is_empty() || !digits_only(units) || !digits_only(fraction) {
            return Err(reject("expected digits with an optional decimal part"));
        }
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 | 2 => {
                let padded = format!("{fraction:0<2}");
                padded.parse::<i64>().map_err(|_| reject("bad decimals"))?
            }
            _ => return Err(reject("at most two decimals")),
        };

        units
            .parse::<i64>()
            .ok()
            .and_then(|units| units.checked_mul(100))
            .and_then(|cents| cents.checked_add(fraction_cents))
            .map(|cents| MoneyCents(sign * cents))
            .ok_or_else(|| reject("too large"))
    }
}
