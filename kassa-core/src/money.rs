//! Fixed-point monetary values with two implicit decimal places.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KassaError;

/// A signed amount stored as hundredths of a unit.
///
/// All arithmetic stays in cents, so the two-decimal scale is never
/// lost. Parsing accepts thousand-separator commas and truncates any
/// digits past the second decimal place.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// The 1.00 amount banks charge to verify a card. Transactions of
    /// exactly this size may convert to zero without being an error.
    pub const CARD_PROBE: Money = Money(100);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// Units-per-unit ratio of `self` to `other`. Both amounts carry
    /// the same scale, so the cent ratio is the unit ratio.
    pub fn ratio_to(self, other: Money) -> f64 {
        self.0 as f64 / other.0 as f64
    }

    /// Multiply by an exchange rate, rounding to the nearest cent.
    pub fn scale(self, rate: f64) -> Money {
        Money((self.0 as f64 * rate).round() as i64)
    }

    /// Divide by an exchange rate, rounding to the nearest cent.
    pub fn unscale(self, rate: f64) -> Money {
        Money((self.0 as f64 / rate).round() as i64)
    }
}

impl FromStr for Money {
    type Err = KassaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().replace(',', "");
        let bad = || KassaError::MoneyParse(s.to_string());

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad());
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(bad());
        }

        let mut cents: i64 = 0;
        if !int_part.is_empty() {
            cents = int_part.parse::<i64>().map_err(|_| bad())? * 100;
        }
        // Truncate past two decimals; pad a single digit ("4" -> 40).
        let mut frac_cents = 0i64;
        let mut taken = 0;
        for c in frac_part.chars().take(2) {
            frac_cents = frac_cents * 10 + (c as u8 - b'0') as i64;
            taken += 1;
        }
        if taken == 1 {
            frac_cents *= 10;
        }
        cents += frac_cents;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.0.abs();
        let whole = (cents / 100).to_string();
        let frac = cents % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{grouped}.{frac:02}")
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}
