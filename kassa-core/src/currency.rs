//! Currency codes, dated exchange-rate observations and per-currency
//! statistics.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::KassaError;
use crate::money::Money;

fn code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Z][A-Z0-9'._\-]{1,22}[A-Z0-9]$").expect("currency code pattern")
    })
}

/// A validated currency code: uppercase start, 3-24 chars, interior
/// limited to `A-Z 0-9 ' . _ -`, ends on a letter or digit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str, context: &str) -> Result<Self, KassaError> {
        if code_pattern().is_match(code) {
            Ok(CurrencyCode(code.to_string()))
        } else {
            Err(KassaError::CurrencyCode {
                code: code.to_string(),
                context: context.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An exchange rate observed on a specific date, derived from a single
/// two-currency transaction or sniffed from its details text.
///
/// `rate` is denominated in units of `currency_to` per unit of
/// `currency_from`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    pub currency_from: CurrencyCode,
    pub currency_to: CurrencyCode,
    pub rate: f64,
}

impl RateObservation {
    /// The endpoint that is not `currency`. Returns `None` when the
    /// observation does not touch `currency` at all.
    pub fn other_endpoint(&self, currency: &CurrencyCode) -> Option<&CurrencyCode> {
        if *currency == self.currency_from {
            Some(&self.currency_to)
        } else if *currency == self.currency_to {
            Some(&self.currency_from)
        } else {
            None
        }
    }

    /// Convert `amount` denominated in `source` across this
    /// observation: multiply when leaving `currency_from`, divide when
    /// leaving `currency_to`.
    pub fn apply(&self, amount: Money, source: &CurrencyCode) -> Money {
        if *source == self.currency_from {
            amount.scale(self.rate)
        } else {
            amount.unscale(self.rate)
        }
    }

    /// Calendar-day distance between the observation and a target date.
    pub fn day_distance(&self, date: NaiveDate) -> u32 {
        (self.date - date).num_days().unsigned_abs() as u32
    }
}

/// Everything seen about one currency during the enrichment pass.
///
/// `observations` holds indices into the shared observation arena; an
/// observation appears in the lists of both its endpoints.
#[derive(Debug, Clone)]
pub struct CurrencyStats {
    pub name: CurrencyCode,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub occurrences: u64,
    pub total: Money,
    pub observations: Vec<usize>,
}

impl CurrencyStats {
    pub fn new(name: CurrencyCode, date: NaiveDate) -> Self {
        CurrencyStats {
            name,
            first_seen: date,
            last_seen: date,
            occurrences: 0,
            total: Money::ZERO,
            observations: Vec::new(),
        }
    }

    /// Record an amount occurrence on `date`. The driving pass is
    /// chronological, so `last_seen` only moves forward.
    pub fn record(&mut self, date: NaiveDate, amount: Money) {
        self.last_seen = self.last_seen.max(date);
        self.occurrences += 1;
        self.total += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_code_accepts_valid_shapes() {
        for code in ["USD", "AMD", "RUB", "X99", "GOLD_OZ", "A.B-C'D2"] {
            assert!(CurrencyCode::new(code, "test").is_ok(), "{code}");
        }
    }

    #[test]
    fn test_code_rejects_invalid_shapes() {
        for code in ["", "US", "usd", "1SD", "USD-", "-USD", "USD$", "TOOLONGTOOLONGTOOLONGTOOLONG"] {
            assert!(CurrencyCode::new(code, "test").is_err(), "{code}");
        }
    }

    #[test]
    fn test_apply_multiplies_from_divides_to() {
        let obs = RateObservation {
            date: d(2024, 1, 10),
            currency_from: CurrencyCode::new("USD", "test").unwrap(),
            currency_to: CurrencyCode::new("RUB", "test").unwrap(),
            rate: 90.0,
        };
        let usd = CurrencyCode::new("USD", "test").unwrap();
        let rub = CurrencyCode::new("RUB", "test").unwrap();
        assert_eq!(obs.apply(Money::from_cents(5_000), &usd).cents(), 450_000);
        assert_eq!(obs.apply(Money::from_cents(450_000), &rub).cents(), 5_000);
    }

    #[test]
    fn test_day_distance_is_absolute() {
        let obs = RateObservation {
            date: d(2024, 1, 12),
            currency_from: CurrencyCode::new("RUB", "test").unwrap(),
            currency_to: CurrencyCode::new("AMD", "test").unwrap(),
            rate: 0.04,
        };
        assert_eq!(obs.day_distance(d(2024, 1, 10)), 2);
        assert_eq!(obs.day_distance(d(2024, 1, 14)), 2);
        assert_eq!(obs.day_distance(d(2024, 1, 12)), 0);
    }
}
