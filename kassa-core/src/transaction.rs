//! Normalized transactions as produced by the statement parsers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;
use crate::error::KassaError;
use crate::money::Money;

/// Where a transaction came from: statement tag, file and the
/// statement account it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub tag: String,
    pub file: String,
    pub account_number: String,
    pub account_currency: String,
}

/// Normalized output of statement parsers (bank-agnostic).
///
/// Currency fields are raw strings here; the journal builder validates
/// them so that errors can point at the offending row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub is_expense: bool,
    pub from_account: String,
    pub to_account: String,
    pub details: String,
    /// Currency of the statement account; may be empty only when the
    /// origin side is populated.
    pub account_currency: String,
    pub amount: Money,
    /// Counter-currency view for cross-currency settlements, when the
    /// statement reports one.
    pub origin_currency: String,
    pub origin_amount: Money,
    pub source: Source,
}

/// One validated (currency, amount) side of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub currency: CurrencyCode,
    pub amount: Money,
}

/// The validated currency sides of a transaction; at least one is
/// always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Legs {
    pub primary: Option<Leg>,
    pub origin: Option<Leg>,
}

impl Transaction {
    /// Short identification for error messages.
    pub fn describe(&self) -> String {
        let snippet: String = self.details.chars().take(40).collect();
        format!("{} {:?} in {}", self.date, snippet, self.source.file)
    }

    /// Validate the currency invariants and return the typed sides.
    ///
    /// Rejects transactions with no currency at all, with two equal
    /// currencies, or with a malformed currency code.
    pub fn legs(&self) -> Result<Legs, KassaError> {
        let context = self.describe();

        let primary = if self.account_currency.is_empty() {
            None
        } else {
            Some(Leg {
                currency: CurrencyCode::new(&self.account_currency, &context)?,
                amount: self.amount,
            })
        };
        let origin = if self.origin_currency.is_empty() {
            None
        } else {
            Some(Leg {
                currency: CurrencyCode::new(&self.origin_currency, &context)?,
                amount: self.origin_amount,
            })
        };

        match (&primary, &origin) {
            (None, None) => Err(KassaError::Validation {
                context,
                reason: "no currency on either side".to_string(),
            }),
            (Some(p), Some(o)) if p.currency == o.currency => Err(KassaError::Validation {
                context,
                reason: format!("account and origin currency are both {}", p.currency),
            }),
            _ => Ok(Legs { primary, origin }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(date: NaiveDate) -> Transaction {
        Transaction {
            date,
            is_expense: true,
            from_account: String::new(),
            to_account: String::new(),
            details: "Coffee at XYZ".to_string(),
            account_currency: "AMD".to_string(),
            amount: Money::from_cents(50_000),
            origin_currency: String::new(),
            origin_amount: Money::ZERO,
            source: Source {
                tag: "test".to_string(),
                file: "test.csv".to_string(),
                account_number: "ACC1".to_string(),
                account_currency: "AMD".to_string(),
            },
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_legs_primary_only() {
        let legs = sample(d(2024, 1, 1)).legs().unwrap();
        assert_eq!(legs.primary.unwrap().currency.as_str(), "AMD");
        assert!(legs.origin.is_none());
    }

    #[test]
    fn test_legs_rejects_no_currency() {
        let mut tx = sample(d(2024, 1, 1));
        tx.account_currency.clear();
        assert!(matches!(
            tx.legs(),
            Err(KassaError::Validation { .. })
        ));
    }

    #[test]
    fn test_legs_rejects_equal_currencies() {
        let mut tx = sample(d(2024, 1, 1));
        tx.origin_currency = "AMD".to_string();
        tx.origin_amount = Money::from_cents(100);
        assert!(matches!(
            tx.legs(),
            Err(KassaError::Validation { .. })
        ));
    }

    #[test]
    fn test_legs_rejects_bad_code() {
        let mut tx = sample(d(2024, 1, 1));
        tx.account_currency = "usd".to_string();
        assert!(matches!(
            tx.legs(),
            Err(KassaError::CurrencyCode { .. })
        ));
    }
}
