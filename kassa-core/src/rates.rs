//! Exchange-rate extraction from transactions.
//!
//! A two-currency transaction yields a rate directly from its two
//! amounts. Failing that, the details text is scanned for patterns
//! like `330,000.00 AMD / 4.4 = 75,000.00 RUB`. Extraction is
//! best-effort and never fatal.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::currency::{CurrencyCode, RateObservation};
use crate::money::Money;
use crate::transaction::{Legs, Transaction};

/// Derive at most one observation from a transaction.
pub fn extract_observation(tx: &Transaction, legs: &Legs) -> Option<RateObservation> {
    if let (Some(primary), Some(origin)) = (&legs.primary, &legs.origin) {
        if !primary.amount.is_zero() && !origin.amount.is_zero() {
            return Some(RateObservation {
                date: tx.date,
                currency_from: primary.currency.clone(),
                currency_to: origin.currency.clone(),
                rate: origin.amount.ratio_to(primary.amount),
            });
        }
    }

    let targets = (
        legs.primary.as_ref().map(|l| &l.currency),
        legs.origin.as_ref().map(|l| &l.currency),
    );
    let sniffed = sniff_rate(&tx.details, targets, tx.date);
    if sniffed.is_none() {
        tracing::debug!(date = %tx.date, details = %tx.details, "no exchange rate in details");
    }
    sniffed
}

fn amount_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*([A-Z]{3})\b").expect("amount/code pattern")
    })
}

/// All `<number> <CODE>` pairs in order of appearance.
fn amount_code_pairs(details: &str) -> Vec<(Money, String)> {
    amount_code_re()
        .captures_iter(details)
        .filter_map(|caps| {
            let amount: Money = caps[1].parse().ok()?;
            Some((amount, caps[2].to_string()))
        })
        .collect()
}

/// Scan `details` for a rate between the target currencies.
///
/// When only one target appears with an amount, any other three-letter
/// uppercase token with an amount stands in for the missing side. The
/// emitted rate is `amount(other) / amount(located)` with
/// `currency_from` being the first located target.
pub fn sniff_rate(
    details: &str,
    targets: (Option<&CurrencyCode>, Option<&CurrencyCode>),
    date: NaiveDate,
) -> Option<RateObservation> {
    let pairs = amount_code_pairs(details);
    let find = |code: Option<&CurrencyCode>| {
        code.and_then(|c| pairs.iter().find(|(_, found)| found.as_str() == c.as_str()))
    };

    let first = find(targets.0);
    let second = find(targets.1);

    let (from, amount_from, to, amount_to) = match (first, second) {
        (Some((a1, _)), Some((a2, _))) => (
            targets.0?.clone(),
            *a1,
            targets.1?.clone(),
            *a2,
        ),
        (Some((a1, c1)), None) => {
            let (a2, c2) = pairs.iter().find(|(_, c)| c.as_str() != c1.as_str())?;
            (targets.0?.clone(), *a1, CurrencyCode::new(c2, details).ok()?, *a2)
        }
        (None, Some((a1, c1))) => {
            let (a2, c2) = pairs.iter().find(|(_, c)| c.as_str() != c1.as_str())?;
            (targets.1?.clone(), *a1, CurrencyCode::new(c2, details).ok()?, *a2)
        }
        (None, None) => return None,
    };

    if amount_from.is_zero() || amount_to.is_zero() || from == to {
        return None;
    }

    Some(RateObservation {
        date,
        currency_from: from,
        currency_to: to,
        rate: amount_to.ratio_to(amount_from),
    })
}
