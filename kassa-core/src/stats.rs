//! Pass 1 over date-sorted transactions: validate, build per-currency
//! statistics and the shared exchange-rate observation arena.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::currency::{CurrencyCode, CurrencyStats, RateObservation};
use crate::error::{KassaError, Result};
use crate::rates;
use crate::transaction::{Legs, Transaction};

/// Everything the enrichment pass learned about the input: the
/// observation arena, per-currency statistics referencing it by index,
/// and the overall date span.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub observations: Vec<RateObservation>,
    pub stats: BTreeMap<CurrencyCode, CurrencyStats>,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl Ledger {
    pub fn observation(&self, index: usize) -> &RateObservation {
        &self.observations[index]
    }
}

/// Run pass 1. `transactions` must already be sorted by date.
///
/// Returns the ledger and the validated legs of each transaction, in
/// input order, so later passes need not re-validate.
pub fn assemble(transactions: &[Transaction]) -> Result<(Ledger, Vec<Legs>)> {
    let first = transactions.first().ok_or_else(|| KassaError::Validation {
        context: "input".to_string(),
        reason: "no transactions to process".to_string(),
    })?;
    let last = transactions.last().unwrap_or(first);

    let mut ledger = Ledger {
        observations: Vec::new(),
        stats: BTreeMap::new(),
        min_date: first.date,
        max_date: last.date,
    };
    let mut all_legs = Vec::with_capacity(transactions.len());

    for tx in transactions {
        let legs = tx.legs()?;

        for leg in [&legs.primary, &legs.origin].into_iter().flatten() {
            ledger
                .stats
                .entry(leg.currency.clone())
                .or_insert_with(|| CurrencyStats::new(leg.currency.clone(), tx.date))
                .record(tx.date, leg.amount);
        }

        if let Some(obs) = rates::extract_observation(tx, &legs) {
            let index = ledger.observations.len();
            // A sniffed counter-currency may never occur as a leg;
            // it still becomes a graph node.
            for endpoint in [&obs.currency_from, &obs.currency_to] {
                ledger
                    .stats
                    .entry(endpoint.clone())
                    .or_insert_with(|| CurrencyStats::new(endpoint.clone(), tx.date))
                    .observations
                    .push(index);
            }
            ledger.observations.push(obs);
        }

        all_legs.push(legs);
    }

    Ok((ledger, all_legs))
}
