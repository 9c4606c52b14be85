//! The journal builder: the single entry point tying validation,
//! enrichment, convertibility filtering, conversion and categorization
//! together.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::categorize::{Categorizer, CategoryMatch};
use crate::config::CoreConfig;
use crate::convert::{ConvertedAmount, Converter};
use crate::currency::{CurrencyCode, CurrencyStats};
use crate::error::{KassaError, Result};
use crate::money::Money;
use crate::stats;
use crate::transaction::{Leg, Legs, Transaction};

/// A categorized transaction with its equivalent amount in every
/// convertible currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: CategoryMatch,
    pub amounts: BTreeMap<CurrencyCode, ConvertedAmount>,
}

/// The journal plus everything learned about the input on the way.
#[derive(Debug)]
pub struct Journal {
    pub entries: Vec<JournalEntry>,
    /// Statistics for every currency seen, keyed by code.
    pub currencies: BTreeMap<CurrencyCode, CurrencyStats>,
    /// The conversion targets every entry carries amounts for.
    pub convertible: BTreeSet<CurrencyCode>,
    /// Every account identifier seen on either side of a transaction
    /// or as a statement account.
    pub accounts: BTreeSet<String>,
}

/// Build the journal from parser output.
///
/// Transactions are sorted by date first (stably); configuration
/// errors surface before any data is touched.
pub fn build_journal(
    mut transactions: Vec<Transaction>,
    config: &CoreConfig,
) -> Result<Journal> {
    let categorizer =
        Categorizer::from_groups(&config.groups, config.group_all_unknown_transactions)?;

    transactions.sort_by_key(|tx| tx.date);
    let (ledger, all_legs) = stats::assemble(&transactions)?;
    let convertible = crate::convertible::convertible_currencies(&ledger, config)?;
    let converter = Converter::new(&ledger);

    tracing::info!(
        transactions = transactions.len(),
        currencies = ledger.stats.len(),
        observations = ledger.observations.len(),
        convertible = convertible.len(),
        "journal enrichment complete"
    );

    let mut accounts = BTreeSet::new();
    let mut entries = Vec::with_capacity(transactions.len());

    for (tx, legs) in transactions.into_iter().zip(&all_legs) {
        for account in [&tx.from_account, &tx.to_account, &tx.source.account_number] {
            if !account.is_empty() {
                accounts.insert(account.clone());
            }
        }

        let category = categorizer.classify(&tx)?;
        let mut amounts = BTreeMap::new();
        for target in &convertible {
            let converted = convert_entry(&converter, &tx, legs, target)?;
            amounts.insert(target.clone(), converted);
        }

        entries.push(JournalEntry {
            transaction: tx,
            category,
            amounts,
        });
    }

    Ok(Journal {
        entries,
        currencies: ledger.stats,
        convertible,
        accounts,
    })
}

/// Convert one transaction into `target`, starting from whichever of
/// its sides gives the better precision.
fn convert_entry(
    converter: &Converter<'_>,
    tx: &Transaction,
    legs: &Legs,
    target: &CurrencyCode,
) -> Result<ConvertedAmount> {
    let sides = [&legs.primary, &legs.origin];
    let candidates: Vec<ConvertedAmount> = sides
        .into_iter()
        .flatten()
        .filter(|leg| !leg.amount.is_zero())
        .map(|leg| converter.convert(leg.amount, &leg.currency, target, tx.date))
        .collect();

    let chosen = match best_candidate(&candidates) {
        Some(chosen) => chosen,
        None => {
            // Every side is zero; convert the zero so the entry still
            // carries a precision, subject to the evidence check below.
            let leg = sides.into_iter().flatten().next().ok_or_else(|| {
                KassaError::Validation {
                    context: tx.describe(),
                    reason: "no currency on either side".to_string(),
                }
            })?;
            converter.convert(Money::ZERO, &leg.currency, target, tx.date)
        }
    };

    if candidates.iter().all(|c| c.amount.is_zero()) && !is_card_probe(legs) {
        return Err(KassaError::Conversion {
            date: tx.date,
            details: tx.details.chars().take(40).collect(),
            currency: target.to_string(),
        });
    }
    Ok(chosen)
}

fn best_candidate(candidates: &[ConvertedAmount]) -> Option<ConvertedAmount> {
    candidates.iter().copied().reduce(|a, b| {
        if b.precision < a.precision {
            b
        } else if b.precision == a.precision && a.amount.is_zero() && !b.amount.is_zero() {
            b
        } else {
            a
        }
    })
}

/// Card verification charges of exactly 1.00 may convert to zero.
fn is_card_probe(legs: &Legs) -> bool {
    let probe = |leg: &Option<Leg>| {
        leg.as_ref()
            .map(|l| l.amount.abs() == Money::CARD_PROBE)
            .unwrap_or(false)
    };
    probe(&legs.primary) || probe(&legs.origin)
}
