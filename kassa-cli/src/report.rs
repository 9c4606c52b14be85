//! Monthly expense/income totals per category and convertible
//! currency.

use std::collections::BTreeMap;
use std::fmt::Write;

use kassa_core::{Journal, Money};

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    expense: Money,
    income: Money,
}

/// Aggregate journal entries into a `month -> category -> currency`
/// table and render it as aligned text. Unreachable conversions are
/// left out of the totals.
pub fn render_monthly(journal: &Journal) -> String {
    let mut months: BTreeMap<String, BTreeMap<String, BTreeMap<String, Totals>>> = BTreeMap::new();

    for entry in &journal.entries {
        let month = entry.transaction.date.format("%Y-%m").to_string();
        let categories = months.entry(month).or_default();
        let currencies = categories.entry(entry.category.group.clone()).or_default();
        for (currency, converted) in &entry.amounts {
            if !converted.is_reachable() {
                continue;
            }
            let totals = currencies.entry(currency.to_string()).or_default();
            if entry.transaction.is_expense {
                totals.expense += converted.amount;
            } else {
                totals.income += converted.amount;
            }
        }
    }

    let mut out = String::new();
    for (month, categories) in &months {
        let _ = writeln!(out, "{month}");
        for (category, currencies) in categories {
            let columns: Vec<String> = currencies
                .iter()
                .map(|(currency, totals)| {
                    format!("{currency} -{} +{}", totals.expense, totals.income)
                })
                .collect();
            let _ = writeln!(out, "  {category:<32} {}", columns.join("  "));
        }
    }
    out
}
