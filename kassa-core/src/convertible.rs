//! Selection of conversion-target currencies.
//!
//! A currency qualifies when its own date span covers enough of the
//! overall span and its rate observations never leave a gap of
//! `max_currency_timespan_gaps_days` or more. A fixed-point pass then
//! re-checks each candidate counting only observations against other
//! candidates, so a currency cannot qualify through evidence that
//! itself got disqualified.

use std::collections::BTreeSet;

use crate::config::CoreConfig;
use crate::currency::{CurrencyCode, CurrencyStats};
use crate::error::{KassaError, Result};
use crate::stats::Ledger;

/// Largest gap, in days, in the observation dates touching `stats`,
/// walking `[min_date, observations..]`. With `restrict` set,
/// observations whose counter-currency is outside the set are
/// skipped. No usable observation at all counts as silence over the
/// whole span.
fn max_gap_days(
    ledger: &Ledger,
    stats: &CurrencyStats,
    restrict: Option<&BTreeSet<CurrencyCode>>,
) -> i64 {
    let mut prev = ledger.min_date;
    let mut max = 0i64;
    let mut seen = false;
    for &index in &stats.observations {
        let obs = ledger.observation(index);
        if let Some(set) = restrict {
            match obs.other_endpoint(&stats.name) {
                Some(other) if set.contains(other) => {}
                _ => continue,
            }
        }
        max = max.max((obs.date - prev).num_days());
        prev = obs.date;
        seen = true;
    }
    if seen {
        max
    } else {
        (ledger.max_date - ledger.min_date).num_days()
    }
}

/// Compute the final convertible set, including the force-convert
/// union. Fails when a forced currency was never seen or when the
/// result is empty.
pub fn convertible_currencies(
    ledger: &Ledger,
    config: &CoreConfig,
) -> Result<BTreeSet<CurrencyCode>> {
    if config.min_currency_timespan_percent > 100 {
        return Err(KassaError::Config(format!(
            "min_currency_timespan_percent must be within 0..=100, got {}",
            config.min_currency_timespan_percent
        )));
    }
    let total_days = (ledger.max_date - ledger.min_date).num_days();
    let gap_limit = config.max_currency_timespan_gaps_days as i64;

    let mut candidates: BTreeSet<CurrencyCode> = ledger
        .stats
        .values()
        .filter(|stats| {
            let span = (stats.last_seen - stats.first_seen).num_days();
            span * 100 >= config.min_currency_timespan_percent as i64 * total_days
                && max_gap_days(ledger, stats, None) < gap_limit
        })
        .map(|stats| stats.name.clone())
        .collect();

    // Transitive pass: evidence against non-candidates does not count.
    // The set strictly shrinks, so this terminates.
    loop {
        let disqualified = candidates
            .iter()
            .find(|&code| max_gap_days(ledger, &ledger.stats[code], Some(&candidates)) >= gap_limit)
            .cloned();
        match disqualified {
            Some(code) => {
                tracing::debug!(currency = %code, "dropped from convertible set on recheck");
                candidates.remove(&code);
            }
            None => break,
        }
    }

    for raw in &config.convert_to_currencies {
        let code = CurrencyCode::new(raw, "convert_to_currencies (configuration)")?;
        if !ledger.stats.contains_key(&code) {
            return Err(KassaError::Config(format!(
                "currency {code} in convert_to_currencies was never seen in the statements"
            )));
        }
        candidates.insert(code);
    }

    if candidates.is_empty() {
        return Err(KassaError::Config(
            "no convertible currencies found; lower min_currency_timespan_percent, raise \
             max_currency_timespan_gaps_days or force currencies via convert_to_currencies"
                .to_string(),
        ));
    }
    Ok(candidates)
}
