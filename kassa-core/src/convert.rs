//! Cross-currency conversion over the observation graph.
//!
//! Each conversion runs a Dijkstra search where the distance of a hop
//! is the calendar-day offset between the requested date and the
//! chosen observation, floored at 1, so only a same-day direct
//! observation yields a precision of 1. The queue is a linear scan
//! over a sorted map; realistic runs hold well under 20 currencies.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::currency::CurrencyCode;
use crate::money::Money;
use crate::stats::Ledger;

/// Sentinel precision for a currency no observation chain reaches.
pub const PRECISION_UNREACHABLE: u32 = u32::MAX;

/// A converted amount and the quality of the conversion: 0 means no
/// conversion happened, 1 a same-day direct observation, larger values
/// the summed day offsets along the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConvertedAmount {
    pub amount: Money,
    pub precision: u32,
}

impl ConvertedAmount {
    pub fn is_reachable(&self) -> bool {
        self.precision != PRECISION_UNREACHABLE
    }
}

#[derive(Debug, Clone, Copy)]
struct NodeState {
    amount: Money,
    precision: u32,
    /// Day distance of the observation that reached this node; used to
    /// break precision ties deterministically.
    last_hop_days: u32,
}

pub struct Converter<'a> {
    ledger: &'a Ledger,
}

impl<'a> Converter<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Converter { ledger }
    }

    /// Convert `amount` from `source` into `target` at `date`.
    ///
    /// A missing path is not an error: the original amount comes back
    /// marked with [`PRECISION_UNREACHABLE`].
    pub fn convert(
        &self,
        amount: Money,
        source: &CurrencyCode,
        target: &CurrencyCode,
        date: NaiveDate,
    ) -> ConvertedAmount {
        if source == target {
            return ConvertedAmount {
                amount,
                precision: 0,
            };
        }
        let Some((source_key, _)) = self.ledger.stats.get_key_value(source) else {
            return ConvertedAmount {
                amount,
                precision: PRECISION_UNREACHABLE,
            };
        };

        let mut states: BTreeMap<&CurrencyCode, NodeState> = BTreeMap::new();
        let mut done: BTreeSet<&CurrencyCode> = BTreeSet::new();
        states.insert(
            source_key,
            NodeState {
                amount,
                precision: 0,
                last_hop_days: 0,
            },
        );

        loop {
            // Smallest precision first; the map iterates in key order,
            // so ties fall to the lexicographically smaller currency.
            let mut current: Option<(&CurrencyCode, NodeState)> = None;
            for (&code, &state) in &states {
                if done.contains(code) {
                    continue;
                }
                let better = match current {
                    None => true,
                    Some((_, best)) => state.precision < best.precision,
                };
                if better {
                    current = Some((code, state));
                }
            }
            let Some((u, u_state)) = current else { break };
            if u == target {
                return ConvertedAmount {
                    amount: u_state.amount,
                    precision: u_state.precision,
                };
            }
            done.insert(u);

            for &index in &self.ledger.stats[u].observations {
                let obs = self.ledger.observation(index);
                let Some(v) = obs.other_endpoint(u) else { continue };
                if done.contains(v) {
                    continue;
                }
                let distance = obs.day_distance(date);
                let hop = distance.max(1);
                let precision = u_state.precision.saturating_add(hop);
                let better = match states.get(v) {
                    None => true,
                    Some(existing) => {
                        precision < existing.precision
                            || (precision == existing.precision
                                && distance < existing.last_hop_days)
                    }
                };
                if better {
                    states.insert(
                        v,
                        NodeState {
                            amount: obs.apply(u_state.amount, u),
                            precision,
                            last_hop_days: distance,
                        },
                    );
                }
            }
        }

        ConvertedAmount {
            amount,
            precision: PRECISION_UNREACHABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{CurrencyStats, RateObservation};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::new(c, "test").unwrap()
    }

    /// Ledger with the given observations; every endpoint holds every
    /// observation touching it, as pass 1 would produce.
    fn ledger(observations: Vec<RateObservation>) -> Ledger {
        let mut stats: BTreeMap<CurrencyCode, CurrencyStats> = BTreeMap::new();
        let mut min_date = None;
        let mut max_date = None;
        for (index, obs) in observations.iter().enumerate() {
            min_date = Some(min_date.map_or(obs.date, |m: NaiveDate| m.min(obs.date)));
            max_date = Some(max_date.map_or(obs.date, |m: NaiveDate| m.max(obs.date)));
            for endpoint in [&obs.currency_from, &obs.currency_to] {
                stats
                    .entry(endpoint.clone())
                    .or_insert_with(|| CurrencyStats::new(endpoint.clone(), obs.date))
                    .observations
                    .push(index);
            }
        }
        Ledger {
            observations,
            stats,
            min_date: min_date.unwrap(),
            max_date: max_date.unwrap(),
        }
    }

    fn obs(date: NaiveDate, from: &str, to: &str, rate: f64) -> RateObservation {
        RateObservation {
            date,
            currency_from: code(from),
            currency_to: code(to),
            rate,
        }
    }

    #[test]
    fn test_same_currency_is_precision_zero() {
        let ledger = ledger(vec![obs(d(2024, 1, 10), "USD", "RUB", 90.0)]);
        let converter = Converter::new(&ledger);
        let out = converter.convert(
            Money::from_cents(5_000),
            &code("USD"),
            &code("USD"),
            d(2024, 1, 10),
        );
        assert_eq!(out.amount, Money::from_cents(5_000));
        assert_eq!(out.precision, 0);
    }

    #[test]
    fn test_same_day_direct_is_precision_one() {
        let ledger = ledger(vec![obs(d(2024, 1, 10), "USD", "RUB", 90.0)]);
        let converter = Converter::new(&ledger);
        let out = converter.convert(
            Money::from_cents(5_000),
            &code("USD"),
            &code("RUB"),
            d(2024, 1, 10),
        );
        assert_eq!(out.amount, Money::from_cents(450_000));
        assert_eq!(out.precision, 1);
    }

    #[test]
    fn test_direct_conversion_divides_against_the_grain() {
        let ledger = ledger(vec![obs(d(2024, 1, 10), "USD", "RUB", 90.0)]);
        let converter = Converter::new(&ledger);
        let out = converter.convert(
            Money::from_cents(450_000),
            &code("RUB"),
            &code("USD"),
            d(2024, 1, 10),
        );
        assert_eq!(out.amount, Money::from_cents(5_000));
        assert_eq!(out.precision, 1);
    }

    #[test]
    fn test_chained_conversion_sums_day_offsets() {
        let ledger = ledger(vec![
            obs(d(2024, 1, 10), "USD", "RUB", 90.0),
            obs(d(2024, 1, 12), "RUB", "AMD", 0.04),
        ]);
        let converter = Converter::new(&ledger);
        let out = converter.convert(
            Money::from_cents(1_000),
            &code("USD"),
            &code("AMD"),
            d(2024, 1, 10),
        );
        assert_eq!(out.amount, Money::from_cents(3_600));
        assert_eq!(out.precision, 3);
    }

    #[test]
    fn test_no_path_returns_original_marked_unreachable() {
        let ledger = ledger(vec![
            obs(d(2024, 1, 10), "USD", "RUB", 90.0),
            obs(d(2024, 1, 10), "GBP", "EUR", 1.2),
        ]);
        let converter = Converter::new(&ledger);
        let out = converter.convert(
            Money::from_cents(1_000),
            &code("USD"),
            &code("EUR"),
            d(2024, 1, 10),
        );
        assert_eq!(out.amount, Money::from_cents(1_000));
        assert!(!out.is_reachable());
    }

    #[test]
    fn test_equal_precision_prefers_smaller_day_distance() {
        // Both observations land at precision 1; the same-day one must
        // win even though it is listed second.
        let ledger = ledger(vec![
            obs(d(2024, 1, 11), "USD", "RUB", 95.0),
            obs(d(2024, 1, 10), "USD", "RUB", 90.0),
        ]);
        let converter = Converter::new(&ledger);
        let out = converter.convert(
            Money::from_cents(10_000),
            &code("USD"),
            &code("RUB"),
            d(2024, 1, 10),
        );
        assert_eq!(out.amount, Money::from_cents(900_000));
        assert_eq!(out.precision, 1);
    }

    #[test]
    fn test_zero_amount_still_converts() {
        let ledger = ledger(vec![obs(d(2024, 1, 10), "USD", "RUB", 90.0)]);
        let converter = Converter::new(&ledger);
        let out = converter.convert(Money::ZERO, &code("USD"), &code("RUB"), d(2024, 1, 10));
        assert_eq!(out.amount, Money::ZERO);
        assert_eq!(out.precision, 1);
    }

    #[test]
    fn test_closest_observation_by_date_wins() {
        let ledger = ledger(vec![
            obs(d(2024, 1, 1), "USD", "RUB", 80.0),
            obs(d(2024, 1, 20), "USD", "RUB", 90.0),
        ]);
        let converter = Converter::new(&ledger);
        let out = converter.convert(
            Money::from_cents(10_000),
            &code("USD"),
            &code("RUB"),
            d(2024, 1, 18),
        );
        // The Jan 20 observation is 2 days away, the Jan 1 one is 17.
        assert_eq!(out.amount, Money::from_cents(900_000));
        assert_eq!(out.precision, 2);
    }
}
