//! Rebalance execution: target weights plus entry prices into holdings.
//!
//! Rebalancing is value-preserving; it only redistributes exposure. Degraded
//! outcomes (missing prices) carry the prior state forward or liquidate to
//! cash, never abort the run.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::allocation::{target_weights, AllocationBounds, TargetWeight};
use crate::domain::portfolio::{Holding, PortfolioState};
use crate::domain::prices::PriceTable;

/// Calendar days scanned past the rebalance date for a usable entry price.
pub const ENTRY_PRICE_LOOKAHEAD_DAYS: i64 = 3;

/// How a rebalance resolved. Everything but `Executed` is degraded and
/// surfaced as a warning by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RebalanceOutcome {
    /// Holdings replaced; `dropped` lists tickers excluded for lack of a price.
    Executed { dropped: Vec<String> },
    /// No usable prices at all: prior holdings and value carry over.
    NoPrices,
    /// Every ticker lost its price (or the feasibility shrink emptied the
    /// list): liquidated to cash.
    WentToCash,
}

/// Execute a rebalance atomically.
///
/// Tickers without an entry price in the lookahead window are dropped and the
/// full allocation pipeline (feasibility shrink included) re-runs over the
/// survivors, so a drop can never leave an infeasible weight set behind. The
/// holdings map is replaced wholesale; partial holdings are never mixed with
/// the prior period's.
pub fn execute_rebalance(
    state: &PortfolioState,
    weights: &[TargetWeight],
    entry_prices: &PriceTable,
    bounds: AllocationBounds,
    rebalance_date: NaiveDate,
) -> (PortfolioState, RebalanceOutcome) {
    if entry_prices.is_empty() {
        return (state.clone(), RebalanceOutcome::NoPrices);
    }

    let mut priced: Vec<(String, f64)> = Vec::with_capacity(weights.len());
    let mut dropped: Vec<String> = Vec::new();
    for tw in weights {
        match entry_prices.first_valid(&tw.ticker, rebalance_date, ENTRY_PRICE_LOOKAHEAD_DAYS) {
            Some(price) => priced.push((tw.ticker.clone(), price)),
            None => dropped.push(tw.ticker.clone()),
        }
    }

    if priced.is_empty() {
        return (state.to_cash(), RebalanceOutcome::WentToCash);
    }

    let final_weights = if dropped.is_empty() {
        weights.to_vec()
    } else {
        let survivors: Vec<String> = priced.iter().map(|(t, _)| t.clone()).collect();
        target_weights(&survivors, bounds)
    };

    if final_weights.is_empty() {
        return (state.to_cash(), RebalanceOutcome::WentToCash);
    }

    let price_of: BTreeMap<&str, f64> = priced.iter().map(|(t, p)| (t.as_str(), *p)).collect();
    let mut holdings: BTreeMap<String, Holding> = BTreeMap::new();
    for tw in &final_weights {
        // The allocation re-run only ever keeps priced tickers.
        let Some(&price) = price_of.get(tw.ticker.as_str()) else {
            continue;
        };
        let shares = (state.total_value * tw.weight) / price;
        holdings.insert(
            tw.ticker.clone(),
            Holding {
                shares,
                entry_price: price,
                weight: tw.weight,
            },
        );
    }

    (
        state.with_holdings(holdings),
        RebalanceOutcome::Executed { dropped },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn weights_of(entries: &[(&str, f64)]) -> Vec<TargetWeight> {
        entries
            .iter()
            .map(|&(ticker, weight)| TargetWeight {
                ticker: ticker.to_string(),
                weight,
            })
            .collect()
    }

    fn bounds() -> AllocationBounds {
        AllocationBounds {
            min_weight: 0.0,
            max_weight: 1.0,
        }
    }

    #[test]
    fn full_execution_preserves_value() {
        let state = PortfolioState::new(100_000.0);
        let mut prices = PriceTable::new();
        prices.insert(d(2020, 1, 1), "AAA", 50.0);
        prices.insert(d(2020, 1, 1), "BBB", 200.0);

        let weights = weights_of(&[("AAA", 0.5), ("BBB", 0.5)]);
        let (next, outcome) =
            execute_rebalance(&state, &weights, &prices, bounds(), d(2020, 1, 1));

        assert_eq!(outcome, RebalanceOutcome::Executed { dropped: vec![] });
        assert_abs_diff_eq!(next.total_value, 100_000.0);
        assert_abs_diff_eq!(next.invested_value(), 100_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(next.holding("AAA").unwrap().shares, 1_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(next.holding("BBB").unwrap().shares, 250.0, epsilon = 1e-9);
    }

    #[test]
    fn entry_price_uses_lookahead_window() {
        let state = PortfolioState::new(10_000.0);
        let mut prices = PriceTable::new();
        // Rebalance lands on a gap; first observation is two days later.
        prices.insert(d(2020, 2, 5), "AAA", 100.0);

        let weights = weights_of(&[("AAA", 1.0)]);
        let (next, outcome) =
            execute_rebalance(&state, &weights, &prices, bounds(), d(2020, 2, 3));

        assert!(matches!(outcome, RebalanceOutcome::Executed { .. }));
        assert_abs_diff_eq!(next.holding("AAA").unwrap().entry_price, 100.0);
    }

    #[test]
    fn empty_price_table_carries_prior_state() {
        let prior_holdings: BTreeMap<String, Holding> = [(
            "OLD".to_string(),
            Holding {
                shares: 10.0,
                entry_price: 5.0,
                weight: 1.0,
            },
        )]
        .into();
        let state = PortfolioState::new(1_000.0).with_holdings(prior_holdings);

        let weights = weights_of(&[("AAA", 1.0)]);
        let (next, outcome) =
            execute_rebalance(&state, &weights, &PriceTable::new(), bounds(), d(2020, 1, 1));

        assert_eq!(outcome, RebalanceOutcome::NoPrices);
        assert_eq!(next, state);
        assert!(next.holding("OLD").is_some());
    }

    #[test]
    fn unpriced_tickers_are_dropped_and_weights_recomputed() {
        let state = PortfolioState::new(90_000.0);
        let mut prices = PriceTable::new();
        prices.insert(d(2020, 1, 1), "AAA", 100.0);
        prices.insert(d(2020, 1, 1), "BBB", 50.0);
        // CCC never prices inside the window.
        prices.insert(d(2020, 1, 10), "CCC", 10.0);

        let weights = weights_of(&[("AAA", 0.4), ("BBB", 0.3), ("CCC", 0.3)]);
        let (next, outcome) =
            execute_rebalance(&state, &weights, &prices, bounds(), d(2020, 1, 1));

        assert_eq!(
            outcome,
            RebalanceOutcome::Executed {
                dropped: vec!["CCC".to_string()]
            }
        );
        assert!(next.holding("CCC").is_none());
        // Equal-weight recomputation over the survivors.
        assert_abs_diff_eq!(next.holding("AAA").unwrap().weight, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(next.holding("BBB").unwrap().weight, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(next.invested_value(), 90_000.0, epsilon = 1e-6);
    }

    #[test]
    fn drop_reruns_feasibility_shrink() {
        let state = PortfolioState::new(10_000.0);
        let tight = AllocationBounds {
            min_weight: 0.6,
            max_weight: 1.0,
        };
        let mut prices = PriceTable::new();
        prices.insert(d(2020, 1, 1), "AAA", 10.0);
        prices.insert(d(2020, 1, 1), "BBB", 10.0);

        // Both survive pricing, but min 0.6 × 2 > 1: shrink keeps only AAA.
        let weights = weights_of(&[("AAA", 0.5), ("BBB", 0.3), ("CCC", 0.2)]);
        let (next, outcome) = execute_rebalance(&state, &weights, &prices, tight, d(2020, 1, 1));

        assert!(matches!(outcome, RebalanceOutcome::Executed { .. }));
        assert_eq!(next.holdings().len(), 1);
        assert_abs_diff_eq!(next.holding("AAA").unwrap().weight, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn all_tickers_unpriced_liquidates_to_cash() {
        let prior: BTreeMap<String, Holding> = [(
            "OLD".to_string(),
            Holding {
                shares: 1.0,
                entry_price: 1.0,
                weight: 1.0,
            },
        )]
        .into();
        let state = PortfolioState::new(500.0).with_holdings(prior);

        let mut prices = PriceTable::new();
        // Table is non-empty but has nothing for the requested tickers.
        prices.insert(d(2020, 1, 1), "ZZZ", 3.0);

        let weights = weights_of(&[("AAA", 0.5), ("BBB", 0.5)]);
        let (next, outcome) =
            execute_rebalance(&state, &weights, &prices, bounds(), d(2020, 1, 1));

        assert_eq!(outcome, RebalanceOutcome::WentToCash);
        assert!(next.is_cash());
        assert_abs_diff_eq!(next.total_value, 500.0);
    }

    #[test]
    fn shares_times_price_equals_allocated_cash() {
        let state = PortfolioState::new(77_777.0);
        let mut prices = PriceTable::new();
        prices.insert(d(2020, 1, 1), "AAA", 33.3);
        prices.insert(d(2020, 1, 1), "BBB", 7.77);
        prices.insert(d(2020, 1, 1), "CCC", 123.0);

        let weights = weights_of(&[("AAA", 0.2), ("BBB", 0.35), ("CCC", 0.45)]);
        let (next, _) = execute_rebalance(&state, &weights, &prices, bounds(), d(2020, 1, 1));

        for tw in &weights {
            let h = next.holding(&tw.ticker).unwrap();
            assert_abs_diff_eq!(
                h.shares * h.entry_price,
                state.total_value * tw.weight,
                epsilon = 1e-6
            );
        }
        assert_abs_diff_eq!(next.invested_value(), 77_777.0, epsilon = 1e-6);
    }
}
