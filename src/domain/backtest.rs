//! Backtest engine: the sequential rebalance loop.
//!
//! Strictly single-threaded and in date order: each iteration's holdings
//! depend only on the previous iteration's final state. All data access is
//! one batched port call per window, and every data failure degrades the
//! affected rebalance or day instead of aborting the run.

use chrono::{Duration, NaiveDate};

use crate::domain::allocation::{target_weights, AllocationBounds};
use crate::domain::error::QuantfolioError;
use crate::domain::execution::{execute_rebalance, RebalanceOutcome, ENTRY_PRICE_LOOKAHEAD_DAYS};
use crate::domain::history::History;
use crate::domain::portfolio::PortfolioState;
use crate::domain::prices::PriceTable;
use crate::domain::schedule::{rebalance_dates, RebalanceFrequency};
use crate::domain::scoring::score_universe;
use crate::domain::selection::{select_candidates, SelectionFilters};
use crate::domain::simulation::PortfolioSimulator;
use crate::ports::fundamentals_port::FundamentalsPort;
use crate::ports::price_port::PricePort;
use crate::ports::scoring_port::ScoringPort;

/// Immutable run parameters.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_value: f64,
    pub frequency: RebalanceFrequency,
    /// Length of the scoring window logged at each rebalance. The
    /// fundamentals snapshot itself is not date-windowed; this records the
    /// period the snapshot is assumed to cover.
    pub lookback_years: i64,
    pub universe: Vec<String>,
    pub filters: SelectionFilters,
    pub bounds: AllocationBounds,
    pub value_metrics: Vec<String>,
}

#[derive(Debug)]
pub struct BacktestResult {
    pub history: History,
    pub final_state: PortfolioState,
    pub rebalances: usize,
    pub degraded_rebalances: usize,
}

/// Run the full backtest loop: schedule → score → select → allocate →
/// execute → simulate, accumulating the daily history.
pub fn run_backtest(
    config: &BacktestConfig,
    fundamentals: &dyn FundamentalsPort,
    prices: &dyn PricePort,
    scoring: &dyn ScoringPort,
) -> Result<BacktestResult, QuantfolioError> {
    let dates = rebalance_dates(config.start_date, config.end_date, config.frequency);
    if dates.is_empty() {
        eprintln!(
            "warning: no rebalance dates between {} and {}; nothing to simulate",
            config.start_date, config.end_date
        );
        return Ok(BacktestResult {
            history: History::new(),
            final_state: PortfolioState::new(config.initial_value),
            rebalances: 0,
            degraded_rebalances: 0,
        });
    }

    eprintln!("Rebalance dates ({}): {:?}", dates.len(), dates);

    let mut state = PortfolioState::new(config.initial_value);
    let mut history = History::new();
    let mut degraded = 0usize;

    for (i, &reb_date) in dates.iter().enumerate() {
        let period_end = match dates.get(i + 1) {
            Some(&next) => next - Duration::days(1),
            None => config.end_date,
        };

        let lookback_end = reb_date - Duration::days(1);
        let lookback_start = lookback_end - Duration::days(config.lookback_years * 365);
        eprintln!(
            "--- Rebalance {} (scoring window {} to {}) ---",
            reb_date, lookback_start, lookback_end
        );

        if !rebalance_holdings(config, fundamentals, prices, scoring, &mut state, reb_date) {
            degraded += 1;
        }

        let held: Vec<String> = state.holdings().keys().cloned().collect();
        let period_prices = if held.is_empty() {
            PriceTable::new()
        } else {
            let fetch_end = period_end + Duration::days(ENTRY_PRICE_LOOKAHEAD_DAYS);
            match prices.fetch_prices(&held, reb_date, fetch_end) {
                Ok(table) => table,
                Err(e) => {
                    eprintln!("warning: price fetch failed for holding period: {e}");
                    PriceTable::new()
                }
            }
        };

        let mut simulator = PortfolioSimulator::for_period(&state);
        simulator.simulate_period(&mut state, &period_prices, reb_date, period_end, &mut history);

        eprintln!(
            "Portfolio value at {}: {:.2}",
            period_end, state.total_value
        );
    }

    Ok(BacktestResult {
        history,
        final_state: state,
        rebalances: dates.len(),
        degraded_rebalances: degraded,
    })
}

/// Select, allocate, and execute one rebalance, mutating `state`.
/// Returns false when the rebalance degraded (no fundamentals or no prices).
fn rebalance_holdings(
    config: &BacktestConfig,
    fundamentals: &dyn FundamentalsPort,
    prices: &dyn PricePort,
    scoring: &dyn ScoringPort,
    state: &mut PortfolioState,
    reb_date: NaiveDate,
) -> bool {
    let table = match fundamentals.fetch_fundamentals(&config.universe) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("warning: fundamentals fetch failed ({e}); holding current position");
            return false;
        }
    };
    if table.is_empty() {
        eprintln!("warning: no fundamentals available; holding current position");
        return false;
    }

    let records = score_universe(&table, scoring, &config.value_metrics);
    let candidates = select_candidates(&records, &config.filters);
    if candidates.is_empty() {
        eprintln!("warning: no candidates passed filters; holding current position");
        return true;
    }

    let tickers: Vec<String> = candidates.iter().map(|c| c.ticker.clone()).collect();
    eprintln!("Selected for {}: {}", reb_date, tickers.join(", "));

    let weights = target_weights(&tickers, config.bounds);
    if weights.is_empty() {
        eprintln!("warning: allocation emptied by minimum-weight constraint; going to cash");
        *state = state.to_cash();
        return true;
    }

    let entry_end = reb_date + Duration::days(ENTRY_PRICE_LOOKAHEAD_DAYS);
    let weight_tickers: Vec<String> = weights.iter().map(|w| w.ticker.clone()).collect();
    let entry_prices = match prices.fetch_prices(&weight_tickers, reb_date, entry_end) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("warning: entry price fetch failed ({e}); holding current position");
            return false;
        }
    };

    let (next, outcome) = execute_rebalance(state, &weights, &entry_prices, config.bounds, reb_date);
    *state = next;

    match outcome {
        RebalanceOutcome::Executed { dropped } => {
            if !dropped.is_empty() {
                eprintln!(
                    "warning: no entry price for {}; excluded from this rebalance",
                    dropped.join(", ")
                );
            }
            true
        }
        RebalanceOutcome::NoPrices => {
            eprintln!("warning: no entry prices at {}; holding current position", reb_date);
            false
        }
        RebalanceOutcome::WentToCash => {
            eprintln!("warning: no priceable candidates at {}; going to cash", reb_date);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fundamentals::{FundamentalRow, FundamentalsTable};
    use crate::domain::history::SnapshotKind;
    use crate::domain::schedule::business_days;
    use approx::assert_abs_diff_eq;
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Deterministic fundamentals fake: a fixed value score per ticker,
    /// quality pinned at 8. Tickers absent from the map return no row.
    struct FakeFundamentals {
        value_by_ticker: BTreeMap<String, f64>,
        /// When set, every fetch returns an empty table.
        unavailable: bool,
    }

    impl FundamentalsPort for FakeFundamentals {
        fn fetch_fundamentals(
            &self,
            tickers: &[String],
        ) -> Result<FundamentalsTable, QuantfolioError> {
            let mut table = FundamentalsTable::new();
            if self.unavailable {
                return Ok(table);
            }
            for ticker in tickers {
                if let Some(&score) = self.value_by_ticker.get(ticker) {
                    let mut row = FundamentalRow::new(ticker);
                    row.set("valueScore", score);
                    table.push(row);
                }
            }
            Ok(table)
        }
    }

    struct FakeScoring;

    impl ScoringPort for FakeScoring {
        fn quality_score(&self, _row: &FundamentalRow) -> i64 {
            8
        }

        fn value_scores(&self, table: &FundamentalsTable, _metrics: &[String]) -> Vec<f64> {
            table
                .rows()
                .iter()
                .map(|r| r.get("valueScore").unwrap_or(0.0))
                .collect()
        }
    }

    /// Price fake: constant price per ticker on every business day.
    struct FakePrices {
        price_by_ticker: BTreeMap<String, f64>,
    }

    impl PricePort for FakePrices {
        fn fetch_prices(
            &self,
            tickers: &[String],
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<PriceTable, QuantfolioError> {
            let mut table = PriceTable::new();
            for date in business_days(start, end) {
                for ticker in tickers {
                    if let Some(&price) = self.price_by_ticker.get(ticker) {
                        table.insert(date, ticker, price);
                    }
                }
            }
            Ok(table)
        }
    }

    fn sample_config() -> BacktestConfig {
        BacktestConfig {
            start_date: d(2020, 1, 1),
            end_date: d(2020, 3, 31),
            initial_value: 100_000.0,
            frequency: RebalanceFrequency::Monthly,
            lookback_years: 3,
            universe: vec!["A".to_string(), "B".to_string()],
            filters: SelectionFilters {
                min_quality_score: 0,
                min_value_score: 0.0,
                top_n: 0,
                max_assets: 2,
            },
            bounds: AllocationBounds {
                min_weight: 0.3,
                max_weight: 0.7,
            },
            value_metrics: vec![],
        }
    }

    fn two_asset_world() -> (FakeFundamentals, FakePrices) {
        let fundamentals = FakeFundamentals {
            value_by_ticker: [("A".to_string(), 0.9), ("B".to_string(), 0.8)].into(),
            unavailable: false,
        };
        let prices = FakePrices {
            price_by_ticker: [("A".to_string(), 50.0), ("B".to_string(), 25.0)].into(),
        };
        (fundamentals, prices)
    }

    #[test]
    fn end_to_end_two_asset_quarter() {
        let config = sample_config();
        let (fundamentals, prices) = two_asset_world();

        let result = run_backtest(&config, &fundamentals, &prices, &FakeScoring).unwrap();

        assert_eq!(result.rebalances, 3);
        assert_eq!(result.degraded_rebalances, 0);

        // Gapless daily series covering every business day of the window.
        let expected_days = business_days(d(2020, 1, 1), d(2020, 3, 31));
        assert_eq!(result.history.len(), expected_days.len());
        let dates: Vec<NaiveDate> = result.history.value_series().iter().map(|&(dt, _)| dt).collect();
        assert_eq!(dates, expected_days);

        // Equal weights within [0.3, 0.7] for two candidates.
        let last = result.history.last().unwrap();
        assert_eq!(last.kind, SnapshotKind::Computed);
        assert_eq!(last.positions.len(), 2);
        let a = result.final_state.holding("A").unwrap();
        let b = result.final_state.holding("B").unwrap();
        assert_abs_diff_eq!(a.weight, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(b.weight, 0.5, epsilon = 1e-9);

        // Flat prices: value never moves.
        assert_abs_diff_eq!(result.final_state.total_value, 100_000.0, epsilon = 1e-6);
    }

    #[test]
    fn empty_schedule_yields_empty_history() {
        let config = BacktestConfig {
            start_date: d(2020, 6, 15),
            end_date: d(2020, 6, 15),
            ..sample_config()
        };
        let (fundamentals, prices) = two_asset_world();

        let result = run_backtest(&config, &fundamentals, &prices, &FakeScoring).unwrap();
        assert_eq!(result.rebalances, 0);
        assert!(result.history.is_empty());
        assert_abs_diff_eq!(result.final_state.total_value, 100_000.0);
    }

    #[test]
    fn unavailable_fundamentals_degrade_but_series_stays_gapless() {
        let config = sample_config();
        let fundamentals = FakeFundamentals {
            value_by_ticker: BTreeMap::new(),
            unavailable: true,
        };
        let prices = FakePrices {
            price_by_ticker: BTreeMap::new(),
        };

        let result = run_backtest(&config, &fundamentals, &prices, &FakeScoring).unwrap();

        assert_eq!(result.degraded_rebalances, 3);
        // Never entered the market: every day is a cash snapshot at par.
        let expected_days = business_days(d(2020, 1, 1), d(2020, 3, 31));
        assert_eq!(result.history.len(), expected_days.len());
        for snapshot in result.history.snapshots() {
            assert_eq!(snapshot.kind, SnapshotKind::Cash);
            assert_abs_diff_eq!(snapshot.portfolio_value, 100_000.0);
        }
    }

    #[test]
    fn filters_reduce_to_single_holding() {
        let mut config = sample_config();
        config.filters.top_n = 1;
        // Single candidate: base weight 1.0 clamps to 0.7, renormalizes to 1.
        let (fundamentals, prices) = two_asset_world();

        let result = run_backtest(&config, &fundamentals, &prices, &FakeScoring).unwrap();
        assert_eq!(result.final_state.holdings().len(), 1);
        let a = result.final_state.holding("A").unwrap();
        assert_abs_diff_eq!(a.weight, 1.0, epsilon = 1e-9);
    }
}
