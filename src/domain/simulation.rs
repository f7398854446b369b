//! Day-by-day portfolio valuation between rebalances.
//!
//! The simulator walks every business day of a holding period and appends
//! exactly one snapshot per day, so the daily value series stays gapless no
//! matter which data branch a day takes. It owns a small ticker→last-price
//! cache, seeded from entry prices and updated only on live observations;
//! a day on which some held ticker has neither a live nor a cached price is
//! unreliable and carries the previous total forward rather than valuing a
//! partial subset.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::history::{History, PositionDetail, Snapshot, SnapshotKind};
use crate::domain::portfolio::PortfolioState;
use crate::domain::prices::PriceTable;
use crate::domain::schedule::business_days;

pub struct PortfolioSimulator {
    last_prices: BTreeMap<String, f64>,
}

impl PortfolioSimulator {
    /// A simulator for one holding period, its price cache seeded with the
    /// state's entry prices so fallback exists from the first day.
    pub fn for_period(state: &PortfolioState) -> Self {
        let last_prices = state
            .holdings()
            .iter()
            .map(|(ticker, h)| (ticker.clone(), h.entry_price))
            .collect();
        PortfolioSimulator { last_prices }
    }

    /// Advance the portfolio through every business day in `[start, end]`,
    /// appending one snapshot per day and updating `state.total_value`.
    pub fn simulate_period(
        &mut self,
        state: &mut PortfolioState,
        prices: &PriceTable,
        start: NaiveDate,
        end: NaiveDate,
        history: &mut History,
    ) {
        for date in business_days(start, end) {
            let snapshot = self.value_day(state, prices, date);
            state.total_value = snapshot.portfolio_value;
            history.append(snapshot);
        }
    }

    fn value_day(&mut self, state: &PortfolioState, prices: &PriceTable, date: NaiveDate) -> Snapshot {
        if state.is_cash() {
            return Snapshot {
                date,
                portfolio_value: state.total_value,
                positions: BTreeMap::new(),
                kind: SnapshotKind::Cash,
            };
        }

        if !prices.has_date(date) {
            // Non-trading day or data gap: advance the clock, keep the value.
            return self.carried_forward(state, date);
        }

        let mut total = 0.0;
        let mut positions = BTreeMap::new();
        let mut observed: Vec<(String, f64)> = Vec::new();
        for (ticker, holding) in state.holdings() {
            let price = match prices.price(date, ticker) {
                Some(live) => {
                    observed.push((ticker.clone(), live));
                    live
                }
                None => match self.last_prices.get(ticker) {
                    Some(&cached) => cached,
                    // No live price and no fallback: the day's total would be
                    // fabricated from a partial subset. Carry forward without
                    // committing the prices seen so far, so the snapshot
                    // reflects only prices that ever valued a day.
                    None => return self.carried_forward(state, date),
                },
            };
            let value = holding.shares * price;
            total += value;
            positions.insert(
                ticker.clone(),
                PositionDetail {
                    shares: holding.shares,
                    price: Some(price),
                    value: Some(value),
                },
            );
        }

        for (ticker, live) in observed {
            self.last_prices.insert(ticker, live);
        }

        Snapshot {
            date,
            portfolio_value: total,
            positions,
            kind: SnapshotKind::Computed,
        }
    }

    fn carried_forward(&self, state: &PortfolioState, date: NaiveDate) -> Snapshot {
        let positions = state
            .holdings()
            .iter()
            .map(|(ticker, holding)| {
                let price = self.last_prices.get(ticker).copied();
                (
                    ticker.clone(),
                    PositionDetail {
                        shares: holding.shares,
                        price,
                        value: price.map(|p| holding.shares * p),
                    },
                )
            })
            .collect();

        Snapshot {
            date,
            portfolio_value: state.total_value,
            positions,
            kind: SnapshotKind::CarriedForward,
        }
    }
}
