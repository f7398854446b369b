//! Portfolio state: total value plus the current holdings map.
//!
//! Holdings are immutable per holding period and replaced wholesale at each
//! successful rebalance; the swap is the only mutation the engine performs.

use std::collections::BTreeMap;

/// A position entered at a rebalance.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub shares: f64,
    pub entry_price: f64,
    /// Target weight at construction time.
    pub weight: f64,
}

/// The single mutable entity carried across rebalance iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub total_value: f64,
    holdings: BTreeMap<String, Holding>,
}

impl PortfolioState {
    /// All-cash starting state.
    pub fn new(initial_value: f64) -> Self {
        PortfolioState {
            total_value: initial_value,
            holdings: BTreeMap::new(),
        }
    }

    /// Replace the holdings map atomically, preserving total value.
    pub fn with_holdings(&self, holdings: BTreeMap<String, Holding>) -> Self {
        PortfolioState {
            total_value: self.total_value,
            holdings,
        }
    }

    /// Liquidate to cash: empty holdings, value preserved.
    pub fn to_cash(&self) -> Self {
        self.with_holdings(BTreeMap::new())
    }

    pub fn is_cash(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn holdings(&self) -> &BTreeMap<String, Holding> {
        &self.holdings
    }

    pub fn holding(&self, ticker: &str) -> Option<&Holding> {
        self.holdings.get(ticker)
    }

    /// Invested cash at entry: sum of shares × entry price.
    pub fn invested_value(&self) -> f64 {
        self.holdings
            .values()
            .map(|h| h.shares * h.entry_price)
            .sum()
    }
}
