//! Date-indexed price table.
//!
//! The price providers return one of these per request: rows keyed by date,
//! columns keyed by ticker. Missing cells are simply absent; an empty table
//! signals "no data available" rather than an error.

use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    rows: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, ticker: &str, price: f64) {
        self.rows
            .entry(date)
            .or_default()
            .insert(ticker.to_string(), price);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the table has a row (any ticker priced) for `date`.
    pub fn has_date(&self, date: NaiveDate) -> bool {
        self.rows.contains_key(&date)
    }

    pub fn price(&self, date: NaiveDate, ticker: &str) -> Option<f64> {
        self.rows.get(&date).and_then(|row| row.get(ticker)).copied()
    }

    /// First available price for `ticker` in `[from, from + lookahead_days]`.
    ///
    /// Matches the original entry-price lookup: forward-scan the lookahead
    /// window and take the earliest observation.
    pub fn first_valid(&self, ticker: &str, from: NaiveDate, lookahead_days: i64) -> Option<f64> {
        let to = from + Duration::days(lookahead_days);
        self.rows
            .range(from..=to)
            .find_map(|(_, row)| row.get(ticker).copied())
    }

    pub fn tickers(&self) -> BTreeSet<String> {
        self.rows
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect()
    }
}
