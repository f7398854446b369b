//! Append-only run history.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// How a day's snapshot was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Valued from live (or cached) prices.
    Computed,
    /// Prior day's total copied forward (data gap or unreliable valuation).
    CarriedForward,
    /// No holdings; value is the cash balance.
    Cash,
}

/// One held ticker's detail on a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionDetail {
    pub shares: f64,
    /// Price used for the day's valuation (live or last known).
    pub price: Option<f64>,
    pub value: Option<f64>,
}

/// Daily portfolio record. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub portfolio_value: f64,
    pub positions: BTreeMap<String, PositionDetail>,
    pub kind: SnapshotKind,
}

/// Accumulates snapshots across the whole run, in date order.
#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// The daily value series, for metrics and downstream tools.
    pub fn value_series(&self) -> Vec<(NaiveDate, f64)> {
        self.snapshots
            .iter()
            .map(|s| (s.date, s.portfolio_value))
            .collect()
    }
}
