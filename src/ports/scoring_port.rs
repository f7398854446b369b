//! Scoring function port trait.

use crate::domain::fundamentals::{FundamentalRow, FundamentalsTable};

pub trait ScoringPort {
    /// Fundamental-strength score for one row, bounded 0..=9.
    fn quality_score(&self, row: &FundamentalRow) -> i64;

    /// Composite value scores in [0, 1], aligned to `table` row order.
    /// Cross-sectional: each row's score depends on the whole table.
    fn value_scores(&self, table: &FundamentalsTable, metrics: &[String]) -> Vec<f64>;
}
