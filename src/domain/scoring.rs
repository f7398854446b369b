//! Scored asset records.
//!
//! Pairs each fundamentals row with its quality and value scores via the
//! injected [`ScoringPort`]. Records keep the provider's row order so that
//! downstream sorting stays stable on ties.

use crate::domain::fundamentals::FundamentalsTable;
use crate::ports::scoring_port::ScoringPort;

/// One candidate asset at a rebalance: ticker plus derived scores.
/// Produced fresh each rebalance, never mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub ticker: String,
    /// Bounded integer fundamental-strength indicator (0..=9).
    pub quality_score: i64,
    /// Bounded composite valuation indicator in [0, 1].
    pub value_score: f64,
}

/// Annotate every row of `table` with its scores, preserving row order.
pub fn score_universe(
    table: &FundamentalsTable,
    scoring: &dyn ScoringPort,
    value_metrics: &[String],
) -> Vec<AssetRecord> {
    let value_scores = scoring.value_scores(table, value_metrics);
    table
        .rows()
        .iter()
        .zip(value_scores)
        .map(|(row, value_score)| AssetRecord {
            ticker: row.ticker.clone(),
            quality_score: scoring.quality_score(row),
            value_score,
        })
        .collect()
}
