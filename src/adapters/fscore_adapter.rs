//! Piotroski F-Score and value composite scoring adapter.
//!
//! Quality: the classic nine accounting signals, one point each, scored from
//! current/prior fundamental pairs. A signal with missing inputs scores
//! zero, so partial fundamentals degrade the score rather than erroring.
//!
//! Value: for each configured metric, direction-adjusted percentile rank
//! across the universe; an asset's composite is the mean of its available
//! metric ranks, in [0, 1].

use crate::domain::fundamentals::{
    metric_direction, FundamentalRow, FundamentalsTable, MetricDirection,
};
use crate::ports::scoring_port::ScoringPort;

#[derive(Default)]
pub struct FScoreAdapter;

impl FScoreAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// One point when both inputs exist and `test` holds.
fn signal(a: Option<f64>, b: Option<f64>, test: impl Fn(f64, f64) -> bool) -> i64 {
    match (a, b) {
        (Some(a), Some(b)) if test(a, b) => 1,
        _ => 0,
    }
}

impl ScoringPort for FScoreAdapter {
    fn quality_score(&self, row: &FundamentalRow) -> i64 {
        let g = |key: &str| row.get(key);
        let mut score = 0;

        // Profitability.
        score += signal(g("returnOnAssets"), Some(0.0), |roa, z| roa > z);
        score += signal(g("operatingCashflow"), Some(0.0), |cfo, z| cfo > z);
        score += signal(g("returnOnAssets"), g("priorReturnOnAssets"), |c, p| c > p);
        score += signal(g("operatingCashflow"), g("netIncome"), |cfo, ni| cfo > ni);

        // Leverage, liquidity, dilution.
        score += signal(g("longTermDebt"), g("priorLongTermDebt"), |c, p| c < p);
        score += signal(g("currentRatio"), g("priorCurrentRatio"), |c, p| c > p);
        score += signal(g("sharesOutstanding"), g("priorSharesOutstanding"), |c, p| {
            c <= p
        });

        // Operating efficiency.
        score += signal(g("grossMargin"), g("priorGrossMargin"), |c, p| c > p);
        score += signal(g("assetTurnover"), g("priorAssetTurnover"), |c, p| c > p);

        score
    }

    fn value_scores(&self, table: &FundamentalsTable, metrics: &[String]) -> Vec<f64> {
        let rows = table.rows();
        let n = rows.len();
        let mut sums = vec![0.0_f64; n];
        let mut counts = vec![0usize; n];

        for metric in metrics {
            let Some(direction) = metric_direction(metric) else {
                eprintln!("warning: unrecognized value metric '{}' ignored", metric);
                continue;
            };

            let values: Vec<Option<f64>> = rows.iter().map(|r| r.get(metric)).collect();
            let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
            if present.is_empty() {
                continue;
            }

            for (i, value) in values.iter().enumerate() {
                let Some(v) = *value else { continue };
                let rank = percentile_rank(&present, v, direction);
                sums[i] += rank;
                counts[i] += 1;
            }
        }

        (0..n)
            .map(|i| if counts[i] > 0 { sums[i] / counts[i] as f64 } else { 0.0 })
            .collect()
    }
}

/// Fraction of the universe this value beats, direction-adjusted. Ties share
/// a rank; a single-asset universe scores 0.5.
fn percentile_rank(universe: &[f64], value: f64, direction: MetricDirection) -> f64 {
    if universe.len() < 2 {
        return 0.5;
    }
    let beaten = universe
        .iter()
        .filter(|&&other| match direction {
            MetricDirection::HigherIsBetter => value > other,
            MetricDirection::LowerIsBetter => value < other,
        })
        .count();
    beaten as f64 / (universe.len() - 1) as f64
}
