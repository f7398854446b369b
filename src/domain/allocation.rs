//! Target weight allocation: constrained equal weight.
//!
//! The only policy the engine ships is equal weight with per-asset bounds,
//! behind a tickers-in/weights-out contract so other schemes could slot in.

use crate::domain::error::QuantfolioError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationBounds {
    pub min_weight: f64,
    pub max_weight: f64,
}

impl AllocationBounds {
    pub fn validate(&self) -> Result<(), QuantfolioError> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.min_weight) || !in_range(self.max_weight) {
            return Err(QuantfolioError::ConfigInvalid {
                section: "allocation".into(),
                key: "min_weight".into(),
                reason: "allocation bounds must be between 0 and 1".into(),
            });
        }
        if self.min_weight > self.max_weight {
            return Err(QuantfolioError::ConfigInvalid {
                section: "allocation".into(),
                key: "min_weight".into(),
                reason: "min_weight must not exceed max_weight".into(),
            });
        }
        Ok(())
    }
}

/// A ticker's target weight, in candidate ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetWeight {
    pub ticker: String,
    pub weight: f64,
}

/// Clamp equal weights into the bounds and renormalize to sum 1.
///
/// Assumes the feasibility shrink already ran; callers outside this module
/// reach it through [`target_weights`].
fn clamp_and_renormalize(tickers: &[String], bounds: AllocationBounds) -> Vec<TargetWeight> {
    let base = 1.0 / tickers.len() as f64;
    let clamped: Vec<f64> = tickers
        .iter()
        .map(|_| base.clamp(bounds.min_weight, bounds.max_weight))
        .collect();
    let sum: f64 = clamped.iter().sum();
    tickers
        .iter()
        .zip(clamped)
        .map(|(ticker, w)| TargetWeight {
            ticker: ticker.clone(),
            weight: w / sum,
        })
        .collect()
}

/// Compute bounded equal weights for the ranked candidate tickers.
///
/// When `count * min_weight > 1` the floor cannot hold for every candidate:
/// the list shrinks to `floor(1 / min_weight)` keeping the highest-ranked
/// tickers, then re-checks. Converging to zero candidates yields an empty
/// allocation, which is a valid outcome. Otherwise each weight lies in
/// `[min_weight, max_weight]` and the weights sum to 1.
pub fn target_weights(tickers: &[String], bounds: AllocationBounds) -> Vec<TargetWeight> {
    let mut kept: Vec<String> = tickers.to_vec();

    while !kept.is_empty() && bounds.min_weight * kept.len() as f64 > 1.0 {
        let feasible = (1.0 / bounds.min_weight).floor() as usize;
        if feasible >= kept.len() {
            // Floating-point boundary: the product barely exceeds 1 but the
            // floor does not shrink the list. Drop one to guarantee progress.
            kept.pop();
        } else {
            kept.truncate(feasible);
        }
    }

    if kept.is_empty() {
        return Vec::new();
    }

    clamp_and_renormalize(&kept, bounds)
}
