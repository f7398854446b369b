//! Summary statistics over the daily value series.

use crate::domain::history::History;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl Metrics {
    pub fn compute(history: &History, initial_value: f64, risk_free_rate: f64) -> Self {
        let values: Vec<f64> = history.value_series().iter().map(|&(_, v)| v).collect();

        let final_value = values.last().copied().unwrap_or(initial_value);
        let total_return = if initial_value > 0.0 {
            (final_value - initial_value) / initial_value
        } else {
            0.0
        };

        let years = values.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio: sharpe(&values, daily_rf),
            max_drawdown: max_drawdown(&values),
        }
    }
}

fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

fn sharpe(values: &[f64], daily_rf: f64) -> f64 {
    let returns = daily_returns(values);
    if returns.is_empty() {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return 0.0;
    }
    (mean - daily_rf) / std_dev * TRADING_DAYS_PER_YEAR.sqrt()
}

fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &value in values {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
