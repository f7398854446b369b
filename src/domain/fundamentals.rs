//! Fundamental data rows and value-metric direction configuration.

use std::collections::BTreeMap;

/// One ticker's fundamental snapshot: named metric values as returned by the
/// fundamentals provider. Missing metrics are simply absent.
#[derive(Debug, Clone)]
pub struct FundamentalRow {
    pub ticker: String,
    values: BTreeMap<String, f64>,
}

impl FundamentalRow {
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            values: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, metric: &str, value: f64) {
        self.values.insert(metric.to_string(), value);
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

/// Fundamental rows in provider order. Row order is significant: value-score
/// ties during selection break on it.
#[derive(Debug, Clone, Default)]
pub struct FundamentalsTable {
    rows: Vec<FundamentalRow>,
}

impl FundamentalsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: FundamentalRow) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[FundamentalRow] {
        &self.rows
    }
}

/// Whether a low or a high metric value indicates better value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDirection {
    LowerIsBetter,
    HigherIsBetter,
}

/// Direction for a known value-composite metric name, `None` for
/// unrecognized metrics (the caller warns and ignores those).
pub fn metric_direction(metric: &str) -> Option<MetricDirection> {
    match metric {
        "trailingPE" | "forwardPE" | "priceToBook" | "enterpriseToEbitda" | "marketCap" => {
            Some(MetricDirection::LowerIsBetter)
        }
        "dividendYield" | "returnOnEquity" | "netMargin" => Some(MetricDirection::HigherIsBetter),
        _ => None,
    }
}

/// Default value-composite metric set.
pub fn default_value_metrics() -> Vec<String> {
    [
        "trailingPE",
        "priceToBook",
        "enterpriseToEbitda",
        "dividendYield",
        "returnOnEquity",
        "netMargin",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
