//! Fundamentals provider port trait.

use crate::domain::error::QuantfolioError;
use crate::domain::fundamentals::FundamentalsTable;

pub trait FundamentalsPort {
    /// One batched request per rebalance for the whole universe. An empty
    /// table signals "no data available" and degrades the rebalance; errors
    /// are reserved for genuinely broken sources.
    fn fetch_fundamentals(&self, tickers: &[String]) -> Result<FundamentalsTable, QuantfolioError>;
}
