//! Historical price provider port trait.

use chrono::NaiveDate;

use crate::domain::error::QuantfolioError;
use crate::domain::prices::PriceTable;

pub trait PricePort {
    /// One batched request per ticker set and window. An empty table signals
    /// "no data available"; missing cells inside a non-empty table are
    /// handled by the engine's fallback logic.
    fn fetch_prices(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, QuantfolioError>;
}
