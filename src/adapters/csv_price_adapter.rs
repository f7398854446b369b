//! CSV price file adapter.
//!
//! One `{TICKER}.csv` file per ticker under a base directory, with
//! `date,adj_close` rows. Tickers without a file contribute no column,
//! mirroring a provider that has no data for them; the resulting table may
//! be empty, which the engine treats as data unavailability.

use crate::domain::error::QuantfolioError;
use crate::domain::prices::PriceTable;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn load_ticker(
        &self,
        table: &mut PriceTable,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), QuantfolioError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            eprintln!("warning: no price file for {} ({})", ticker, path.display());
            return Ok(());
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| QuantfolioError::Data {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        for result in rdr.records() {
            let record = result.map_err(|e| QuantfolioError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| QuantfolioError::Data {
                reason: format!("missing date column in {}", path.display()),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                QuantfolioError::Data {
                    reason: format!("invalid date in {}: {}", path.display(), e),
                }
            })?;

            if date < start || date > end {
                continue;
            }

            let price_str = record.get(1).ok_or_else(|| QuantfolioError::Data {
                reason: format!("missing price column in {}", path.display()),
            })?;
            // Empty cells are gaps, not errors.
            if price_str.trim().is_empty() {
                continue;
            }
            let price: f64 = price_str.trim().parse().map_err(|e| QuantfolioError::Data {
                reason: format!("invalid price in {}: {}", path.display(), e),
            })?;

            table.insert(date, ticker, price);
        }

        Ok(())
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, QuantfolioError> {
        let mut table = PriceTable::new();
        for ticker in tickers {
            self.load_ticker(&mut table, ticker, start, end)?;
        }
        Ok(table)
    }
}
