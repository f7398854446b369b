//! CSV fundamentals snapshot adapter.
//!
//! A single CSV with a `ticker` column followed by metric columns; row order
//! is preserved (value-score ties break on it). A missing file or an
//! unlisted ticker is "no data", not an error, per the provider contract.

use crate::domain::error::QuantfolioError;
use crate::domain::fundamentals::{FundamentalRow, FundamentalsTable};
use crate::ports::fundamentals_port::FundamentalsPort;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub struct CsvFundamentalsAdapter {
    path: PathBuf,
}

impl CsvFundamentalsAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl FundamentalsPort for CsvFundamentalsAdapter {
    fn fetch_fundamentals(&self, tickers: &[String]) -> Result<FundamentalsTable, QuantfolioError> {
        let mut table = FundamentalsTable::new();

        if !self.path.exists() {
            eprintln!(
                "warning: fundamentals file not found: {}",
                self.path.display()
            );
            return Ok(table);
        }

        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| QuantfolioError::Data {
            reason: format!("failed to open {}: {}", self.path.display(), e),
        })?;

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| QuantfolioError::Data {
                reason: format!("CSV header error in {}: {}", self.path.display(), e),
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.first().map(String::as_str) != Some("ticker") {
            return Err(QuantfolioError::Data {
                reason: format!(
                    "fundamentals file {} must start with a 'ticker' column",
                    self.path.display()
                ),
            });
        }

        let wanted: BTreeSet<&str> = tickers.iter().map(String::as_str).collect();

        for result in rdr.records() {
            let record = result.map_err(|e| QuantfolioError::Data {
                reason: format!("CSV parse error in {}: {}", self.path.display(), e),
            })?;

            let Some(ticker) = record.get(0).map(str::trim) else {
                continue;
            };
            if !wanted.contains(ticker) {
                continue;
            }

            let mut row = FundamentalRow::new(ticker);
            for (metric, cell) in headers.iter().skip(1).zip(record.iter().skip(1)) {
                // Blank cells are missing metrics; non-numeric cells too.
                if let Ok(value) = cell.trim().parse::<f64>() {
                    row.set(metric, value);
                }
            }
            table.push(row);
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(content: &str) -> (TempDir, CsvFundamentalsAdapter) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fundamentals.csv");
        fs::write(&path, content).unwrap();
        (dir, CsvFundamentalsAdapter::new(path))
    }

    fn universe(tickers: &[&str]) -> Vec<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn parses_requested_rows_in_file_order() {
        let (_dir, adapter) = write_fixture(
            "ticker,trailingPE,priceToBook\n\
             VALE3,4.2,1.1\n\
             PETR4,3.5,0.9\n\
             ITUB4,8.0,1.6\n",
        );
        let table = adapter
            .fetch_fundamentals(&universe(&["PETR4", "VALE3"]))
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].ticker, "VALE3");
        assert_eq!(table.rows()[1].ticker, "PETR4");
        assert_eq!(table.rows()[1].get("trailingPE"), Some(3.5));
    }

    #[test]
    fn blank_and_bad_cells_are_missing_metrics() {
        let (_dir, adapter) = write_fixture(
            "ticker,trailingPE,netMargin\n\
             PETR4,,n/a\n",
        );
        let table = adapter.fetch_fundamentals(&universe(&["PETR4"])).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("trailingPE"), None);
        assert_eq!(table.rows()[0].get("netMargin"), None);
    }

    #[test]
    fn missing_file_returns_empty_table() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvFundamentalsAdapter::new(dir.path().join("absent.csv"));
        let table = adapter.fetch_fundamentals(&universe(&["PETR4"])).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn rejects_file_without_ticker_column() {
        let (_dir, adapter) = write_fixture("symbol,trailingPE\nPETR4,3.5\n");
        let err = adapter
            .fetch_fundamentals(&universe(&["PETR4"]))
            .unwrap_err();
        assert!(matches!(err, QuantfolioError::Data { .. }));
    }
}
