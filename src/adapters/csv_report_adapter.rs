//! CSV report writer.
//!
//! Writes the full daily history to a timestamped file under the configured
//! output directory, one row per snapshot. Holdings are packed into a single
//! column as `TICKER:shares@price` entries joined with `;`, so the file stays
//! one-row-per-day regardless of how many assets a period holds.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::error::QuantfolioError;
use crate::domain::history::{History, PositionDetail, SnapshotKind};
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }
}

fn kind_label(kind: SnapshotKind) -> &'static str {
    match kind {
        SnapshotKind::Computed => "computed",
        SnapshotKind::CarriedForward => "carried_forward",
        SnapshotKind::Cash => "cash",
    }
}

fn format_position(ticker: &str, detail: &PositionDetail) -> String {
    match detail.price {
        Some(price) => format!("{}:{:.6}@{:.4}", ticker, detail.shares, price),
        None => format!("{}:{:.6}@-", ticker, detail.shares),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, history: &History) -> Result<PathBuf, QuantfolioError> {
        fs::create_dir_all(&self.output_dir)?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .output_dir
            .join(format!("backtest_results_{}.csv", stamp));

        let mut writer = csv::Writer::from_path(&path).map_err(|e| QuantfolioError::Report {
            reason: format!("cannot create {}: {}", path.display(), e),
        })?;

        writer
            .write_record(["date", "portfolio_value", "kind", "holdings"])
            .map_err(|e| QuantfolioError::Report {
                reason: format!("write failed: {}", e),
            })?;

        for snapshot in history.snapshots() {
            let holdings = snapshot
                .positions
                .iter()
                .map(|(ticker, detail)| format_position(ticker, detail))
                .collect::<Vec<_>>()
                .join(";");

            writer
                .write_record([
                    snapshot.date.format("%Y-%m-%d").to_string(),
                    format!("{:.2}", snapshot.portfolio_value),
                    kind_label(snapshot.kind).to_string(),
                    holdings,
                ])
                .map_err(|e| QuantfolioError::Report {
                    reason: format!("write failed: {}", e),
                })?;
        }

        writer.flush()?;
        Ok(path)
    }
}
