//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;

use crate::adapters::csv_fundamentals_adapter::CsvFundamentalsAdapter;
use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fscore_adapter::FScoreAdapter;
use crate::domain::allocation::AllocationBounds;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::config_validation::{
    validate_backtest_config, DEFAULT_FREQUENCY, DEFAULT_INITIAL_VALUE, DEFAULT_LOOKBACK_YEARS,
    DEFAULT_MAX_ASSETS, DEFAULT_MAX_WEIGHT, DEFAULT_MIN_WEIGHT,
};
use crate::domain::error::QuantfolioError;
use crate::domain::fundamentals::{default_value_metrics, metric_direction};
use crate::domain::metrics::Metrics;
use crate::domain::schedule::{rebalance_dates, RebalanceFrequency};
use crate::domain::selection::SelectionFilters;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "quantfolio", about = "Fundamental-scoring portfolio backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the report output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the rebalance schedule for a configuration
    Schedule {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest_command(&config, output.as_ref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Schedule { config } => run_schedule(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = QuantfolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_backtest_command(config_path: &PathBuf, output_override: Option<&PathBuf>) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate
    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Build BacktestConfig
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Wire up data adapters
    let fundamentals_file = match adapter.get_string("data", "fundamentals_file") {
        Some(f) => f,
        None => {
            let err = QuantfolioError::ConfigMissing {
                section: "data".into(),
                key: "fundamentals_file".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };
    let price_dir = match adapter.get_string("data", "price_dir") {
        Some(d) => d,
        None => {
            let err = QuantfolioError::ConfigMissing {
                section: "data".into(),
                key: "price_dir".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };

    let fundamentals_port = CsvFundamentalsAdapter::new(PathBuf::from(fundamentals_file));
    let price_port = CsvPriceAdapter::new(PathBuf::from(price_dir));
    let scoring_port = FScoreAdapter::new();

    // Stage 5: Run the engine
    eprintln!(
        "Running backtest: {} tickers, {} to {}",
        bt_config.universe.len(),
        bt_config.start_date,
        bt_config.end_date,
    );

    let result = match run_backtest(&bt_config, &fundamentals_port, &price_port, &scoring_port) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 6: Compute metrics and print console summary to stderr
    let risk_free_rate = adapter.get_double("backtest", "risk_free_rate", 0.04);
    let metrics = Metrics::compute(&result.history, bt_config.initial_value, risk_free_rate);

    eprintln!("\n=== Backtest Results ===");
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Rebalances:       {}", result.rebalances);
    if result.degraded_rebalances > 0 {
        eprintln!("Degraded:         {}", result.degraded_rebalances);
    }
    eprintln!("Final Value:      {:.2}", result.final_state.total_value);

    // Stage 7: Persist the daily history
    let output_dir = output_override
        .cloned()
        .or_else(|| adapter.get_string("report", "output_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("results"));

    let report_port = CsvReportAdapter::new(&output_dir);
    match report_port.write(&result.history) {
        Ok(path) => {
            eprintln!("\nResults written to: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, QuantfolioError> {
    let start_date = require_date(adapter, "start_date")?;
    let end_date = require_date(adapter, "end_date")?;

    let frequency: RebalanceFrequency = adapter
        .get_string("backtest", "rebalance_frequency")
        .unwrap_or_else(|| DEFAULT_FREQUENCY.to_string())
        .parse()?;

    let universe = parse_tickers(&adapter.get_list("backtest", "tickers"))?;

    let filters = SelectionFilters {
        min_quality_score: adapter.get_int("selection", "min_quality_score", 0),
        min_value_score: adapter.get_double("selection", "min_value_score", 0.0),
        top_n: adapter.get_int("selection", "top_n", 0) as usize,
        max_assets: adapter.get_int("selection", "max_assets", DEFAULT_MAX_ASSETS) as usize,
    };

    let bounds = AllocationBounds {
        min_weight: adapter.get_double("allocation", "min_weight", DEFAULT_MIN_WEIGHT),
        max_weight: adapter.get_double("allocation", "max_weight", DEFAULT_MAX_WEIGHT),
    };

    let configured_metrics = adapter.get_list("scoring", "metrics");
    let value_metrics = if configured_metrics.is_empty() {
        default_value_metrics()
    } else {
        let known: Vec<String> = configured_metrics
            .into_iter()
            .filter(|m| {
                if metric_direction(m).is_none() {
                    eprintln!("warning: unrecognized value metric '{}' ignored", m);
                    false
                } else {
                    true
                }
            })
            .collect();
        if known.is_empty() {
            return Err(QuantfolioError::ConfigInvalid {
                section: "scoring".into(),
                key: "metrics".into(),
                reason: "no recognized value metrics configured".into(),
            });
        }
        known
    };

    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_value: adapter.get_double("backtest", "initial_value", DEFAULT_INITIAL_VALUE),
        frequency,
        lookback_years: adapter.get_int("backtest", "lookback_years", DEFAULT_LOOKBACK_YEARS),
        universe,
        filters,
        bounds,
        value_metrics,
    })
}

fn require_date(adapter: &dyn ConfigPort, key: &str) -> Result<NaiveDate, QuantfolioError> {
    let raw = adapter
        .get_string("backtest", key)
        .ok_or_else(|| QuantfolioError::ConfigMissing {
            section: "backtest".into(),
            key: key.into(),
        })?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| QuantfolioError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

/// Uppercase and deduplicate-check the configured ticker list.
pub fn parse_tickers(raw: &[String]) -> Result<Vec<String>, QuantfolioError> {
    let tickers: Vec<String> = raw.iter().map(|t| t.to_uppercase()).collect();
    let mut seen = std::collections::BTreeSet::new();
    for ticker in &tickers {
        if !seen.insert(ticker.clone()) {
            return Err(QuantfolioError::ConfigInvalid {
                section: "backtest".into(),
                key: "tickers".into(),
                reason: format!("duplicate ticker '{}'", ticker),
            });
        }
    }
    Ok(tickers)
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = build_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Config validated successfully");
    ExitCode::SUCCESS
}

fn run_schedule(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let dates = rebalance_dates(bt_config.start_date, bt_config.end_date, bt_config.frequency);
    println!(
        "{} rebalance dates ({} to {}):",
        dates.len(),
        bt_config.start_date,
        bt_config.end_date
    );
    for date in dates {
        println!("{}", date.format("%Y-%m-%d"));
    }
    ExitCode::SUCCESS
}

fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Config validated successfully");

    eprintln!("\nRun plan:");
    eprintln!("  window:     {} to {}", bt_config.start_date, bt_config.end_date);
    eprintln!("  frequency:  {:?}", bt_config.frequency);
    eprintln!("  initial:    {:.2}", bt_config.initial_value);
    eprintln!("  universe:   {}", bt_config.universe.join(", "));
    eprintln!("  metrics:    {}", bt_config.value_metrics.join(", "));
    eprintln!(
        "  weights:    [{:.2}, {:.2}]",
        bt_config.bounds.min_weight, bt_config.bounds.max_weight
    );

    let dates = rebalance_dates(bt_config.start_date, bt_config.end_date, bt_config.frequency);
    eprintln!("\nRebalance dates ({}):", dates.len());
    for date in dates {
        eprintln!("  {}", date.format("%Y-%m-%d"));
    }

    ExitCode::SUCCESS
}
