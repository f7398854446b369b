//! Configuration validation.
//!
//! Every configuration error is reported before any simulation step runs;
//! data problems after this point only ever degrade, never abort.

use crate::domain::error::QuantfolioError;
use crate::domain::schedule::RebalanceFrequency;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

/// Defaults for optional config keys. Validation and the config builder both
/// read these, so a config that validates builds to exactly these values.
pub const DEFAULT_INITIAL_VALUE: f64 = 100_000.0;
pub const DEFAULT_FREQUENCY: &str = "monthly";
pub const DEFAULT_LOOKBACK_YEARS: i64 = 3;
pub const DEFAULT_MAX_ASSETS: i64 = 10;
pub const DEFAULT_MIN_WEIGHT: f64 = 0.05;
pub const DEFAULT_MAX_WEIGHT: f64 = 0.20;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    validate_dates(config)?;
    validate_initial_value(config)?;
    validate_frequency(config)?;
    validate_lookback(config)?;
    validate_universe(config)?;
    validate_selection(config)?;
    validate_allocation(config)?;
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    if start >= end {
        return Err(QuantfolioError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, QuantfolioError> {
    match config.get_string("backtest", key) {
        None => Err(QuantfolioError::ConfigMissing {
            section: "backtest".to_string(),
            key: key.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
            QuantfolioError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            }
        }),
    }
}

fn validate_initial_value(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let value = config.get_double("backtest", "initial_value", DEFAULT_INITIAL_VALUE);
    if value <= 0.0 {
        return Err(QuantfolioError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_value".to_string(),
            reason: "initial_value must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_frequency(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let value = config
        .get_string("backtest", "rebalance_frequency")
        .unwrap_or_else(|| DEFAULT_FREQUENCY.to_string());
    value.parse::<RebalanceFrequency>().map(|_| ())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let value = config.get_int("backtest", "lookback_years", DEFAULT_LOOKBACK_YEARS);
    if value < 1 {
        return Err(QuantfolioError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "lookback_years".to_string(),
            reason: "lookback_years must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_universe(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let tickers = config.get_list("backtest", "tickers");
    if tickers.is_empty() {
        return Err(QuantfolioError::ConfigMissing {
            section: "backtest".to_string(),
            key: "tickers".to_string(),
        });
    }
    Ok(())
}

fn validate_selection(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let min_quality = config.get_int("selection", "min_quality_score", 0);
    if !(0..=9).contains(&min_quality) {
        return Err(QuantfolioError::ConfigInvalid {
            section: "selection".to_string(),
            key: "min_quality_score".to_string(),
            reason: "min_quality_score must be between 0 and 9".to_string(),
        });
    }

    let min_value = config.get_double("selection", "min_value_score", 0.0);
    if !(0.0..=1.0).contains(&min_value) {
        return Err(QuantfolioError::ConfigInvalid {
            section: "selection".to_string(),
            key: "min_value_score".to_string(),
            reason: "min_value_score must be between 0 and 1".to_string(),
        });
    }

    if config.get_int("selection", "top_n", 0) < 0 {
        return Err(QuantfolioError::ConfigInvalid {
            section: "selection".to_string(),
            key: "top_n".to_string(),
            reason: "top_n must be non-negative".to_string(),
        });
    }

    if config.get_int("selection", "max_assets", DEFAULT_MAX_ASSETS) < 1 {
        return Err(QuantfolioError::ConfigInvalid {
            section: "selection".to_string(),
            key: "max_assets".to_string(),
            reason: "max_assets must be at least 1".to_string(),
        });
    }

    Ok(())
}

fn validate_allocation(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let min = config.get_double("allocation", "min_weight", DEFAULT_MIN_WEIGHT);
    let max = config.get_double("allocation", "max_weight", DEFAULT_MAX_WEIGHT);
    crate::domain::allocation::AllocationBounds {
        min_weight: min,
        max_weight: max,
    }
    .validate()
}
