//! Rebalance schedule generation.
//!
//! Produces the ordered sequence of business-day-aligned period-start dates
//! (first business day of each month, quarter, or year) intersected with the
//! backtest window. An empty schedule means "no rebalances", not an error.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::str::FromStr;

use crate::domain::error::QuantfolioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceFrequency {
    Monthly,
    Quarterly,
    Annually,
}

impl FromStr for RebalanceFrequency {
    type Err = QuantfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(RebalanceFrequency::Monthly),
            "quarterly" => Ok(RebalanceFrequency::Quarterly),
            "annually" => Ok(RebalanceFrequency::Annually),
            other => Err(QuantfolioError::ConfigInvalid {
                section: "backtest".into(),
                key: "rebalance_frequency".into(),
                reason: format!(
                    "unknown frequency '{}' (expected monthly, quarterly, or annually)",
                    other
                ),
            }),
        }
    }
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First Monday-to-Friday date on or after `date`.
pub fn next_business_day(mut date: NaiveDate) -> NaiveDate {
    while !is_business_day(date) {
        date += Duration::days(1);
    }
    date
}

/// All business days in `[start, end]`, inclusive, in ascending order.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        if is_business_day(date) {
            days.push(date);
        }
        date += Duration::days(1);
    }
    days
}

/// Rebalance dates for the window: the first business day of each period
/// whose first calendar day lies in `[start, end]`, filtered to the window.
///
/// Strictly increasing and de-duplicated by construction. Empty when no
/// period start falls inside the window.
pub fn rebalance_dates(
    start: NaiveDate,
    end: NaiveDate,
    frequency: RebalanceFrequency,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut year = start.year();
    let mut month = start.month();

    loop {
        // None only for out-of-range years, which the loop bound prevents.
        let Some(period_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            break;
        };
        if period_start > end {
            break;
        }

        let aligned = match frequency {
            RebalanceFrequency::Monthly => true,
            RebalanceFrequency::Quarterly => matches!(month, 1 | 4 | 7 | 10),
            RebalanceFrequency::Annually => month == 1,
        };

        if aligned {
            let reb = next_business_day(period_start);
            if reb >= start && reb <= end {
                dates.push(reb);
            }
        }

        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }

    dates
}
