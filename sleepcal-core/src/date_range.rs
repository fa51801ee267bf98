//! Date range of sleep data to fetch.

use chrono::{NaiveDate, TimeDelta};

use crate::constants::DEFAULT_DAYS_BACK;

/// Inclusive range of days, as the sleep API expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The last `days` days up to and including `today`.
    pub fn days_back(days: i64, today: NaiveDate) -> Result<Self, String> {
        Ok(DateRange {
            start: days_before(today, days)?,
            end: today,
        })
    }

    /// Build a range from optional YYYY-MM-DD arguments.
    /// - `from` defaults to `days_back` days before `to`
    /// - `to` defaults to `today`
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        days_back: Option<i64>,
        today: NaiveDate,
    ) -> Result<Self, String> {
        let end = match to {
            Some(s) => parse_date(s)?,
            None => today,
        };

        let start = match from {
            Some(s) => parse_date(s)?,
            None => days_before(end, days_back.unwrap_or(DEFAULT_DAYS_BACK))?,
        };

        if start > end {
            return Err(format!(
                "Start date {} is after end date {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ));
        }

        Ok(DateRange { start, end })
    }

    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

fn days_before(end: NaiveDate, days: i64) -> Result<NaiveDate, String> {
    if days < 0 {
        return Err(format!("Days back must not be negative, got {}", days));
    }
    TimeDelta::try_days(days)
        .and_then(|delta| end.checked_sub_signed(delta))
        .ok_or_else(|| format!("Days back {} goes past the earliest supported date", days))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
