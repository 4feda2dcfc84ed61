use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use serde::Deserialize;

use crate::error::AppError;

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `?days=` window used by the `recent` endpoints.
#[derive(Debug, Deserialize)]
pub struct Days {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

impl Days {
    /// Start of the window ending `today`. Windows reaching past the
    /// calendar start at its first day.
    pub fn since(&self, today: NaiveDate) -> NaiveDate {
        self.window()
            .and_then(|window| today.checked_sub_signed(window))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Same window, ending at an instant rather than a day.
    pub fn since_time(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.window()
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(NaiveDateTime::MIN)
    }

    fn window(&self) -> Option<TimeDelta> {
        TimeDelta::try_days(self.days.max(0))
    }
}

#[derive(Debug, Deserialize)]
pub struct Limit {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

/// Treats an absent or blank query parameter as unset.
pub fn param(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parses a label filter, rejecting values outside the closed set.
pub fn label<T>(value: &Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = ledger::LedgerError>,
{
    param(value)
        .map(str::parse)
        .transpose()
        .map_err(AppError::from)
}
