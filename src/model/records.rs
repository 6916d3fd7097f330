//! Records produced by the level extractors
//!
//! Each record carries the attribute used to descend into it one level down:
//! a start date for months and weeks, an exact date for days.

use crate::model::dates::parse_portal_date;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One level of the usage hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Year,
    Month,
    Week,
    Day,
    Interval,
}

impl Granularity {
    /// The level one step down, `None` below intervals
    pub fn child(&self) -> Option<Self> {
        match self {
            Self::Year => Some(Self::Month),
            Self::Month => Some(Self::Week),
            Self::Week => Some(Self::Day),
            Self::Day => Some(Self::Interval),
            Self::Interval => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Interval => "interval",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A month bar in the yearly view
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRecord {
    pub start_date: String,
    pub end_date: Option<String>,
    pub total_kwh: Option<f64>,
}

impl MonthRecord {
    /// Year and month keys as they appear in the data file (`"2024"`, `"3"`)
    pub fn period_keys(&self) -> Option<(String, String)> {
        let start = parse_portal_date(&self.start_date)?;
        Some((start.year().to_string(), start.month().to_string()))
    }
}

/// A week bar in the monthly view
#[derive(Debug, Clone, PartialEq)]
pub struct WeekRecord {
    pub start_date: String,
    pub end_date: Option<String>,
    pub total_kwh: Option<f64>,
}

/// A day bar in the weekly view
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: String,
    pub total_kwh: Option<f64>,
}

/// One 15-minute reading from the daily view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRecord {
    /// Time-of-day label exactly as rendered, e.g. `"12:15 AM"`
    pub time: String,
    pub kwh: Option<f64>,
}
