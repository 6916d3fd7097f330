//! The extracted usage snapshot
//!
//! Field names and nesting match the persisted data file. Maps keep insertion
//! order so that iteration follows page order.

use crate::model::records::{DayRecord, IntervalRecord, MonthRecord, WeekRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Full snapshot of one run: year → month → weeks → day → intervals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTree {
    #[serde(default)]
    pub years: IndexMap<String, YearNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearNode {
    #[serde(default)]
    pub months: IndexMap<String, MonthNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthNode {
    pub start_date: String,
    pub end_date: Option<String>,
    #[serde(default)]
    pub month_total_kwh: Option<f64>,
    #[serde(default)]
    pub weeks: Vec<WeekNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekNode {
    pub start_date: String,
    pub end_date: Option<String>,
    #[serde(default)]
    pub week_total_kwh: Option<f64>,
    #[serde(default)]
    pub days: IndexMap<String, DayNode>,
}

impl WeekNode {
    pub fn from_record(week: &WeekRecord) -> Self {
        Self {
            start_date: week.start_date.clone(),
            end_date: week.end_date.clone(),
            week_total_kwh: week.total_kwh,
            days: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayNode {
    pub day_total_kwh: Option<f64>,
    #[serde(default)]
    pub intervals: Vec<IntervalRecord>,
}

impl DayNode {
    pub fn new(day: &DayRecord, intervals: Vec<IntervalRecord>) -> Self {
        Self {
            day_total_kwh: day.total_kwh,
            intervals,
        }
    }
}

/// A day together with its ancestors, borrowed from a tree
#[derive(Debug, Clone, Copy)]
pub struct DayEntry<'a> {
    pub year: &'a str,
    pub month: &'a str,
    pub week: &'a WeekNode,
    pub date: &'a str,
    pub day: &'a DayNode,
}

impl UsageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `month`, creating it on first sight
    ///
    /// A month already present keeps its first-seen dates and total. Returns
    /// `None` when the start date does not yield a (year, month) key.
    pub fn month_entry(&mut self, month: &MonthRecord) -> Option<&mut MonthNode> {
        let (year, month_key) = month.period_keys()?;

        let node = self
            .years
            .entry(year)
            .or_default()
            .months
            .entry(month_key)
            .or_insert_with(|| MonthNode {
                start_date: month.start_date.clone(),
                end_date: month.end_date.clone(),
                month_total_kwh: month.total_kwh,
                weeks: Vec::new(),
            });

        Some(node)
    }

    /// Iterates every day in (year, month, week, day) order
    pub fn days(&self) -> impl Iterator<Item = DayEntry<'_>> + '_ {
        self.years.iter().flat_map(|(year, y)| {
            y.months.iter().flat_map(move |(month, m)| {
                m.weeks.iter().flat_map(move |week| {
                    week.days.iter().map(move |(date, day)| DayEntry {
                        year: year.as_str(),
                        month: month.as_str(),
                        week,
                        date: date.as_str(),
                        day,
                    })
                })
            })
        })
    }

    pub fn contains_day(&self, date: &str) -> bool {
        self.days().any(|entry| entry.date == date)
    }

    pub fn month_count(&self) -> usize {
        self.years.values().map(|y| y.months.len()).sum()
    }

    pub fn week_count(&self) -> usize {
        self.years
            .values()
            .flat_map(|y| y.months.values())
            .map(|m| m.weeks.len())
            .sum()
    }

    pub fn day_count(&self) -> usize {
        self.days().count()
    }

    pub fn interval_count(&self) -> usize {
        self.days().map(|entry| entry.day.intervals.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
