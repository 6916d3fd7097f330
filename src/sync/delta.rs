//! Delta computation against the watermark

use crate::config::DeliveryOrder;
use crate::model::{parse_portal_date, DayEntry, IntervalRecord, UsageTree, Watermark};
use chrono::NaiveDate;
use serde_json::{json, Value};

/// One day queued for delivery, flattened with its ancestors
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    pub year: String,
    pub month: String,
    pub week_start_date: String,
    pub week_end_date: Option<String>,

    /// Day key exactly as stored in the tree
    pub day_key: String,

    /// Calendar date of `day_key`, used for watermark comparisons
    pub day_date: NaiveDate,

    pub day_total_kwh: Option<f64>,
    pub intervals: Vec<IntervalRecord>,
}

impl DeliveryRecord {
    fn from_entry(entry: &DayEntry<'_>, day_date: NaiveDate) -> Self {
        Self {
            year: entry.year.to_string(),
            month: entry.month.to_string(),
            week_start_date: entry.week.start_date.clone(),
            week_end_date: entry.week.end_date.clone(),
            day_key: entry.date.to_string(),
            day_date,
            day_total_kwh: entry.day.day_total_kwh,
            intervals: entry.day.intervals.clone(),
        }
    }

    /// JSON body posted to the sink
    ///
    /// The day total is the entity state; everything else rides along as
    /// attributes. An unknown total is sent as `null`.
    pub fn payload(&self) -> Value {
        json!({
            "state": self.day_total_kwh,
            "attributes": {
                "year": self.year,
                "month": self.month,
                "week_start_date": self.week_start_date,
                "week_end_date": self.week_end_date,
                "day_date": self.day_key,
                "intervals": self.intervals,
            }
        })
    }
}

/// Selects the days of `tree` newer than `watermark`
///
/// With no watermark every day is selected. Comparison is on calendar dates
/// only, strictly after the watermark. Days whose key is not a date are left
/// out, since they could never move the watermark.
pub fn compute_delta(
    watermark: Watermark,
    tree: &UsageTree,
    order: DeliveryOrder,
) -> Vec<DeliveryRecord> {
    tracing::info!("Last sent data: {:?}", watermark);

    let mut delta = Vec::new();
    for entry in tree.days() {
        let Some(day_date) = parse_portal_date(entry.date) else {
            tracing::warn!("Day '{}' has no readable date, not delivering it", entry.date);
            continue;
        };

        if watermark.is_some_and(|last| day_date <= last) {
            continue;
        }

        delta.push(DeliveryRecord::from_entry(&entry, day_date));
    }

    if order == DeliveryOrder::Chronological {
        delta.sort_by_key(|record| record.day_date);
    }

    tracing::info!("New data to send: {} records.", delta.len());
    delta
}
