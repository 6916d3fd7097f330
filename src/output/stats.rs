//! Statistics over the persisted state
//!
//! Backs the `--status` mode: what was last delivered and what the most
//! recent snapshot contains, without touching the portal.

use crate::model::{parse_portal_date, Watermark};
use crate::output::summary::format_watermark;
use crate::storage::{StorageResult, UsageStore};
use chrono::NaiveDate;

/// Summary of the persisted watermark and snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStatistics {
    pub watermark: Watermark,

    pub months: usize,
    pub weeks: usize,
    pub days: usize,
    pub intervals: usize,

    /// Earliest and latest day in the snapshot
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,

    /// Snapshot days after the watermark, i.e. what the next run would send
    /// if the portal showed nothing new
    pub undelivered_days: usize,

    /// Days with no known daily total
    pub days_without_total: usize,
}

/// Loads statistics from storage
pub fn load_statistics(store: &dyn UsageStore) -> StorageResult<StoreStatistics> {
    let watermark = store.load_watermark()?;
    let tree = store.load_snapshot()?;

    let dates: Vec<NaiveDate> = tree
        .days()
        .filter_map(|entry| parse_portal_date(entry.date))
        .collect();

    let undelivered_days = dates
        .iter()
        .filter(|date| watermark.map_or(true, |last| **date > last))
        .count();

    Ok(StoreStatistics {
        watermark,
        months: tree.month_count(),
        weeks: tree.week_count(),
        days: tree.day_count(),
        intervals: tree.interval_count(),
        first_day: dates.iter().min().copied(),
        last_day: dates.iter().max().copied(),
        undelivered_days,
        days_without_total: tree
            .days()
            .filter(|entry| entry.day.day_total_kwh.is_none())
            .count(),
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Sync Status ===\n");

    println!("Watermark:");
    println!("  Last delivered day: {}", format_watermark(stats.watermark));
    println!();

    println!("Last Snapshot:");
    if stats.days == 0 {
        println!("  (empty)");
        return;
    }
    println!("  Months: {}", stats.months);
    println!("  Weeks: {}", stats.weeks);
    println!("  Days: {}", stats.days);
    println!("  Intervals: {}", stats.intervals);
    if let (Some(first), Some(last)) = (stats.first_day, stats.last_day) {
        println!("  Range: {} to {}", first, last);
    }
    if stats.days_without_total > 0 {
        println!("  Days without a total: {}", stats.days_without_total);
    }
    println!();

    println!("Not yet delivered: {} days", stats.undelivered_days);
}
