//! End-of-run summary

use crate::model::Watermark;
use crate::sync::DeliveryReport;
use crate::traversal::TraversalReport;
use chrono::{DateTime, Utc};

/// Everything one sync run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Watermark read at run start
    pub starting_watermark: Watermark,

    pub traversal: TraversalReport,

    /// Days newer than the starting watermark
    pub delta: usize,

    pub delivery: DeliveryReport,
}

impl RunSummary {
    pub fn duration_seconds(&self) -> u64 {
        (self.finished_at - self.started_at).num_seconds().max(0) as u64
    }

    /// True when nothing was abandoned and every delivery went through
    pub fn is_clean(&self) -> bool {
        self.traversal.is_complete() && self.delivery.failed.is_empty()
    }
}

/// Writes the summary to the log
pub fn log_summary(summary: &RunSummary) {
    let traversal = &summary.traversal;
    tracing::info!(
        "Extracted {} months, {} weeks, {} days, {} intervals ({} reveals)",
        traversal.months,
        traversal.weeks,
        traversal.days,
        traversal.intervals,
        traversal.reveals
    );

    if traversal.duplicate_days > 0 {
        tracing::info!(
            "{} days were listed under more than one week and kept once",
            traversal.duplicate_days
        );
    }

    for abandoned in &traversal.abandoned {
        tracing::warn!(
            "Abandoned {} {}: {}",
            abandoned.level,
            abandoned.key,
            abandoned.reason
        );
    }

    tracing::info!(
        "Delivered {} of {} new days; watermark {} -> {}",
        summary.delivery.delivered,
        summary.delta,
        format_watermark(summary.starting_watermark),
        format_watermark(summary.delivery.watermark)
    );

    let pending = summary.delivery.pending_retry();
    if !pending.is_empty() {
        tracing::warn!(
            "Not delivered (will be retried next run): {}",
            pending.join(", ")
        );
    }

    let skipped = summary.delivery.skipped_for_good();
    if !skipped.is_empty() {
        tracing::error!(
            "Not delivered and behind the watermark, these days will not be sent again: {}",
            skipped.join(", ")
        );
    }

    tracing::info!("Run finished in {}s", summary.duration_seconds());
}

pub(crate) fn format_watermark(watermark: Watermark) -> String {
    match watermark {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "never".to_string(),
    }
}
