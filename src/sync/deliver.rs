//! Ordered delivery with watermark advancement

use crate::config::WatermarkPolicy;
use crate::model::{parse_portal_date, Watermark};
use crate::storage::{StorageResult, UsageStore};
use crate::sync::{DeliveryRecord, DeliverySink};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of delivering one delta
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryReport {
    pub delivered: usize,

    /// Day keys the sink did not accept, in delivery order
    pub failed: Vec<String>,

    /// Watermark after the last persisted advance
    pub watermark: Watermark,
}

impl DeliveryReport {
    /// Failed days at or before the final watermark
    ///
    /// A later success moved the watermark past them, so no future delta
    /// will offer them again.
    pub fn skipped_for_good(&self) -> Vec<&str> {
        self.failed_days(true)
    }

    /// Failed days after the final watermark; the next run offers them again
    pub fn pending_retry(&self) -> Vec<&str> {
        self.failed_days(false)
    }

    fn failed_days(&self, behind_watermark: bool) -> Vec<&str> {
        self.failed
            .iter()
            .filter(|key| {
                let behind = match (parse_portal_date(key), self.watermark) {
                    (Some(date), Some(watermark)) => date <= watermark,
                    _ => false,
                };
                behind == behind_watermark
            })
            .map(String::as_str)
            .collect()
    }
}

/// Tracks which dates of the delta are still outstanding
struct Progress {
    pending: BTreeMap<NaiveDate, usize>,
    delivered: BTreeSet<NaiveDate>,
}

impl Progress {
    fn new(delta: &[DeliveryRecord]) -> Self {
        let mut pending = BTreeMap::new();
        for record in delta {
            *pending.entry(record.day_date).or_insert(0) += 1;
        }
        Self {
            pending,
            delivered: BTreeSet::new(),
        }
    }

    fn confirm(&mut self, date: NaiveDate) {
        if let Some(count) = self.pending.get_mut(&date) {
            *count -= 1;
            if *count == 0 {
                self.pending.remove(&date);
            }
        }
        self.delivered.insert(date);
    }

    /// Latest delivered date with nothing outstanding at or before it
    fn contiguous_prefix(&self) -> Option<NaiveDate> {
        match self.pending.keys().next() {
            Some(first_pending) => self.delivered.range(..*first_pending).next_back().copied(),
            None => self.delivered.iter().next_back().copied(),
        }
    }
}

/// Delivers `delta` in order, persisting the watermark after each success
///
/// A failed delivery is logged and skipped; it neither stops the loop nor
/// moves the watermark. The watermark never goes backwards, whatever the
/// delivery order.
///
/// # Errors
///
/// Returns the store error if a watermark cannot be persisted. Deliveries
/// confirmed before that point keep their persisted watermark.
pub async fn deliver_all(
    delta: &[DeliveryRecord],
    sink: &dyn DeliverySink,
    store: &mut dyn UsageStore,
    watermark: Watermark,
    policy: WatermarkPolicy,
) -> StorageResult<DeliveryReport> {
    let mut report = DeliveryReport {
        watermark,
        ..Default::default()
    };
    let mut progress = Progress::new(delta);

    for record in delta {
        match sink.deliver(record).await {
            Ok(()) => {
                tracing::info!("Sent data for day {}.", record.day_key);
                report.delivered += 1;
                progress.confirm(record.day_date);
            }
            Err(e) => {
                tracing::error!("Failed to send data for day {}: {}", record.day_key, e);
                report.failed.push(record.day_key.clone());
                continue;
            }
        }

        let candidate = match policy {
            WatermarkPolicy::LatestSuccess => Some(record.day_date),
            WatermarkPolicy::ContiguousPrefix => progress.contiguous_prefix(),
        };

        if let Some(date) = candidate {
            if report.watermark.map_or(true, |current| date > current) {
                store.save_watermark(date)?;
                report.watermark = Some(date);
                tracing::debug!("Watermark advanced to {}", date);
            }
        }
    }

    if !report.failed.is_empty() {
        tracing::warn!(
            "{} of {} records were not delivered; watermark stays at {:?}",
            report.failed.len(),
            delta.len(),
            report.watermark
        );
    }

    Ok(report)
}
