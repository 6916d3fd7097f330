//! Output module for run summaries and status reports
//!
//! This module handles:
//! - Logging what a sync run extracted, abandoned and delivered
//! - Reporting the persisted watermark and snapshot for `--status`

pub mod stats;
mod summary;

pub use stats::{load_statistics, print_statistics, StoreStatistics};
pub use summary::{log_summary, RunSummary};
