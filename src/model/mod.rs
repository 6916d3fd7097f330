//! Data model for extracted usage history
//!
//! # Components
//!
//! - `MonthRecord`, `WeekRecord`, `DayRecord`, `IntervalRecord`: what the level
//!   extractors produce
//! - `UsageTree`: the snapshot assembled by one traversal
//! - `Watermark`: the date of the last day the sink acknowledged

mod dates;
mod records;
mod tree;

pub use dates::parse_portal_date;
pub use records::{DayRecord, Granularity, IntervalRecord, MonthRecord, WeekRecord};
pub use tree::{DayEntry, DayNode, MonthNode, UsageTree, WeekNode, YearNode};

/// Date of the last successfully delivered day, `None` if nothing was ever sent
pub type Watermark = Option<chrono::NaiveDate>;
