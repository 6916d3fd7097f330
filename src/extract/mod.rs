//! Level extractors
//!
//! Pure functions from a rendered page to typed child records, one per
//! granularity below the year. See `portal::layout` for the markup they read.

mod levels;
mod numbers;

pub use levels::{extract_days, extract_intervals, extract_months, extract_weeks};
pub use numbers::{parse_kwh, parse_kwh_attr};
