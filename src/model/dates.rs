//! Date parsing for the values the portal puts in `data-*` attributes
//!
//! The portal mixes plain dates (`2024-03-05`) and timestamps
//! (`2024-03-01T00:00:00Z`, `2024-03-01T00:00:00.000-05:00`). Only the calendar
//! date matters downstream.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses a portal date or timestamp into its calendar date
///
/// Returns `None` for anything that is not an ISO-8601 date or date-time.
pub fn parse_portal_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    // Timestamps without an offset, or a bare Z without seconds
    let local = raw.strip_suffix('Z').unwrap_or(raw);
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(local, format) {
            return Some(dt.date());
        }
    }

    None
}
