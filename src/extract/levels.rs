//! One extractor per granularity
//!
//! Each function maps a markup snapshot to the children visible at the next
//! level down. They never fail: a missing container gives an empty list, a
//! malformed reading becomes `None`.

use crate::extract::numbers::{parse_kwh, parse_kwh_attr};
use crate::model::{DayRecord, IntervalRecord, MonthRecord, WeekRecord};
use crate::portal::layout::{
    DAILY_CONTAINER, INTERVAL_CONTAINER, MONTHLY_CONTAINER, SELECT_DAY, SELECT_MONTH,
    SELECT_WEEK, WEEKLY_CONTAINER, YEARLY_CONTAINER,
};
use scraper::{ElementRef, Html, Selector};

/// Extracts month bars from the yearly view
pub fn extract_months(html: &str) -> Vec<MonthRecord> {
    let document = Html::parse_document(html);

    let months: Vec<MonthRecord> = bar_anchors(&document, YEARLY_CONTAINER, SELECT_MONTH)
        .into_iter()
        .filter_map(|a| {
            let start_date = navigation_key(&a, "data-start-date")?;
            Some(MonthRecord {
                start_date,
                end_date: a.value().attr("data-end-date").map(str::to_string),
                total_kwh: parse_kwh_attr(a.value().attr("data-total-usage")),
            })
        })
        .collect();

    tracing::debug!("Extracted {} months", months.len());
    months
}

/// Extracts week bars from the monthly view
pub fn extract_weeks(html: &str) -> Vec<WeekRecord> {
    let document = Html::parse_document(html);

    let weeks: Vec<WeekRecord> = bar_anchors(&document, MONTHLY_CONTAINER, SELECT_WEEK)
        .into_iter()
        .filter_map(|a| {
            let start_date = navigation_key(&a, "data-start-date")?;
            Some(WeekRecord {
                start_date,
                end_date: a.value().attr("data-end-date").map(str::to_string),
                total_kwh: parse_kwh_attr(a.value().attr("data-total-usage")),
            })
        })
        .collect();

    tracing::debug!("Extracted {} weeks", weeks.len());
    weeks
}

/// Extracts day bars from the weekly view
pub fn extract_days(html: &str) -> Vec<DayRecord> {
    let document = Html::parse_document(html);

    let days: Vec<DayRecord> = bar_anchors(&document, WEEKLY_CONTAINER, SELECT_DAY)
        .into_iter()
        .filter_map(|a| {
            let date = navigation_key(&a, "data-date")?;
            Some(DayRecord {
                date,
                total_kwh: parse_kwh_attr(a.value().attr("data-total-usage")),
            })
        })
        .collect();

    tracing::debug!("Extracted {} days", days.len());
    days
}

/// Extracts 15-minute readings from the daily view, in page order
///
/// Readings live in the `title` of each `span.bar-span` inside the hour
/// blocks, formatted `"<time>, <usage> kWh"`. Titles that do not split into
/// exactly two parts are ignored.
pub fn extract_intervals(html: &str) -> Vec<IntervalRecord> {
    let document = Html::parse_document(html);
    let mut intervals = Vec::new();

    let Some(daily) = first_match(document.root_element(), &format!("div#{}", DAILY_CONTAINER))
    else {
        return intervals;
    };
    let Some(container) = first_match(daily, &format!("div#{}", INTERVAL_CONTAINER)) else {
        return intervals;
    };

    let (Ok(hour_selector), Ok(span_selector)) =
        (Selector::parse("div.hour"), Selector::parse("span.bar-span"))
    else {
        return intervals;
    };

    for hour in container.select(&hour_selector) {
        for span in hour.select(&span_selector) {
            if let Some(interval) = span.value().attr("title").and_then(parse_interval_title) {
                intervals.push(interval);
            }
        }
    }

    tracing::debug!("Extracted {} intervals", intervals.len());
    intervals
}

/// Parses `"12:15 AM, 0.25 kWh"` into an interval
fn parse_interval_title(title: &str) -> Option<IntervalRecord> {
    let parts: Vec<&str> = title.split(',').collect();
    if parts.len() != 2 {
        return None;
    }

    Some(IntervalRecord {
        time: parts[0].trim().to_string(),
        kwh: parse_kwh(parts[1]),
    })
}

/// Returns the bar anchors of one level
///
/// Only the first `div.usage-right` inside the container is considered; the
/// left-hand side of a level carries summary links with the same markup.
fn bar_anchors<'a>(document: &'a Html, container_id: &str, marker: &str) -> Vec<ElementRef<'a>> {
    let Some(container) = first_match(document.root_element(), &format!("div#{}", container_id))
    else {
        return Vec::new();
    };
    let Some(usage_right) = first_match(container, "div.usage-right") else {
        return Vec::new();
    };

    match Selector::parse(&format!(r#"a.bar-a[data-usage="{}"]"#, marker)) {
        Ok(selector) => usage_right.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// First descendant of `scope` matching `css`
fn first_match<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

/// Non-empty attribute used to descend into a child
///
/// Anchors without one cannot be navigated to and are skipped.
fn navigation_key(anchor: &ElementRef<'_>, attribute: &str) -> Option<String> {
    let key = anchor.value().attr(attribute)?.trim();
    if key.is_empty() {
        tracing::trace!("Skipping bar without {}", attribute);
        return None;
    }
    Some(key.to_string())
}
