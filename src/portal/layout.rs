//! Markup contract of the usage-history page
//!
//! All five levels live on one page: a container per level, each holding a
//! `div.usage-right` with one `a.bar-a` anchor per child. Clicking an anchor
//! re-renders the containers below it. Descend locators are scoped to the
//! parent container because a month and its first week can share a start date.

use crate::page::Locator;

pub const YEARLY_CONTAINER: &str = "yearly-usage";
pub const MONTHLY_CONTAINER: &str = "monthly-usage";
pub const WEEKLY_CONTAINER: &str = "weekly-usage";
pub const DAILY_CONTAINER: &str = "daily-usage";
pub const INTERVAL_CONTAINER: &str = "interval-usage";

pub const SELECT_MONTH: &str = "selectMonth";
pub const SELECT_WEEK: &str = "selectWeek";
pub const SELECT_DAY: &str = "selectDay";

/// The "Show 6 More" trigger present on every paginated level
pub const SHOW_MORE_SELECTOR: &str = r#"[data-usage="showSixMore"]"#;

pub const LOGIN_USERNAME_SELECTOR: &str = "#login-username";
pub const LOGIN_PASSWORD_SELECTOR: &str = "#login-password";
pub const LOGIN_SUBMIT_SELECTOR: &str = "#login-submit";
pub const MY_BILL_SELECTOR: &str = r#"ul#nav a[href="/my-bill"]"#;
pub const USAGE_HISTORY_LINK_TEXT: &str = "Usage History";

pub fn show_more() -> Locator {
    Locator::css(SHOW_MORE_SELECTOR)
}

/// Anchor for the month starting at `start_date` in the yearly view
pub fn month_link(start_date: &str) -> Locator {
    bar_link(YEARLY_CONTAINER, SELECT_MONTH, "data-start-date", start_date)
}

/// Anchor for the week starting at `start_date` in the monthly view
pub fn week_link(start_date: &str) -> Locator {
    bar_link(MONTHLY_CONTAINER, SELECT_WEEK, "data-start-date", start_date)
}

/// Anchor for `date` in the weekly view
pub fn day_link(date: &str) -> Locator {
    bar_link(WEEKLY_CONTAINER, SELECT_DAY, "data-date", date)
}

/// Bars are read from the `usage-right` side only; the left side repeats the markup
fn bar_link(container: &str, marker: &str, attribute: &str, value: &str) -> Locator {
    Locator::css(format!(
        r#"#{} .usage-right a.bar-a[data-usage="{}"][{}="{}"]"#,
        container,
        marker,
        attribute,
        escape_css_string(value)
    ))
}

/// Escapes a value for use inside a double-quoted CSS attribute selector
fn escape_css_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
