//! Scripted in-memory portal
//!
//! A single page whose lower containers re-render when a bar is clicked, the
//! way the usage-history view behaves. Each listing reveals six bars at a
//! time behind a "Show 6 More" trigger.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use usage_drill::config::{load_config_with_env, Config};
use usage_drill::page::{ClickOutcome, Locator, PageError, PageProvider, PageResult};
use usage_drill::portal::layout;

const PAGE_SIZE: usize = 6;

#[derive(Debug, Clone)]
pub struct FakeDay {
    pub date: String,
    pub total: String,
    pub intervals: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct FakeWeek {
    pub start: String,
    pub end: String,
    pub total: String,
    pub days: Vec<FakeDay>,
}

#[derive(Debug, Clone)]
pub struct FakeMonth {
    pub start: String,
    pub end: String,
    pub total: String,
    pub weeks: Vec<FakeWeek>,
}

pub fn day(date: &str, total: &str) -> FakeDay {
    FakeDay {
        date: date.to_string(),
        total: total.to_string(),
        intervals: vec![
            ("12:00 AM".to_string(), "0.25 kWh".to_string()),
            ("12:15 AM".to_string(), "0.5 kWh".to_string()),
        ],
    }
}

pub fn week(start: &str, end: &str, days: Vec<FakeDay>) -> FakeWeek {
    FakeWeek {
        start: start.to_string(),
        end: end.to_string(),
        total: "100.0".to_string(),
        days,
    }
}

pub fn month(start: &str, end: &str, weeks: Vec<FakeWeek>) -> FakeMonth {
    FakeMonth {
        start: start.to_string(),
        end: end.to_string(),
        total: "400.0".to_string(),
        weeks,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Blank,
    Login,
    Landing,
    MyBill,
    UsageHistory,
}

pub struct FakePortal {
    months: Vec<FakeMonth>,
    stage: Stage,

    month: Option<usize>,
    week: Option<usize>,
    day: Option<usize>,

    months_shown: usize,
    weeks_shown: usize,
    days_shown: usize,

    /// Bar keys whose click reports the element as not interactable
    pub broken: HashSet<String>,

    /// The trigger never goes away on the listing currently paginated
    pub endless_show_more: bool,

    /// The login form never appears
    pub login_form_missing: bool,

    /// The usage-history view never renders its yearly container
    pub usage_history_missing: bool,

    /// Every bar and trigger click, in order
    pub clicks: Vec<String>,

    pub typed: Vec<String>,
    pub closed: bool,
}

impl FakePortal {
    pub fn new(months: Vec<FakeMonth>) -> Self {
        Self {
            months,
            stage: Stage::Blank,
            month: None,
            week: None,
            day: None,
            months_shown: PAGE_SIZE,
            weeks_shown: PAGE_SIZE,
            days_shown: PAGE_SIZE,
            broken: HashSet::new(),
            endless_show_more: false,
            login_form_missing: false,
            usage_history_missing: false,
            clicks: Vec::new(),
            typed: Vec::new(),
            closed: false,
        }
    }

    /// Puts the portal straight onto the usage-history view
    pub fn on_usage_history(months: Vec<FakeMonth>) -> Self {
        let mut portal = Self::new(months);
        portal.stage = Stage::UsageHistory;
        portal
    }

    pub fn break_bar(&mut self, key: &str) {
        self.broken.insert(key.to_string());
    }

    fn weeks(&self) -> &[FakeWeek] {
        self.month
            .map(|m| self.months[m].weeks.as_slice())
            .unwrap_or(&[])
    }

    fn days(&self) -> &[FakeDay] {
        match (self.month, self.week) {
            (Some(m), Some(w)) => &self.months[m].weeks[w].days,
            _ => &[],
        }
    }

    /// Total and shown count of the deepest open listing
    fn active_listing(&self) -> (usize, usize) {
        if self.week.is_some() {
            (self.days().len(), self.days_shown)
        } else if self.month.is_some() {
            (self.weeks().len(), self.weeks_shown)
        } else {
            (self.months.len(), self.months_shown)
        }
    }

    fn has_hidden_bars(&self) -> bool {
        if self.stage != Stage::UsageHistory {
            return false;
        }
        let (total, shown) = self.active_listing();
        self.endless_show_more || shown < total
    }

    fn reveal_more(&mut self) {
        if self.week.is_some() {
            self.days_shown += PAGE_SIZE;
        } else if self.month.is_some() {
            self.weeks_shown += PAGE_SIZE;
        } else {
            self.months_shown += PAGE_SIZE;
        }
    }

    fn click_bar(&mut self, locator: &Locator) -> ClickOutcome {
        let month_hit = self.months[..self.months_shown.min(self.months.len())]
            .iter()
            .position(|m| layout::month_link(&m.start) == *locator);
        if let Some(index) = month_hit {
            let key = self.months[index].start.clone();
            return self.select(&key, |portal| {
                portal.month = Some(index);
                portal.week = None;
                portal.day = None;
                portal.weeks_shown = PAGE_SIZE;
            });
        }

        let week_hit = self.weeks()[..self.weeks_shown.min(self.weeks().len())]
            .iter()
            .position(|w| layout::week_link(&w.start) == *locator);
        if let Some(index) = week_hit {
            let key = self.weeks()[index].start.clone();
            return self.select(&key, |portal| {
                portal.week = Some(index);
                portal.day = None;
                portal.days_shown = PAGE_SIZE;
            });
        }

        let day_hit = self.days()[..self.days_shown.min(self.days().len())]
            .iter()
            .position(|d| layout::day_link(&d.date) == *locator);
        if let Some(index) = day_hit {
            let key = self.days()[index].date.clone();
            return self.select(&key, |portal| portal.day = Some(index));
        }

        ClickOutcome::NotFound
    }

    fn select(&mut self, key: &str, apply: impl FnOnce(&mut Self)) -> ClickOutcome {
        self.clicks.push(key.to_string());
        if self.broken.contains(key) {
            return ClickOutcome::NotInteractable;
        }
        apply(self);
        ClickOutcome::Clicked
    }

    fn render_usage_history(&self) -> String {
        let mut html = String::from("<html><body>");

        html.push_str(r#"<div id="yearly-usage"><div class="usage-right">"#);
        for m in self.months.iter().take(self.months_shown) {
            html.push_str(&format!(
                r#"<a class="bar-a" data-usage="selectMonth" data-start-date="{}" data-end-date="{}" data-total-usage="{}"></a>"#,
                m.start, m.end, m.total
            ));
        }
        html.push_str("</div></div>");

        html.push_str(r#"<div id="monthly-usage"><div class="usage-right">"#);
        for w in self.weeks().iter().take(self.weeks_shown) {
            html.push_str(&format!(
                r#"<a class="bar-a" data-usage="selectWeek" data-start-date="{}" data-end-date="{}" data-total-usage="{}"></a>"#,
                w.start, w.end, w.total
            ));
        }
        html.push_str("</div></div>");

        html.push_str(r#"<div id="weekly-usage"><div class="usage-right">"#);
        for d in self.days().iter().take(self.days_shown) {
            html.push_str(&format!(
                r#"<a class="bar-a" data-usage="selectDay" data-date="{}" data-total-usage="{}"></a>"#,
                d.date, d.total
            ));
        }
        html.push_str("</div></div>");

        html.push_str(r#"<div id="daily-usage"><div id="interval-usage"><div class="hour">"#);
        if let Some(d) = self.day {
            for (time, usage) in &self.days()[d].intervals {
                html.push_str(&format!(
                    r#"<span class="bar-span" title="{}, {}"></span>"#,
                    time, usage
                ));
            }
        }
        html.push_str("</div></div></div>");

        if self.has_hidden_bars() {
            html.push_str(r#"<button data-usage="showSixMore">Show 6 More</button>"#);
        }

        html.push_str("</body></html>");
        html
    }
}

#[async_trait]
impl PageProvider for FakePortal {
    async fn navigate(&mut self, _url: &str) -> PageResult<()> {
        self.stage = Stage::Login;
        Ok(())
    }

    async fn wait_until_loaded(&mut self) -> PageResult<()> {
        if self.closed {
            return Err(PageError::Protocol("session closed".to_string()));
        }
        Ok(())
    }

    async fn find_and_click(
        &mut self,
        locator: &Locator,
        _wait: Duration,
    ) -> PageResult<ClickOutcome> {
        if *locator == layout::show_more() {
            if !self.has_hidden_bars() {
                return Ok(ClickOutcome::NotFound);
            }
            self.clicks.push("show-more".to_string());
            self.reveal_more();
            return Ok(ClickOutcome::Clicked);
        }

        let next = match (self.stage, locator) {
            (Stage::Login, Locator::Css(css)) if css == layout::LOGIN_SUBMIT_SELECTOR => {
                Some(Stage::Landing)
            }
            (Stage::Landing, Locator::Css(css)) if css == layout::MY_BILL_SELECTOR => {
                Some(Stage::MyBill)
            }
            (Stage::MyBill, Locator::PartialLinkText(text))
                if text == layout::USAGE_HISTORY_LINK_TEXT =>
            {
                Some(Stage::UsageHistory)
            }
            _ => None,
        };
        if let Some(stage) = next {
            self.stage = stage;
            return Ok(ClickOutcome::Clicked);
        }

        if self.stage != Stage::UsageHistory {
            return Ok(ClickOutcome::NotFound);
        }
        Ok(self.click_bar(locator))
    }

    async fn current_content(&mut self) -> PageResult<String> {
        match self.stage {
            Stage::UsageHistory => Ok(self.render_usage_history()),
            _ => Ok("<html><body></body></html>".to_string()),
        }
    }

    async fn wait_for(&mut self, locator: &Locator, _wait: Duration) -> PageResult<bool> {
        if *locator == layout::show_more() {
            return Ok(self.has_hidden_bars());
        }

        let present = match (self.stage, locator) {
            (Stage::Login, Locator::Css(css)) if css == layout::LOGIN_USERNAME_SELECTOR => {
                !self.login_form_missing
            }
            (Stage::Landing, Locator::Css(css)) => css == layout::MY_BILL_SELECTOR,
            (Stage::MyBill, Locator::PartialLinkText(text)) => {
                text == layout::USAGE_HISTORY_LINK_TEXT
            }
            (Stage::UsageHistory, Locator::Css(css)) => {
                !self.usage_history_missing && *css == format!("#{}", layout::YEARLY_CONTAINER)
            }
            _ => false,
        };
        Ok(present)
    }

    async fn type_text(&mut self, _locator: &Locator, text: &str) -> PageResult<()> {
        self.typed.push(text.to_string());
        Ok(())
    }

    async fn close(&mut self) -> PageResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Loads a test configuration whose state and data files live in `dir`
pub fn test_config(dir: &Path, sink_url: &str, extra: &str) -> Config {
    let path = dir.join("usage-drill.toml");
    let toml = format!(
        r#"
[portal]
login-url = "https://portal.example.com/login"
username = "customer"
password = "hunter2"

[timeouts]
element-secs = 1
show-more-secs = 1

[traversal]
max-show-more = 5

[sink]
url = "{}"
token = "secret"

[storage]
state-path = "{}"
data-path = "{}"
{}
"#,
        sink_url,
        dir.join("state.json").display(),
        dir.join("usage.json").display(),
        extra
    );
    std::fs::write(&path, toml).unwrap();
    load_config_with_env(&path, |_| None).unwrap()
}

/// Two months, the first spanning more than one page of weeks
pub fn sample_history() -> Vec<FakeMonth> {
    vec![
        month(
            "2024-02-01",
            "2024-02-29",
            vec![week(
                "2024-02-25",
                "2024-03-02",
                vec![day("2024-02-26", "20.0"), day("2024-02-27", "21.0")],
            )],
        ),
        month(
            "2024-03-01",
            "2024-03-31",
            vec![
                week(
                    "2024-03-03",
                    "2024-03-09",
                    vec![day("2024-03-03", "10.0"), day("2024-03-04", "11.0")],
                ),
                week(
                    "2024-03-10",
                    "2024-03-16",
                    vec![day("2024-03-10", "12.0"), day("2024-03-11", "abc")],
                ),
            ],
        ),
    ]
}
