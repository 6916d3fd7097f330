//! Depth-first drill-down over the usage hierarchy
//!
//! The controller walks months → weeks → days → intervals in page order. At
//! each node it reveals all children, extracts them, and descends into each
//! child by clicking its bar. The tree shape is only known as it is revealed.
//!
//! Failures are contained per node: a child that cannot be opened, a view
//! with no children, or a view that will not stop paginating costs only that
//! subtree. Siblings are still visited and the walk always completes.

use crate::config::Config;
use crate::extract::{extract_days, extract_intervals, extract_months, extract_weeks};
use crate::model::{
    DayNode, DayRecord, Granularity, MonthRecord, UsageTree, WeekNode, WeekRecord,
};
use crate::page::{ClickOutcome, Locator, PageProvider};
use crate::portal::layout;
use crate::traversal::{AbandonReason, Abandoned, Paginator, Traversal, TraversalReport};
use std::collections::HashSet;
use std::time::Duration;

/// Drives one traversal over a page provider positioned on the usage-history view
pub struct TraversalController<'a> {
    page: &'a mut dyn PageProvider,
    paginator: Paginator,
    element_wait: Duration,
    tree: UsageTree,
    report: TraversalReport,
    seen_days: HashSet<String>,
}

impl<'a> TraversalController<'a> {
    pub fn new(page: &'a mut dyn PageProvider, paginator: Paginator, element_wait: Duration) -> Self {
        Self {
            page,
            paginator,
            element_wait,
            tree: UsageTree::new(),
            report: TraversalReport::default(),
            seen_days: HashSet::new(),
        }
    }

    pub fn from_config(page: &'a mut dyn PageProvider, config: &Config) -> Self {
        Self::new(
            page,
            Paginator::from_config(config),
            config.timeouts.element(),
        )
    }

    /// Runs the full walk and returns whatever could be extracted
    pub async fn run(mut self) -> Traversal {
        tracing::info!("Extracting usage history (months, weeks, days, intervals)...");

        if let Some(months) = self
            .reveal_children(Granularity::Year, "usage history", extract_months)
            .await
        {
            for month in months {
                self.visit_month(month).await;
            }
        }

        self.report.months = self.tree.month_count();
        self.report.weeks = self.tree.week_count();
        self.report.days = self.tree.day_count();
        self.report.intervals = self.tree.interval_count();

        tracing::info!(
            "Traversal finished: {} months, {} weeks, {} days, {} intervals, {} subtrees abandoned",
            self.report.months,
            self.report.weeks,
            self.report.days,
            self.report.intervals,
            self.report.abandoned.len()
        );

        Traversal {
            tree: self.tree,
            report: self.report,
        }
    }

    async fn visit_month(&mut self, month: MonthRecord) {
        // The month is recorded before descending, so a month that cannot be
        // opened still shows up in the snapshot with no weeks.
        if self.tree.month_entry(&month).is_none() {
            tracing::warn!(
                "Skipping month with unreadable start date '{}'",
                month.start_date
            );
            self.abandon(
                Granularity::Month,
                &month.start_date,
                AbandonReason::UnreadableKey,
            );
            return;
        }

        let key = month.start_date.as_str();
        if !self
            .descend(Granularity::Month, key, layout::month_link(key))
            .await
        {
            return;
        }

        let Some(weeks) = self
            .reveal_children(Granularity::Month, key, extract_weeks)
            .await
        else {
            return;
        };

        let mut visited = Vec::with_capacity(weeks.len());
        for week in &weeks {
            if let Some(node) = self.visit_week(week).await {
                visited.push(node);
            }
        }

        if let Some(node) = self.tree.month_entry(&month) {
            node.weeks.extend(visited);
        }
    }

    /// Returns the week with its days, or `None` if the week was abandoned
    async fn visit_week(&mut self, week: &WeekRecord) -> Option<WeekNode> {
        let key = week.start_date.as_str();
        if !self
            .descend(Granularity::Week, key, layout::week_link(key))
            .await
        {
            return None;
        }

        let days = self
            .reveal_children(Granularity::Week, key, extract_days)
            .await?;

        let mut node = WeekNode::from_record(week);
        for day in &days {
            if let Some(day_node) = self.visit_day(day).await {
                node.days.insert(day.date.clone(), day_node);
            }
        }

        Some(node)
    }

    async fn visit_day(&mut self, day: &DayRecord) -> Option<DayNode> {
        let key = day.date.as_str();
        if self.seen_days.contains(key) {
            tracing::debug!("Day {} already recorded under another week, skipping", key);
            self.report.duplicate_days += 1;
            return None;
        }

        if !self
            .descend(Granularity::Day, key, layout::day_link(key))
            .await
        {
            return None;
        }

        let intervals = match self.page.current_content().await {
            Ok(html) => extract_intervals(&html),
            Err(e) => {
                tracing::error!("Could not read day {}: {}", key, e);
                self.abandon(Granularity::Day, key, AbandonReason::Page(e.to_string()));
                return None;
            }
        };

        if intervals.is_empty() {
            tracing::warn!("No intervals found for day {}", key);
        }

        self.seen_days.insert(key.to_string());
        Some(DayNode::new(day, intervals))
    }

    /// Paginates the current view and extracts the children of `level`
    ///
    /// Returns `None` (and records the abandonment) when the view overflows
    /// pagination, cannot be read, or has no children.
    async fn reveal_children<T>(
        &mut self,
        level: Granularity,
        key: &str,
        extract: fn(&str) -> Vec<T>,
    ) -> Option<Vec<T>> {
        match self.paginator.exhaust(&mut *self.page).await {
            Ok(reveals) => self.report.reveals += reveals,
            Err(reason) => {
                tracing::error!("Abandoning {} {}: {}", level, key, reason);
                self.abandon(level, key, reason);
                return None;
            }
        }

        let html = match self.page.current_content().await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Could not read {} {}: {}", level, key, e);
                self.abandon(level, key, AbandonReason::Page(e.to_string()));
                return None;
            }
        };

        let children = extract(&html);
        if children.is_empty() {
            let child = level.child().unwrap_or(level);
            tracing::warn!("No {}s found for {} {}.", child, level, key);
            self.abandon(level, key, AbandonReason::NoChildren(child));
            return None;
        }

        Some(children)
    }

    /// Clicks into a child and waits for its view; `false` abandons the child
    async fn descend(&mut self, level: Granularity, key: &str, locator: Locator) -> bool {
        tracing::info!("Opening {} {}...", level, key);

        let result = match self.page.find_and_click(&locator, self.element_wait).await {
            Ok(ClickOutcome::Clicked) => self
                .page
                .wait_until_loaded()
                .await
                .map_err(|e| AbandonReason::Page(e.to_string())),
            Ok(ClickOutcome::NotFound) => Err(AbandonReason::NotFound),
            Ok(ClickOutcome::NotInteractable) => Err(AbandonReason::NotInteractable),
            Err(e) => Err(AbandonReason::Page(e.to_string())),
        };

        match result {
            Ok(()) => true,
            Err(reason) => {
                tracing::error!(
                    "Could not open {} {}: {}. Continuing to next {}.",
                    level,
                    key,
                    reason,
                    level
                );
                self.dump_page_for_diagnosis().await;
                self.abandon(level, key, reason);
                false
            }
        }
    }

    async fn dump_page_for_diagnosis(&mut self) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        if let Ok(html) = self.page.current_content().await {
            tracing::debug!("Current page content for diagnosis:\n{}", html);
        }
    }

    fn abandon(&mut self, level: Granularity, key: &str, reason: AbandonReason) {
        self.report.abandoned.push(Abandoned {
            level,
            key: key.to_string(),
            reason,
        });
    }
}
