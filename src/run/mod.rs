//! One sync run from login to snapshot
//!
//! A run reads the watermark, opens a browser session, logs in, walks the
//! usage history, delivers the delta and persists the snapshot. The browser
//! session is released on every path, including fatal errors.

use crate::config::Config;
use crate::output::{log_summary, RunSummary};
use crate::page::{PageProvider, WebDriverPage};
use crate::portal::{login, open_usage_history};
use crate::storage::{JsonStore, UsageStore};
use crate::sync::{compute_delta, deliver_all, DeliverySink, HomeAssistantSink};
use crate::traversal::{traverse, Paginator};
use crate::Result;
use chrono::Utc;

/// Orchestrates a single run over injected collaborators
pub struct SyncRun<'a> {
    config: &'a Config,
}

impl<'a> SyncRun<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Runs against the configured WebDriver server, sink and files
    ///
    /// # Errors
    ///
    /// Any fatal failure: unreadable state, no browser session, login or
    /// navigation failure, or a store write that did not go through.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut store = JsonStore::from_config(&self.config.storage);
        let sink = HomeAssistantSink::from_config(&self.config.sink, &self.config.timeouts)?;
        let mut page = WebDriverPage::start(&self.config.webdriver, &self.config.timeouts).await?;

        self.run_with(&mut page, &sink, &mut store).await
    }

    /// Runs with the given page provider, sink and store
    ///
    /// `page` is closed before returning, whatever the outcome.
    pub async fn run_with(
        &self,
        page: &mut dyn PageProvider,
        sink: &dyn DeliverySink,
        store: &mut dyn UsageStore,
    ) -> Result<RunSummary> {
        let result = self.sync(page, sink, store).await;

        if let Err(e) = page.close().await {
            tracing::warn!("Could not close browser session: {}", e);
        }

        match &result {
            Ok(summary) => log_summary(summary),
            Err(e) => tracing::error!("Run failed: {}", e),
        }
        result
    }

    async fn sync(
        &self,
        page: &mut dyn PageProvider,
        sink: &dyn DeliverySink,
        store: &mut dyn UsageStore,
    ) -> Result<RunSummary> {
        let started_at = Utc::now();
        let starting_watermark = store.load_watermark()?;

        login(page, &self.config.portal, &self.config.timeouts).await?;
        open_usage_history(
            page,
            &self.config.timeouts,
            &Paginator::from_config(self.config),
        )
        .await?;

        let traversal = traverse(page, self.config).await;

        let delta = compute_delta(starting_watermark, &traversal.tree, self.config.sync.order);
        let delivery = deliver_all(
            &delta,
            sink,
            store,
            starting_watermark,
            self.config.sync.watermark_policy,
        )
        .await?;

        store.save_snapshot(&traversal.tree)?;

        Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            starting_watermark,
            traversal: traversal.report,
            delta: delta.len(),
            delivery,
        })
    }
}
