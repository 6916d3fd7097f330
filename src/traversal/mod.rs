//! Hierarchical drill-down traversal
//!
//! This module contains the extraction walk, including:
//! - Pagination exhaustion at each node (`Paginator`)
//! - Depth-first descent with per-subtree failure isolation (`TraversalController`)
//! - A report of what was extracted and what had to be abandoned

mod controller;
mod paginator;

pub use controller::TraversalController;
pub use paginator::Paginator;

use crate::config::Config;
use crate::model::{Granularity, UsageTree};
use crate::page::PageProvider;
use thiserror::Error;

/// Why a subtree was given up on
///
/// These never abort a run; they are logged and collected in the report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbandonReason {
    #[error("navigation element not found")]
    NotFound,

    #[error("navigation element not interactable")]
    NotInteractable,

    #[error("page error: {0}")]
    Page(String),

    #[error("no {0}s found")]
    NoChildren(Granularity),

    #[error("pagination limit of {0} reveals reached")]
    PaginationLimit(u32),

    #[error("identifying date could not be read")]
    UnreadableKey,
}

/// A subtree lost during this run
#[derive(Debug, Clone, PartialEq)]
pub struct Abandoned {
    /// Level of the node that was given up on
    pub level: Granularity,

    /// Its identifying date
    pub key: String,

    pub reason: AbandonReason,
}

/// Counters and losses of one traversal
#[derive(Debug, Clone, Default)]
pub struct TraversalReport {
    pub months: usize,
    pub weeks: usize,
    pub days: usize,
    pub intervals: usize,

    /// Successful "reveal more" activations across all nodes
    pub reveals: u32,

    /// Days listed under more than one week; only the first is kept
    pub duplicate_days: usize,

    pub abandoned: Vec<Abandoned>,
}

impl TraversalReport {
    /// True when every revealed node was visited
    pub fn is_complete(&self) -> bool {
        self.abandoned.is_empty()
    }
}

/// Result of a traversal: the extracted tree and how it went
#[derive(Debug, Clone)]
pub struct Traversal {
    pub tree: UsageTree,
    pub report: TraversalReport,
}

/// Walks the full hierarchy from the usage-history view
///
/// # Example
///
/// ```no_run
/// use usage_drill::config::load_config;
/// use usage_drill::page::WebDriverPage;
/// use usage_drill::traversal::traverse;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("usage-drill.toml"))?;
/// let mut page = WebDriverPage::start(&config.webdriver, &config.timeouts).await?;
/// // ... log in and open usage history first ...
/// let traversal = traverse(&mut page, &config).await;
/// println!("{} days extracted", traversal.report.days);
/// # Ok(())
/// # }
/// ```
pub async fn traverse(page: &mut dyn PageProvider, config: &Config) -> Traversal {
    TraversalController::from_config(page, config).run().await
}
