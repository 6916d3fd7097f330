//! Usage-Drill: incremental energy-usage sync from a utility portal
//!
//! This crate walks a utility customer's usage history (year, month, week,
//! day, 15-minute interval) through an interactive web portal, snapshots the
//! extracted tree, and forwards newly observed days to a metrics sink while
//! tracking a persisted watermark.

pub mod config;
pub mod extract;
pub mod model;
pub mod output;
pub mod page;
pub mod portal;
pub mod run;
pub mod storage;
pub mod sync;
pub mod traversal;

use thiserror::Error;

/// Main error type for Usage-Drill operations
///
/// Every variant is fatal for a run. Contained failures (a broken month link,
/// a rejected delivery) never surface as a `DrillError`.
#[derive(Debug, Error)]
pub enum DrillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page provider error: {0}")]
    Page(#[from] page::PageError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Delivery sink unavailable: {0}")]
    Delivery(#[from] sync::DeliveryError),

    #[error("Login failed: {0}")]
    Login(String),

    #[error("Could not reach usage history: {0}")]
    Navigation(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Usage-Drill operations
pub type Result<T> = std::result::Result<T, DrillError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{UsageTree, Watermark};
pub use run::SyncRun;
