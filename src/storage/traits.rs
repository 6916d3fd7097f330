//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::model::{UsageTree, Watermark};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable home of the watermark and the last snapshot
///
/// The two artifacts are independent: the watermark is rewritten after every
/// confirmed delivery, the snapshot once at the end of a run. Every save must
/// be durable when it returns.
pub trait UsageStore {
    /// Reads the watermark; `None` if nothing was ever delivered
    fn load_watermark(&self) -> StorageResult<Watermark>;

    /// Persists `date` as the new watermark
    fn save_watermark(&mut self, date: NaiveDate) -> StorageResult<()>;

    /// Reads the last snapshot; an empty tree if none exists
    fn load_snapshot(&self) -> StorageResult<UsageTree>;

    /// Replaces the snapshot with `tree`
    fn save_snapshot(&mut self, tree: &UsageTree) -> StorageResult<()>;
}
