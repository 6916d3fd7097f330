//! Storage module for persisting sync state
//!
//! This module handles everything that outlives a run:
//! - The watermark (`last_sent`) in a small state file
//! - The snapshot of the last extracted usage tree in a data file
//! - Durable, atomic replacement of both

mod json_store;
mod traits;

pub use json_store::JsonStore;
pub use traits::{StorageError, StorageResult, UsageStore};

use crate::model::Watermark;
use serde::{Deserialize, Serialize};

/// Contents of the state file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// Date of the last day the sink acknowledged
    #[serde(default, with = "watermark_format")]
    pub last_sent: Watermark,
}

/// `last_sent` is written as `YYYY-MM-DD` or `null`
///
/// Older state files stored a full timestamp; only its date part is kept.
mod watermark_format {
    use crate::model::{parse_portal_date, Watermark};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Watermark, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Watermark, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_portal_date(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid last_sent date '{}'", raw))),
        }
    }
}
