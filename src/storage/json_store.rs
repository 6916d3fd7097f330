//! JSON file store
//!
//! Two files: a small state file holding `last_sent`, and the data file with
//! the full snapshot. Writes go to a sibling temp file which is synced and
//! then renamed over the target, so a crash leaves either the old or the new
//! content, never a torn file.

use crate::config::StorageConfig;
use crate::model::{UsageTree, Watermark};
use crate::storage::traits::{StorageError, StorageResult, UsageStore};
use crate::storage::SyncState;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-backed `UsageStore`
#[derive(Debug, Clone)]
pub struct JsonStore {
    state_path: PathBuf,
    data_path: PathBuf,
}

impl JsonStore {
    pub fn new(state_path: impl Into<PathBuf>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            data_path: data_path.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.state_path, &config.data_path)
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Reads the whole state file
    pub fn load_state(&self) -> StorageResult<SyncState> {
        match read_json::<SyncState>(&self.state_path)? {
            Some(state) => {
                tracing::info!("Loaded state: last_sent = {:?}", state.last_sent);
                Ok(state)
            }
            None => {
                tracing::info!("No state file found. Starting fresh.");
                Ok(SyncState::default())
            }
        }
    }
}

impl UsageStore for JsonStore {
    fn load_watermark(&self) -> StorageResult<Watermark> {
        Ok(self.load_state()?.last_sent)
    }

    fn save_watermark(&mut self, date: NaiveDate) -> StorageResult<()> {
        let state = SyncState {
            last_sent: Some(date),
        };
        write_json_atomic(&self.state_path, &state)?;
        tracing::debug!("Saved state: last_sent = {}", date);
        Ok(())
    }

    fn load_snapshot(&self) -> StorageResult<UsageTree> {
        match read_json::<UsageTree>(&self.data_path)? {
            Some(tree) => {
                tracing::debug!("Loaded existing data ({} days)", tree.day_count());
                Ok(tree)
            }
            None => {
                tracing::debug!("No existing data file found");
                Ok(UsageTree::default())
            }
        }
    }

    fn save_snapshot(&mut self, tree: &UsageTree) -> StorageResult<()> {
        write_json_atomic(&self.data_path, tree)?;
        tracing::info!("Saved data to {}", self.data_path.display());
        Ok(())
    }
}

/// Reads and parses `path`, `None` if the file does not exist
fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes `value` as 4-space indented JSON, durably and atomically
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');

    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(io_err)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    let temp_path = parent.join(format!(".{}.tmp", file_name));

    {
        let mut file = File::create(&temp_path).map_err(io_err)?;
        file.write_all(&buffer).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
    }

    fs::rename(&temp_path, path).map_err(io_err)?;

    // Persist the rename itself; not supported on every platform
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }

    Ok(())
}
