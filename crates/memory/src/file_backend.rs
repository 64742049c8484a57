//! File-based history store — a single pretty-printed JSON document.
//!
//! Storage location: `history_path` from the config (default
//! `data/history.json`).
//!
//! Reads fail soft. A missing file is the normal first-run state; an
//! unreadable or corrupt file is logged and treated the same way, so a
//! damaged history never blocks a digest. Writes go to a sibling temp file
//! that is then renamed over the target.

use async_trait::async_trait;
use minion_core::error::HistoryError;
use minion_core::history::{HistoryRecord, HistoryStore};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A file-backed history store.
///
/// Nothing is cached: every `load` reads the file again, so each agent sees
/// what the previous one committed.
pub struct FileHistory {
    path: PathBuf,
}

impl FileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the stored record. A missing file is not an error.
    pub fn reset(&self) -> Result<(), HistoryError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HistoryError::Storage(format!(
                "Failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl HistoryStore for FileHistory {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> HistoryRecord {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return HistoryRecord::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "History unreadable, starting empty");
                return HistoryRecord::default();
            }
        };

        match serde_json::from_str::<HistoryRecord>(&content) {
            Ok(record) => {
                debug!(
                    path = %self.path.display(),
                    math = record.math_hashes.len(),
                    bible = record.bible_refs.len(),
                    "History loaded"
                );
                record
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "History corrupt, starting empty");
                HistoryRecord::default()
            }
        }
    }

    async fn save(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                HistoryError::Storage(format!("Failed to create history directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(record)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;

        let tmp = self.tmp_path();
        std::fs::write(&tmp, content)
            .map_err(|e| HistoryError::Storage(format!("Failed to write history file: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| HistoryError::Storage(format!("Failed to replace history file: {e}")))?;

        Ok(())
    }
}
