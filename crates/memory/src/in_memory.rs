//! In-memory history — useful for testing and one-off runs.

use async_trait::async_trait;
use minion_core::error::HistoryError;
use minion_core::history::{HistoryRecord, HistoryStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A history store that keeps the record in process memory.
/// Clones share the same record.
#[derive(Clone)]
pub struct InMemoryHistory {
    record: Arc<RwLock<HistoryRecord>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::with_record(HistoryRecord::default())
    }

    /// Start from an existing record (e.g. a pre-seeded fingerprint).
    pub fn with_record(record: HistoryRecord) -> Self {
        Self {
            record: Arc::new(RwLock::new(record)),
        }
    }

    /// Current record, without going through the trait.
    pub async fn snapshot(&self) -> HistoryRecord {
        self.record.read().await.clone()
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    fn name(&self) -> &str { "in_memory" }

    async fn load(&self) -> HistoryRecord {
        self.record.read().await.clone()
    }

    async fn save(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        *self.record.write().await = record.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        let store = InMemoryHistory::new();
        assert_eq!(store.load().await, HistoryRecord::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = InMemoryHistory::new();
        let mut record = store.load().await;
        record.push_math_hashes(vec!["abc".to_string()]);
        record.last_horoscope_date = "2026-03-01".into();
        store.save(&record).await.unwrap();

        let loaded = store.load().await;
        assert!(loaded.has_math_hash("abc"));
        assert!(loaded.horoscope_done_on("2026-03-01"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryHistory::new();
        let other = store.clone();
        let mut record = HistoryRecord::default();
        record.push_bible_ref("Micah 6:8");
        store.save(&record).await.unwrap();
        assert_eq!(other.snapshot().await.bible_refs, vec!["Micah 6:8".to_string()]);
    }
}
