//! No-op history store — every run looks like the first one.
//!
//! Used by `minion run --dry-run` so a preview never consumes fingerprints
//! or scripture references.

use async_trait::async_trait;
use minion_core::error::HistoryError;
use minion_core::history::{HistoryRecord, HistoryStore};

/// A history store that remembers nothing.
pub struct NoopHistory;

#[async_trait]
impl HistoryStore for NoopHistory {
    fn name(&self) -> &str { "none" }

    async fn load(&self) -> HistoryRecord {
        HistoryRecord::default()
    }

    async fn save(&self, _record: &HistoryRecord) -> Result<(), HistoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_is_forgotten() {
        let store = NoopHistory;
        let mut record = HistoryRecord::default();
        record.push_bible_ref("John 1:1");
        store.save(&record).await.unwrap();
        assert_eq!(store.load().await, HistoryRecord::default());
    }
}
