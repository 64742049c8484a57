//! History — what has already been shown to the reader.
//!
//! The record is loaded fresh at the start of every agent invocation that
//! needs it and written back after a successful, validated production. Each
//! slice is owned by one agent kind and only that agent mutates it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::HistoryError;

/// Maximum number of practice-problem fingerprints kept.
pub const MAX_MATH_HASHES: usize = 200;

/// Maximum number of scripture references kept.
pub const MAX_BIBLE_REFS: usize = 60;

/// Durable dedup state keyed by agent kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Practice-problem fingerprints, oldest first
    #[serde(default)]
    pub math_hashes: Vec<String>,

    /// Scripture references, oldest first
    #[serde(default)]
    pub bible_refs: Vec<String>,

    /// `YYYY-MM-DD` of the last successful horoscope
    #[serde(default)]
    pub last_horoscope_date: String,
}

impl HistoryRecord {
    pub fn has_math_hash(&self, hash: &str) -> bool {
        self.math_hashes.iter().any(|h| h == hash)
    }

    /// Append fingerprints, evicting the oldest beyond [`MAX_MATH_HASHES`].
    pub fn push_math_hashes<I>(&mut self, hashes: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.math_hashes.extend(hashes);
        evict_oldest(&mut self.math_hashes, MAX_MATH_HASHES);
    }

    /// Append a reference, evicting the oldest beyond [`MAX_BIBLE_REFS`].
    pub fn push_bible_ref(&mut self, reference: impl Into<String>) {
        self.bible_refs.push(reference.into());
        evict_oldest(&mut self.bible_refs, MAX_BIBLE_REFS);
    }

    /// The most recent `n` references, oldest first.
    pub fn recent_bible_refs(&self, n: usize) -> &[String] {
        let start = self.bible_refs.len().saturating_sub(n);
        &self.bible_refs[start..]
    }

    pub fn horoscope_done_on(&self, date: &str) -> bool {
        self.last_horoscope_date == date
    }
}

fn evict_oldest(entries: &mut Vec<String>, cap: usize) {
    if entries.len() > cap {
        let excess = entries.len() - cap;
        entries.drain(..excess);
    }
}

/// Persistent storage for a [`HistoryRecord`].
///
/// `load` never fails: missing, corrupt or unreadable storage yields an empty
/// record. `save` is single-writer; callers running agents in parallel must
/// serialize read-modify-write cycles themselves.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Load the current record, or an empty one.
    async fn load(&self) -> HistoryRecord;

    /// Overwrite the stored record.
    async fn save(&self, record: &HistoryRecord) -> std::result::Result<(), HistoryError>;
}
