//! Derived offline-storage statistics.
//!
//! The aggregator is a pure view over the persistent cache tier: it is
//! recomputed on demand for display, never maintained incrementally, and
//! it never evicts anything.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cache::{CacheError, VerseCache};
use crate::canon;

/// Snapshot of offline storage usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineStats {
    /// Books with a real entry for every canonical chapter.
    pub books_downloaded: u32,
    /// Total real (non-placeholder) chapters cached.
    pub chapters_downloaded: u32,
    /// Approximate storage used: summed serialized size of all persisted
    /// entries, placeholders included.
    pub storage_bytes: u64,
}

/// Computes [`OfflineStats`] from the persistent cache tier.
#[derive(Clone)]
pub struct OfflineStatsAggregator {
    cache: Arc<VerseCache>,
}

impl OfflineStatsAggregator {
    /// Creates an aggregator over the given cache.
    #[must_use]
    pub fn new(cache: Arc<VerseCache>) -> Self {
        Self { cache }
    }

    /// Scans the persisted entries and derives the current stats.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the scan fails.
    #[instrument(skip(self))]
    pub async fn compute(&self) -> Result<OfflineStats, CacheError> {
        let rows = self.cache.persisted_chapters().await?;

        let mut real_chapters_by_book: HashMap<String, u32> = HashMap::new();
        let mut chapters_downloaded = 0u32;
        let mut storage_bytes = 0u64;

        for row in &rows {
            storage_bytes = storage_bytes.saturating_add(row.size_bytes);
            if !row.provisional {
                chapters_downloaded += 1;
                *real_chapters_by_book.entry(row.book.clone()).or_insert(0) += 1;
            }
        }

        // Row book names were validated against the canon by the scan
        let books_downloaded = real_chapters_by_book
            .iter()
            .filter(|(name, count)| {
                canon::find_book(name).is_some_and(|book| **count >= book.chapters)
            })
            .count();

        Ok(OfflineStats {
            books_downloaded: u32::try_from(books_downloaded).unwrap_or(u32::MAX),
            chapters_downloaded,
            storage_bytes,
        })
    }
}
