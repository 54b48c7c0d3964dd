//! Two-tier verse cache: in-memory map over a persistent SQLite tier.
//!
//! The cache is the single source of truth for "do we already have this
//! chapter offline". Entries are addressed by [`ChapterKey`] and hold one
//! verse list each. Placeholder content written after a failed fetch is
//! tagged provisional: it is served to readers so the UI always has
//! something to render, but it never satisfies [`VerseCache::has`] and a
//! later successful fetch always overwrites it. Real content is never
//! downgraded to a placeholder.
//!
//! Entries never expire; the only reclamation is the user-triggered
//! [`VerseCache::clear_all`].

use dashmap::DashMap;
use serde_json::from_str as json_from_str;
use sqlx::Row;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::canon::{self, Book, ChapterKey, Verse};
use crate::db::Database;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors from verse cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Underlying database operation failed.
    #[error("cache database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted verse list could not be deserialized.
    #[error("corrupt cache entry for {key}: {source}")]
    CorruptEntry {
        /// The key whose payload failed to parse.
        key: ChapterKey,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A verse list could not be serialized for storage.
    #[error("failed to serialize verses for {key}: {source}")]
    Serialize {
        /// The key being written.
        key: ChapterKey,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// One cached chapter: its verse list plus the provisional tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedChapter {
    /// Verses ordered by verse number ascending.
    pub verses: Vec<Verse>,
    /// True for placeholder content written after a failed fetch.
    pub provisional: bool,
}

/// A persisted row as seen by the stats aggregator.
#[derive(Debug, Clone)]
pub struct PersistedChapter {
    /// Canonical book name.
    pub book: String,
    /// 1-based chapter number.
    pub chapter: u32,
    /// Placeholder flag.
    pub provisional: bool,
    /// Serialized size of the verse payload in bytes.
    pub size_bytes: u64,
}

/// Two-tier chapter cache.
///
/// The memory tier is a concurrent map consulted first on every read;
/// persistent hits are promoted into it. Writes go to both tiers. The
/// cache is explicitly constructed around an injected [`Database`] so
/// tests can instantiate isolated instances; there is no process-wide
/// state.
#[derive(Debug)]
pub struct VerseCache {
    db: Database,
    memory: DashMap<ChapterKey, CachedChapter>,
}

impl VerseCache {
    /// Creates a cache over the given database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            db,
            memory: DashMap::new(),
        }
    }

    /// Closes the underlying database connection pool.
    pub async fn close(&self) {
        self.db.close().await;
    }

    /// Looks up a chapter, checking the memory tier first.
    ///
    /// A persistent hit is promoted into memory so repeated reads stay
    /// O(1). Returns `None` when the key has never been cached.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on query failure, or
    /// [`CacheError::CorruptEntry`] if the stored payload does not parse.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn get(&self, key: &ChapterKey) -> Result<Option<CachedChapter>> {
        if let Some(entry) = self.memory.get(key) {
            return Ok(Some(entry.clone()));
        }

        let row = sqlx::query(
            r"SELECT verses_json, provisional FROM verse_cache
              WHERE book = ? AND chapter = ?",
        )
        .bind(key.book())
        .bind(key.chapter())
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let verses_json: String = row.get("verses_json");
        let provisional: i64 = row.get("provisional");
        let verses: Vec<Verse> =
            json_from_str(&verses_json).map_err(|source| CacheError::CorruptEntry {
                key: key.clone(),
                source,
            })?;

        let entry = CachedChapter {
            verses,
            provisional: provisional != 0,
        };
        debug!(key = %key, provisional = entry.provisional, "promoting persistent hit to memory");
        self.memory.insert(key.clone(), entry.clone());
        Ok(Some(entry))
    }

    /// Writes real (non-placeholder) chapter content to both tiers.
    ///
    /// Idempotent: re-writing a key with identical content has no
    /// observable effect beyond a refreshed `fetched_at`. Real content
    /// always wins over an existing placeholder row.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Serialize`] or [`CacheError::Database`].
    #[instrument(skip(self, verses), fields(key = %key, verse_count = verses.len()))]
    pub async fn put(&self, key: &ChapterKey, verses: Vec<Verse>) -> Result<()> {
        let verses_json = serde_json::to_string(&verses).map_err(|source| CacheError::Serialize {
            key: key.clone(),
            source,
        })?;

        sqlx::query(
            r"INSERT INTO verse_cache (book, chapter, verses_json, provisional, fetched_at)
              VALUES (?, ?, ?, 0, datetime('now'))
              ON CONFLICT(book, chapter) DO UPDATE SET
                  verses_json = excluded.verses_json,
                  provisional = 0,
                  fetched_at = datetime('now')",
        )
        .bind(key.book())
        .bind(key.chapter())
        .bind(&verses_json)
        .execute(self.db.pool())
        .await?;

        self.memory.insert(
            key.clone(),
            CachedChapter {
                verses,
                provisional: false,
            },
        );
        Ok(())
    }

    /// Writes placeholder chapter content, without downgrading real content.
    ///
    /// If the key already holds a real entry the write is a no-op, so a
    /// transient failure during a re-download cannot poison a previously
    /// good chapter.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Serialize`] or [`CacheError::Database`].
    #[instrument(skip(self, verses), fields(key = %key))]
    pub async fn put_placeholder(&self, key: &ChapterKey, verses: Vec<Verse>) -> Result<()> {
        let verses_json = serde_json::to_string(&verses).map_err(|source| CacheError::Serialize {
            key: key.clone(),
            source,
        })?;

        // The conditional upsert only replaces rows that are themselves
        // provisional; a real row is left untouched.
        sqlx::query(
            r"INSERT INTO verse_cache (book, chapter, verses_json, provisional, fetched_at)
              VALUES (?, ?, ?, 1, datetime('now'))
              ON CONFLICT(book, chapter) DO UPDATE SET
                  verses_json = excluded.verses_json,
                  fetched_at = datetime('now')
              WHERE verse_cache.provisional = 1",
        )
        .bind(key.book())
        .bind(key.chapter())
        .bind(&verses_json)
        .execute(self.db.pool())
        .await?;

        let keep_existing = self
            .memory
            .get(key)
            .is_some_and(|entry| !entry.provisional);
        if !keep_existing {
            self.memory.insert(
                key.clone(),
                CachedChapter {
                    verses,
                    provisional: true,
                },
            );
        }
        Ok(())
    }

    /// Returns true iff a non-placeholder entry exists for the key.
    ///
    /// Placeholder entries deliberately do not satisfy `has`, so download
    /// completion logic is never fooled by filler text and a later real
    /// fetch can still occur.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on query failure.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn has(&self, key: &ChapterKey) -> Result<bool> {
        if let Some(entry) = self.memory.get(key) {
            if !entry.provisional {
                return Ok(true);
            }
            // A provisional memory entry may be stale if a concurrent real
            // write landed in the persistent tier; fall through and check.
        }

        let row = sqlx::query(
            r"SELECT provisional FROM verse_cache WHERE book = ? AND chapter = ?",
        )
        .bind(key.book())
        .bind(key.chapter())
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.is_some_and(|r| r.get::<i64, _>("provisional") == 0))
    }

    /// Returns true iff every chapter `1..=book.chapters` has a real entry.
    ///
    /// This is the derived "book downloaded" predicate; there is no
    /// separately stored completion flag to drift out of sync.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on query failure.
    #[instrument(skip(self, book), fields(book = book.name))]
    pub async fn is_book_downloaded(&self, book: &Book) -> Result<bool> {
        Ok(self.downloaded_chapter_count(book).await? == i64::from(book.chapters))
    }

    /// Returns download progress for a book as a percentage (0..=100).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on query failure.
    #[instrument(skip(self, book), fields(book = book.name))]
    pub async fn book_progress_percent(&self, book: &Book) -> Result<u8> {
        let done = self.downloaded_chapter_count(book).await?;
        let total = i64::from(book.chapters.max(1));
        let percent = done.saturating_mul(100) / total;
        Ok(u8::try_from(percent.clamp(0, 100)).unwrap_or(100))
    }

    /// Counts real (non-provisional) chapters cached for a book.
    async fn downloaded_chapter_count(&self, book: &Book) -> Result<i64> {
        let row = sqlx::query(
            r"SELECT COUNT(*) as count FROM verse_cache
              WHERE book = ? AND provisional = 0 AND chapter <= ?",
        )
        .bind(book.name)
        .bind(book.chapters)
        .fetch_one(self.db.pool())
        .await?;
        Ok(row.get("count"))
    }

    /// Lists every persisted row for the stats aggregator.
    ///
    /// Rows whose book name no longer resolves against the canon are
    /// skipped with a warning rather than failing the scan.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on query failure.
    #[instrument(skip(self))]
    pub async fn persisted_chapters(&self) -> Result<Vec<PersistedChapter>> {
        let rows = sqlx::query(
            r"SELECT book, chapter, provisional, LENGTH(verses_json) as size
              FROM verse_cache ORDER BY book, chapter",
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut chapters = Vec::with_capacity(rows.len());
        for row in rows {
            let book: String = row.get("book");
            if canon::find_book(&book).is_none() {
                warn!(book = %book, "skipping cached row for unrecognized book");
                continue;
            }
            let chapter: i64 = row.get("chapter");
            let provisional: i64 = row.get("provisional");
            let size: i64 = row.get("size");
            chapters.push(PersistedChapter {
                book,
                chapter: u32::try_from(chapter).unwrap_or(0),
                provisional: provisional != 0,
                size_bytes: u64::try_from(size).unwrap_or(0),
            });
        }
        Ok(chapters)
    }

    /// Empties both tiers. Irreversible; used only by explicit user action.
    ///
    /// # Returns
    ///
    /// The number of persisted rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] on query failure.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query(r"DELETE FROM verse_cache")
            .execute(self.db.pool())
            .await?;
        self.memory.clear();
        debug!(rows = result.rows_affected(), "cleared offline data");
        Ok(result.rows_affected())
    }
}
