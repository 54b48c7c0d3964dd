//! Free-text verse search over the cache, the live source, and a curated
//! dataset.
//!
//! Lookup runs in three stages:
//! 1. Reference attempt: the raw query is parsed as a scripture reference
//!    and resolved against the cache first, then the live source when
//!    online. Real verses from this stage are the top results.
//! 2. Keyword scan: containment matching against the curated dataset.
//!    Results whose reference or text prefix contains the exact query
//!    sort before the rest; order within each group follows the curated
//!    table (stable).
//! 3. Book-name fallback: a "browse this book" pseudo-result when the
//!    query names a book no verse result already covers.
//!
//! Results are capped at 50 and duplicate references are suppressed.
//! Search never errors: cache trouble is logged and treated as a miss.

mod curated;
mod reference;

pub use curated::{CURATED_VERSES, CuratedVerse};
pub use reference::{ParsedReference, parse_reference};

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::cache::VerseCache;
use crate::canon::{self, Verse};
use crate::fetch::{FetchOutcome, VerseSource};
use crate::network::NetworkStatusMonitor;

/// Maximum results returned by one search.
pub const MAX_RESULTS: usize = 50;

/// Query tokens this short are ignored by the token containment rule.
const MIN_TOKEN_LEN: usize = 3;

/// How much of a verse's text counts as its "prefix" for the exact-match
/// ordering rule.
const TEXT_PREFIX_LEN: usize = 40;

/// One transient search hit. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display reference ("John 3:16") or book name for browse results.
    pub reference: String,
    /// Verse text, or a browse hint for book results.
    pub text: String,
    /// Book the hit belongs to, when known.
    pub book: Option<String>,
    /// Chapter the hit belongs to, when known.
    pub chapter: Option<u32>,
}

/// Two-stage search index over the shared verse cache and live source.
pub struct SearchIndex {
    cache: Arc<VerseCache>,
    source: Arc<dyn VerseSource>,
    monitor: NetworkStatusMonitor,
}

impl SearchIndex {
    /// Creates an index over the given collaborators.
    #[must_use]
    pub fn new(
        cache: Arc<VerseCache>,
        source: Arc<dyn VerseSource>,
        monitor: NetworkStatusMonitor,
    ) -> Self {
        Self {
            cache,
            source,
            monitor,
        }
    }

    /// Runs a free-text query, returning at most [`MAX_RESULTS`] hits.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<SearchResult> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        // Stage 1: reference-form attempt
        if let Some(parsed) = parse_reference(query) {
            let verses = self.chapter_verses(&parsed).await;
            for verse in verses {
                if parsed.verse.is_some_and(|wanted| wanted != verse.verse) {
                    continue;
                }
                let reference =
                    format!("{} {}:{}", parsed.key.book(), parsed.key.chapter(), verse.verse);
                if seen.insert(reference.to_lowercase()) {
                    results.push(SearchResult {
                        reference,
                        text: verse.text,
                        book: Some(parsed.key.book().to_string()),
                        chapter: Some(parsed.key.chapter()),
                    });
                }
            }
            debug!(hits = results.len(), "reference stage resolved");
        }

        // Stage 2: keyword scan over the curated dataset
        let mut exact: Vec<SearchResult> = Vec::new();
        let mut loose: Vec<SearchResult> = Vec::new();
        let tokens: Vec<&str> = normalized
            .split_whitespace()
            .filter(|t| t.len() >= MIN_TOKEN_LEN)
            .collect();

        for entry in CURATED_VERSES {
            let text_lower = entry.text.to_lowercase();
            let reference_lower = entry.reference.to_lowercase();
            let book_lower = entry.book.to_lowercase();

            let matches = text_lower.contains(&normalized)
                || reference_lower.contains(&normalized)
                || book_lower.contains(&normalized)
                || tokens.iter().any(|t| text_lower.contains(t));
            if !matches {
                continue;
            }
            if !seen.insert(reference_lower.clone()) {
                continue;
            }

            let result = SearchResult {
                reference: entry.reference.to_string(),
                text: entry.text.to_string(),
                book: Some(entry.book.to_string()),
                chapter: Some(entry.chapter),
            };
            let prefix_end = text_lower
                .char_indices()
                .nth(TEXT_PREFIX_LEN)
                .map_or(text_lower.len(), |(i, _)| i);
            if reference_lower.contains(&normalized)
                || text_lower[..prefix_end].contains(&normalized)
            {
                exact.push(result);
            } else {
                loose.push(result);
            }
        }
        results.extend(exact);
        results.extend(loose);

        // Stage 3: book-name fallback
        if let Some(book) = canon::find_book(query) {
            let already_covered = results
                .iter()
                .any(|r| r.book.as_deref() == Some(book.name));
            if !already_covered {
                results.push(SearchResult {
                    reference: book.name.to_string(),
                    text: format!("Browse the book of {}", book.name),
                    book: Some(book.name.to_string()),
                    chapter: None,
                });
            }
        }

        results.truncate(MAX_RESULTS);
        results
    }

    /// Resolves the verses for a reference query: cached real content
    /// first, then a live fetch when online. The live result is written
    /// back into the cache so reading and downloading share one copy.
    async fn chapter_verses(&self, parsed: &ParsedReference) -> Vec<Verse> {
        match self.cache.get(&parsed.key).await {
            Ok(Some(entry)) if !entry.provisional => return entry.verses,
            Ok(_) => {}
            Err(e) => {
                warn!(key = %parsed.key, error = %e, "cache lookup failed during search");
            }
        }

        if !self.monitor.is_online() {
            return Vec::new();
        }

        match self.source.fetch_chapter(&parsed.key).await {
            FetchOutcome::Real(verses) => {
                if let Err(e) = self.cache.put(&parsed.key, verses.clone()).await {
                    warn!(key = %parsed.key, error = %e, "failed to cache searched chapter");
                }
                verses
            }
            FetchOutcome::Placeholder { .. } => Vec::new(),
        }
    }
}
