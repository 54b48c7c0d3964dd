//! Biblesync Core Library
//!
//! This library provides the offline scripture synchronization engine:
//! downloading Bible books chapter-by-chapter for offline reading,
//! caching verses durably, tracking per-chapter progress through partial
//! network failure, and answering "is this already available offline?"
//! without re-fetching.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`canon`] - Static 66-book reference data and chapter addressing
//! - [`db`] - Database connection and schema management
//! - [`cache`] - Two-tier (memory + SQLite) verse cache
//! - [`fetch`] - Chapter fetching with placeholder fallback
//! - [`job`] - Book download jobs and progress
//! - [`network`] - Online/offline detection
//! - [`search`] - Reference and keyword verse search
//! - [`stats`] - Derived offline-storage statistics

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod canon;
pub mod db;
pub mod fetch;
pub mod job;
pub mod network;
pub mod search;
pub mod stats;

// Re-export commonly used types
pub use cache::{CacheError, CachedChapter, VerseCache};
pub use canon::{Book, CanonError, ChapterKey, Testament, Verse, chapter_key, find_book};
pub use db::Database;
pub use fetch::{
    FetchError, FetchOutcome, RetryPolicy, VerseFetchClient, VerseSource, placeholder_verses,
};
pub use job::{DownloadController, DownloadProgress, JobError, JobOutcome, JobStatus};
pub use network::{Connectivity, NetworkStatusMonitor};
pub use search::{SearchIndex, SearchResult};
pub use stats::{OfflineStats, OfflineStatsAggregator};
