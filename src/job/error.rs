//! Error types for download jobs.
//!
//! Start preconditions (offline, job already running, unknown book) are
//! rejected synchronously and are recoverable, reported conditions for
//! the caller to surface, never panics. Chapter fetch failures are not
//! errors at this level at all; they land in
//! [`failed_chapters`](super::JobOutcome::failed_chapters).

use thiserror::Error;

use crate::cache::CacheError;

/// Errors from starting or running a download job.
#[derive(Debug, Error)]
pub enum JobError {
    /// The network monitor reports offline; no job was created.
    #[error("cannot start download while offline")]
    Offline,

    /// Another job is already running; at most one runs at a time.
    #[error("a download is already running")]
    AlreadyRunning,

    /// The requested book is not part of the canon.
    #[error("unknown book: {name}")]
    UnknownBook {
        /// The name that failed to resolve.
        name: String,
    },

    /// The verse cache failed while persisting a chapter.
    #[error("cache error during download: {0}")]
    Cache(#[from] CacheError),
}
