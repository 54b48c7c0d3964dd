//! Download job controller: one book download as a sequential chapter loop.
//!
//! The controller enforces the engine's core invariants:
//! - at most one job runs at a time
//! - downloads only start while the network monitor reports online
//! - chapters are fetched strictly in ascending order, already-cached
//!   chapters are skipped, so re-running a download resumes cheaply
//! - a failed chapter is recorded and the loop continues; partial failure
//!   never blocks subsequent chapters
//! - cancellation is cooperative, observed between chapters; committed
//!   chapters are never rolled back
//!
//! Progress is published on a watch channel after every chapter, in
//! chapter order, with a monotonic cursor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::error::JobError;
use super::progress::{DownloadProgress, JobStatus};
use crate::cache::VerseCache;
use crate::canon::{self, Book};
use crate::fetch::{FetchOutcome, VerseSource};
use crate::network::NetworkStatusMonitor;

/// Terminal result of one download job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    /// Canonical name of the downloaded book.
    pub book: String,
    /// Terminal status (`Completed`, `CompletedWithErrors`, or `Cancelled`).
    pub status: JobStatus,
    /// Total chapters in the book.
    pub total: u32,
    /// Chapters whose fetch failed, ascending. Re-running the download
    /// re-attempts exactly these.
    pub failed_chapters: Vec<u32>,
}

impl JobOutcome {
    /// True when every chapter ended up validly cached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

/// Resets the running flag when a job exits by any path.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Orchestrates book downloads over an injected cache, verse source, and
/// network monitor.
///
/// The controller is reusable: once a job reaches a terminal status the
/// next `download_book` call may start, and [`acknowledge`](Self::acknowledge)
/// returns the published progress to idle.
pub struct DownloadController {
    cache: Arc<VerseCache>,
    source: Arc<dyn VerseSource>,
    monitor: NetworkStatusMonitor,
    running: AtomicBool,
    cancel_requested: AtomicBool,
    progress: watch::Sender<DownloadProgress>,
}

impl DownloadController {
    /// Creates a controller over the given collaborators.
    #[must_use]
    pub fn new(
        cache: Arc<VerseCache>,
        source: Arc<dyn VerseSource>,
        monitor: NetworkStatusMonitor,
    ) -> Self {
        let (progress, _) = watch::channel(DownloadProgress::idle());
        Self {
            cache,
            source,
            monitor,
            running: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
            progress,
        }
    }

    /// Subscribes to progress snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DownloadProgress> {
        self.progress.subscribe()
    }

    /// Requests cooperative cancellation of the running job.
    ///
    /// Observed between chapters: an in-flight chapter fetch may still
    /// complete and be cached, which is harmless since it would have been
    /// needed eventually, but no further chapters are scheduled.
    #[instrument(skip(self))]
    pub fn cancel(&self) {
        if self.running.load(Ordering::SeqCst) {
            info!("cancellation requested");
            self.cancel_requested.store(true, Ordering::SeqCst);
        }
    }

    /// Returns the published progress to the idle snapshot.
    ///
    /// Call after a terminal status has been handled (dismissed) by the
    /// consumer. No-op while a job is running.
    pub fn acknowledge(&self) {
        if !self.running.load(Ordering::SeqCst) {
            let _ = self.progress.send_replace(DownloadProgress::idle());
        }
    }

    /// Downloads every chapter of `book_name` into the cache.
    ///
    /// Already-cached chapters are skipped, so re-running on a partially
    /// downloaded book only attempts the gaps and re-running on a fully
    /// downloaded book is a fast no-op that reports `Completed`.
    ///
    /// # Errors
    ///
    /// - [`JobError::UnknownBook`] if the name does not resolve
    /// - [`JobError::Offline`] if the network monitor denies the start
    /// - [`JobError::AlreadyRunning`] if another job holds the slot
    /// - [`JobError::Cache`] if the persistent tier fails mid-job
    #[instrument(skip(self), fields(book = %book_name))]
    pub async fn download_book(&self, book_name: &str) -> Result<JobOutcome, JobError> {
        let book = canon::find_book(book_name).ok_or_else(|| JobError::UnknownBook {
            name: book_name.to_string(),
        })?;

        if !self.monitor.request_permission_to_download() {
            debug!(book = book.name, "download rejected: offline");
            return Err(JobError::Offline);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(book = book.name, "download rejected: job already running");
            return Err(JobError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);
        self.cancel_requested.store(false, Ordering::SeqCst);

        info!(book = book.name, chapters = book.chapters, "starting download");
        match self.run_job(book).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // A storage failure aborts the job without reaching a
                // terminal status; publish the idle snapshot so progress
                // observers waiting on the channel are released.
                let _ = self.progress.send_replace(DownloadProgress::idle());
                Err(e)
            }
        }
    }

    /// The chapter loop; the running slot is already held.
    async fn run_job(&self, book: &'static Book) -> Result<JobOutcome, JobError> {
        let total = book.chapters;
        let mut current = 0u32;
        let mut failed_chapters: Vec<u32> = Vec::new();
        let mut status = JobStatus::Running;

        self.publish(book.name, current, total, status, &failed_chapters);

        for chapter in 1..=total {
            // Cooperative cancellation, checked between chapters only.
            if self.cancel_requested.load(Ordering::SeqCst) {
                status = JobStatus::Cancelled;
                info!(book = book.name, current, "download cancelled");
                break;
            }

            let key = canon::key_from_storage(book.name, chapter);

            if self.cache.has(&key).await? {
                debug!(key = %key, "chapter already cached, skipping fetch");
            } else {
                match self.source.fetch_chapter(&key).await {
                    FetchOutcome::Real(verses) => {
                        self.cache.put(&key, verses).await?;
                    }
                    FetchOutcome::Placeholder { verses, error } => {
                        warn!(key = %key, error = %error, "chapter fetch failed");
                        // Keep the placeholder renderable offline; it never
                        // satisfies has() and a retry overwrites it.
                        self.cache.put_placeholder(&key, verses).await?;
                        failed_chapters.push(chapter);
                    }
                }
            }

            current = chapter;
            self.publish(book.name, current, total, status, &failed_chapters);
        }

        if status != JobStatus::Cancelled {
            status = if failed_chapters.is_empty() {
                JobStatus::Completed
            } else {
                JobStatus::CompletedWithErrors
            };
        }
        self.publish(book.name, current, total, status, &failed_chapters);

        info!(
            book = book.name,
            status = %status,
            attempted = current,
            failed = failed_chapters.len(),
            "download finished"
        );

        Ok(JobOutcome {
            book: book.name.to_string(),
            status,
            total,
            failed_chapters,
        })
    }

    fn publish(
        &self,
        book: &str,
        current: u32,
        total: u32,
        status: JobStatus,
        failed_chapters: &[u32],
    ) {
        // send_replace stores the snapshot even when no receiver exists, so a
        // later subscribe().borrow() always sees the latest state
        let _ = self.progress.send_replace(DownloadProgress {
            book: book.to_string(),
            current,
            total,
            status,
            failed_chapters: failed_chapters.to_vec(),
        });
    }
}
