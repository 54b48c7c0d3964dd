//! Book-level download jobs.
//!
//! A download job walks one book's chapters sequentially, skipping
//! chapters already cached, recording failed chapters without aborting,
//! and publishing progress after every chapter. The job system consists
//! of:
//! - [`DownloadController`] - owns the job lifecycle and the single-job invariant
//! - [`DownloadProgress`] / [`JobStatus`] - observer-facing progress state
//! - [`JobOutcome`] - terminal result of one run
//! - [`JobError`] - precondition and storage error types

mod controller;
mod error;
mod progress;

pub use controller::{DownloadController, JobOutcome};
pub use error::JobError;
pub use progress::{DownloadProgress, JobStatus};
