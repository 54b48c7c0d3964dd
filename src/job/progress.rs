//! Job status and progress event types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the download controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// No job active.
    Idle,
    /// A book download is in progress.
    Running,
    /// All chapters attempted, none failed.
    Completed,
    /// All chapters attempted, some failed (individually retryable).
    CompletedWithErrors,
    /// Cancelled by the user; already-cached chapters are kept.
    Cancelled,
}

impl JobStatus {
    /// Returns the string representation used in progress output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Cancelled => "cancelled",
        }
    }

    /// True for states a finished job can rest in.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedWithErrors | Self::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "completed_with_errors" => Ok(Self::CompletedWithErrors),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid job status: {s}")),
        }
    }
}

/// Progress snapshot published on the controller's watch channel after
/// every chapter.
///
/// Within one job run, `current` never decreases and events are emitted
/// in ascending chapter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// Book being downloaded; empty while idle.
    pub book: String,
    /// 1-based cursor of the last chapter attempted (0 before any).
    pub current: u32,
    /// Total chapters in the book.
    pub total: u32,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Chapters whose fetch failed so far, ascending.
    pub failed_chapters: Vec<u32>,
}

impl DownloadProgress {
    /// The idle snapshot used before any job has run and after acknowledge.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            book: String::new(),
            current: 0,
            total: 0,
            status: JobStatus::Idle,
            failed_chapters: Vec::new(),
        }
    }

    /// Completed fraction as a percentage (0..=100).
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = u64::from(self.current).saturating_mul(100) / u64::from(self.total);
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}
