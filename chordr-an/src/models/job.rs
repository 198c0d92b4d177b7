//! Job record and status state machine
//!
//! A job tracks one uploaded file through
//! UPLOADED → PROCESSING → COMPLETED / FAILED.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Job lifecycle status
///
/// Transitions are monotonic and one-directional: a job never returns to
/// `Uploaded`, and `Completed`/`Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// File stored, waiting for a processing request
    Uploaded,
    /// Analysis run in flight
    Processing,
    /// Result document persisted
    Completed,
    /// Terminal failure, classified error recorded on the job
    Failed,
}

impl JobStatus {
    /// Whether `self → next` is an allowed edge of the state machine
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Uploaded, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    /// Whether this status is terminal (no further transitions)
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Uploaded => "uploaded",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One job record in the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier
    pub id: Uuid,

    /// Path of the stored upload on disk
    pub source_path: PathBuf,

    /// Original filename as uploaded by the client
    pub original_name: String,

    /// Upload size in bytes
    pub size_bytes: u64,

    /// Current lifecycle status
    pub status: JobStatus,

    /// Record creation time
    pub created_at: DateTime<Utc>,

    /// Last mutation time (bumped on every transition)
    pub updated_at: DateTime<Utc>,

    /// Classified error message for failed jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Create a new job record in `Uploaded` status
    pub fn new(id: Uuid, source_path: PathBuf, original_name: String, size_bytes: u64) -> Self {
        let now = Utc::now();
        Self {
            id,
            source_path,
            original_name,
            size_bytes,
            status: JobStatus::Uploaded,
            created_at: now,
            updated_at: now,
            error: None,
        }
    }
}
