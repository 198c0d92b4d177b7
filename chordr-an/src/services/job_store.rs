//! Job ledger with durable storage
//!
//! Single writer discipline: one exclusive lock covers both the in-memory
//! map mutation and the durable write, so any caller that completes before
//! another begins observes the new state, and readers never see a
//! partially written ledger.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Job, JobStatus};

/// Typed state errors reported synchronously to the caller
#[derive(Debug, Error)]
pub enum StoreError {
    /// A job with this id already exists
    #[error("Job {0} already exists")]
    DuplicateJob(Uuid),

    /// No job with this id
    #[error("Job {0} not found")]
    NotFound(Uuid),

    /// The requested status change is not an allowed edge
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}

/// Concurrency-safe ledger of job records, rewritten in full to disk on
/// every mutating operation.
///
/// Explicitly constructed and injected (one ledger per process by
/// convention, not by hidden global state).
pub struct JobStore {
    jobs: Mutex<HashMap<Uuid, Job>>,
    ledger_path: PathBuf,
}

impl JobStore {
    /// Load the ledger from durable storage.
    ///
    /// A missing or malformed ledger file initializes an empty ledger
    /// rather than failing startup.
    pub fn load(ledger_path: impl Into<PathBuf>) -> Self {
        let ledger_path = ledger_path.into();
        let jobs = match std::fs::read_to_string(&ledger_path) {
            Ok(content) => match serde_json::from_str::<HashMap<Uuid, Job>>(&content) {
                Ok(jobs) => {
                    tracing::info!(
                        ledger = %ledger_path.display(),
                        jobs = jobs.len(),
                        "Job ledger loaded"
                    );
                    jobs
                }
                Err(e) => {
                    tracing::warn!(
                        ledger = %ledger_path.display(),
                        error = %e,
                        "Malformed job ledger, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(
                    ledger = %ledger_path.display(),
                    error = %e,
                    "Could not read job ledger, starting empty"
                );
                HashMap::new()
            }
        };

        Self {
            jobs: Mutex::new(jobs),
            ledger_path,
        }
    }

    /// Insert a new job record.
    ///
    /// The record must be in `Uploaded` status; fails with
    /// `DuplicateJob` if the id is already in use.
    pub async fn create(&self, job: Job) -> Result<(), StoreError> {
        debug_assert_eq!(job.status, JobStatus::Uploaded);

        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(&job.id) {
            return Err(StoreError::DuplicateJob(job.id));
        }
        jobs.insert(job.id, job);
        self.persist(&jobs);
        Ok(())
    }

    /// Return a snapshot of the current record
    pub async fn get(&self, id: Uuid) -> Result<Job, StoreError> {
        let jobs = self.jobs.lock().await;
        jobs.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    /// List all job records, newest first
    pub async fn list(&self) -> Vec<Job> {
        let jobs = self.jobs.lock().await;
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Move a job to a new status.
    ///
    /// Validates the transition against the allowed edge set, bumps
    /// `updated_at`, and rewrites the ledger before returning. The
    /// optional error message is recorded on the job when transitioning
    /// to `Failed`.
    pub async fn transition(
        &self,
        id: Uuid,
        new_status: JobStatus,
        error: Option<String>,
    ) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if !job.status.can_transition_to(new_status) {
            return Err(StoreError::InvalidTransition {
                from: job.status,
                to: new_status,
            });
        }

        job.status = new_status;
        job.updated_at = chrono::Utc::now();
        if new_status == JobStatus::Failed {
            job.error = error;
        }

        let snapshot = job.clone();
        self.persist(&jobs);
        Ok(snapshot)
    }

    /// Rewrite the full ledger to disk, atomically for observers.
    ///
    /// Persistence failures are logged and do not roll back the
    /// in-memory change already applied (last-write-wins on the file).
    fn persist(&self, jobs: &HashMap<Uuid, Job>) {
        if let Err(e) = write_ledger(&self.ledger_path, jobs) {
            tracing::error!(
                ledger = %self.ledger_path.display(),
                error = %e,
                "Failed to persist job ledger"
            );
        }
    }
}

fn write_ledger(path: &Path, jobs: &HashMap<Uuid, Job>) -> std::io::Result<()> {
    let content = serde_json::to_vec_pretty(jobs)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Temp file then rename so a crash mid-write never leaves a torn ledger
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_job(id: Uuid) -> Job {
        Job::new(id, PathBuf::from("/tmp/a.mp3"), "a.mp3".to_string(), 1024)
    }

    fn temp_store() -> (tempfile::TempDir, JobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::load(dir.path().join("jobs.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn duplicate_id_rejected() {
        let (_dir, store) = temp_store();
        let id = Uuid::new_v4();

        store.create(sample_job(id)).await.unwrap();
        let err = store.create(sample_job(id)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateJob(got) if got == id));
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let (_dir, store) = temp_store();
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn transition_from_completed_rejected() {
        let (_dir, store) = temp_store();
        let id = Uuid::new_v4();
        store.create(sample_job(id)).await.unwrap();

        store
            .transition(id, JobStatus::Processing, None)
            .await
            .unwrap();
        store
            .transition(id, JobStatus::Completed, None)
            .await
            .unwrap();

        for next in [JobStatus::Processing, JobStatus::Failed, JobStatus::Completed] {
            let err = store.transition(id, next, None).await.unwrap_err();
            assert!(matches!(
                err,
                StoreError::InvalidTransition {
                    from: JobStatus::Completed,
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn read_after_write_consistency() {
        let (_dir, store) = temp_store();
        let id = Uuid::new_v4();
        store.create(sample_job(id)).await.unwrap();
        store
            .transition(id, JobStatus::Processing, None)
            .await
            .unwrap();
        store
            .transition(id, JobStatus::Completed, None)
            .await
            .unwrap();

        // A read issued after transition() returned must see the new state
        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn failed_transition_records_error() {
        let (_dir, store) = temp_store();
        let id = Uuid::new_v4();
        store.create(sample_job(id)).await.unwrap();
        store
            .transition(id, JobStatus::Processing, None)
            .await
            .unwrap();
        store
            .transition(id, JobStatus::Failed, Some("decode failed".to_string()))
            .await
            .unwrap();

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("decode failed"));
    }

    #[tokio::test]
    async fn ledger_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        let id = Uuid::new_v4();

        {
            let store = JobStore::load(&path);
            store.create(sample_job(id)).await.unwrap();
            store
                .transition(id, JobStatus::Processing, None)
                .await
                .unwrap();
        }

        let store = JobStore::load(&path);
        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.original_name, "a.mp3");
    }

    #[tokio::test]
    async fn malformed_ledger_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = JobStore::load(&path);
        assert!(store.list().await.is_empty());
    }
}
