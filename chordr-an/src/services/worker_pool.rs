//! Bounded background worker pool
//!
//! Analysis runs are spawned as tokio tasks gated by a semaphore, so at
//! most `concurrency` files are being analyzed at once. Submission is
//! fire-and-return: the HTTP handler gets its response immediately and
//! the run proceeds in the background.

use std::sync::Arc;

use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::services::AnalysisOrchestrator;

pub struct WorkerPool {
    permits: Arc<Semaphore>,
    concurrency: usize,
}

impl WorkerPool {
    /// `concurrency` is clamped to at least 1.
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            permits: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Queue an analysis run.
    ///
    /// Returns as soon as the task is spawned; the task waits for a
    /// permit, so excess submissions queue rather than oversubscribe.
    pub fn submit(&self, orchestrator: Arc<AnalysisOrchestrator>, job_id: Uuid) {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    // Semaphore closed only at shutdown
                    tracing::warn!(job_id = %job_id, "Worker pool closed, dropping run");
                    return;
                }
            };
            orchestrator.run(job_id).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_clamped_to_one() {
        assert_eq!(WorkerPool::new(0).concurrency(), 1);
        assert_eq!(WorkerPool::new(4).concurrency(), 4);
    }

    #[tokio::test]
    async fn permits_bound_parallelism() {
        let pool = WorkerPool::new(2);
        let first = pool.permits.clone().acquire_owned().await.unwrap();
        let second = pool.permits.clone().acquire_owned().await.unwrap();
        assert_eq!(pool.permits.available_permits(), 0);
        drop(first);
        drop(second);
        assert_eq!(pool.permits.available_permits(), 2);
    }
}
