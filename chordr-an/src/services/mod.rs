//! Service layer: job ledger, analysis orchestration, worker pool

pub mod job_store;
pub mod orchestrator;
pub mod worker_pool;

pub use job_store::{JobStore, StoreError};
pub use orchestrator::{AnalysisOrchestrator, OrchestratorConfig};
pub use worker_pool::WorkerPool;
