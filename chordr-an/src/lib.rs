//! chordr-an library interface for testing
//!
//! Exposes public APIs for integration testing

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod services;
pub mod transcript;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use chordr_common::events::EventBus;

use crate::config::ServiceConfig;
use crate::services::{AnalysisOrchestrator, JobStore, WorkerPool};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Job ledger
    pub store: Arc<JobStore>,
    /// Analysis pipeline
    pub orchestrator: Arc<AnalysisOrchestrator>,
    /// Bounded background worker pool
    pub pool: Arc<WorkerPool>,
    /// Event bus for job lifecycle notifications
    pub events: EventBus,
    /// Resolved service configuration
    pub config: Arc<ServiceConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Arc<JobStore>,
        orchestrator: Arc<AnalysisOrchestrator>,
        pool: Arc<WorkerPool>,
        events: EventBus,
        config: Arc<ServiceConfig>,
    ) -> Self {
        Self {
            store,
            orchestrator,
            pool,
            events,
            config,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    // Headroom over the file limit for multipart framing
    let body_limit = state.config.max_upload_bytes as usize + 1024 * 1024;

    Router::new()
        .merge(api::health_routes())
        .merge(api::upload_routes())
        .merge(api::job_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
