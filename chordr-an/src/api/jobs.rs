//! Job lifecycle endpoints: process, status, download, list

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use chordr_common::events::ChordrEvent;

use crate::error::ApiResult;
use crate::models::{Job, JobStatus};
use crate::AppState;

/// POST /api/process/{job_id}
///
/// Queue the analysis run for an uploaded job. Returns immediately; the
/// run proceeds in the background. The `Uploaded → Processing`
/// transition happens here, so a job that is already processing or
/// finished is a conflict and a second request can never start a
/// second run.
pub async fn process_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .store
        .transition(job_id, JobStatus::Processing, None)
        .await?;

    state.events.emit_lossy(ChordrEvent::JobProcessing {
        job_id,
        timestamp: Utc::now(),
    });
    state.pool.submit(state.orchestrator.clone(), job_id);
    tracing::info!(job_id = %job_id, "Analysis run queued");

    Ok(Json(json!({
        "job_id": job_id,
        "status": "processing",
    })))
}

/// GET /api/status/{job_id}
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<Job>> {
    Ok(Json(state.store.get(job_id).await?))
}

/// GET /api/jobs
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.store.list().await)
}

/// GET /api/download/{job_id}
///
/// Serve the result document of a completed job. For compatibility with
/// existing clients, a job that is not completed (or whose result file is
/// missing) answers 200 with an error body rather than an error status.
pub async fn download_result(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Response> {
    let job = state.store.get(job_id).await?;

    if job.status != JobStatus::Completed {
        let body = Json(json!({
            "error": format!("Results not ready: job is {}", job.status),
        }));
        return Ok((StatusCode::OK, body).into_response());
    }

    let path = state.orchestrator.result_path(job_id);
    match tokio::fs::read(&path).await {
        Ok(content) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            content,
        )
            .into_response()),
        Err(e) => {
            tracing::error!(job_id = %job_id, path = %path.display(), error = %e, "Result document unreadable");
            let body = Json(json!({
                "error": "Results file not found",
            }));
            Ok((StatusCode::OK, body).into_response())
        }
    }
}

/// Build job lifecycle routes
pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/api/process/:job_id", post(process_job))
        .route("/api/status/:job_id", get(job_status))
        .route("/api/jobs", get(list_jobs))
        .route("/api/download/:job_id", get(download_result))
}
