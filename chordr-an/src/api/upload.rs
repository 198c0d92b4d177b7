//! Upload endpoint
//!
//! Accepts one audio file as multipart form data, validates it, stores it
//! under uploads/ with a generated id, and creates the job record.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use chordr_common::events::ChordrEvent;

use crate::config::ALLOWED_EXTENSIONS;
use crate::error::{ApiError, ApiResult};
use crate::models::Job;
use crate::AppState;

/// Response to a successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub job_id: Uuid,
    pub filename: String,
    pub size_bytes: u64,
    pub status: String,
}

/// POST /api/upload
///
/// Multipart form with a single `file` field. The original filename must
/// carry an allowed audio extension; empty and oversized payloads are
/// rejected before anything touches disk.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Missing filename".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
        file = Some((filename, data.to_vec()));
        break;
    }

    let (filename, data) =
        file.ok_or_else(|| ApiError::BadRequest("No file field in request".to_string()))?;

    let extension = validate_filename(&filename)?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    if data.len() as u64 > state.config.max_upload_bytes {
        return Err(ApiError::BadRequest(format!(
            "File too large: {} bytes (limit {} bytes)",
            data.len(),
            state.config.max_upload_bytes
        )));
    }

    let job_id = Uuid::new_v4();
    let stored_path = state
        .config
        .uploads_dir()
        .join(format!("{job_id}.{extension}"));

    tokio::fs::create_dir_all(state.config.uploads_dir()).await?;
    tokio::fs::write(&stored_path, &data).await?;

    let size_bytes = data.len() as u64;
    let job = Job::new(job_id, stored_path, filename.clone(), size_bytes);
    state.store.create(job).await?;

    state.events.emit_lossy(ChordrEvent::JobCreated {
        job_id,
        original_name: filename.clone(),
        timestamp: Utc::now(),
    });

    tracing::info!(job_id = %job_id, filename = %filename, size_bytes, "Upload stored");

    Ok(Json(UploadResponse {
        job_id,
        filename,
        size_bytes,
        status: "uploaded".to_string(),
    }))
}

/// Check the filename carries an allowed audio extension; returns the
/// extension lowercased.
fn validate_filename(filename: &str) -> ApiResult<String> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            ApiError::BadRequest(format!("File has no extension: {filename}"))
        })?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unsupported file type .{extension} (allowed: {})",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(extension)
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_extensions() {
        for name in ["song.mp3", "song.WAV", "a.b.flac", "x.m4a", "y.ogg", "z.aac"] {
            assert!(validate_filename(name).is_ok(), "{name} should pass");
        }
    }

    #[test]
    fn rejected_filenames() {
        for name in ["song.txt", "song.exe", "noextension", "archive.zip"] {
            assert!(validate_filename(name).is_err(), "{name} should fail");
        }
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(validate_filename("track.MP3").unwrap(), "mp3");
    }
}
