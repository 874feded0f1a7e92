//! BFF request handlers.

use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::models::{
    JobStatus, ProcessRequest, ProcessingResponse, ProcessingStatus, RegisterResponse,
};
use crate::youtube;

use super::auth::{AuthedUser, Rejection};
use super::AppState;

/// Liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "tubedigest",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Register the verified identity with the BFF. The gate already created
/// the user record lazily, so this just echoes it back; registering twice
/// returns the same record.
pub async fn register(AuthedUser(user): AuthedUser) -> Json<RegisterResponse> {
    Json(RegisterResponse { user })
}

/// Accept a processing request for a video: enforce the usage quota,
/// record the job, and return its descriptor. The actual pipeline work is
/// driven by the processing backend, not by this layer.
pub async fn process_video(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(video_id): Path<String>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessingResponse>, Rejection> {
    if !youtube::is_valid_video_id(&video_id) {
        return Err(Rejection::bad_request(format!(
            "'{}' is not a valid YouTube video id",
            video_id
        )));
    }

    if user.quota_exhausted() {
        return Err(Rejection::forbidden(
            "You have reached your monthly processing limit. Please upgrade your subscription.",
        ));
    }

    let job_id = format!(
        "yt_job_{}_{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        video_id
    );
    info!(
        "🎬 Accepted job {} for user {} (mode: {})",
        job_id, user.id, request.mode
    );

    let record = ProcessingStatus {
        job_id: job_id.clone(),
        video_id: video_id.clone(),
        status: JobStatus::Processing,
        progress: 0.0,
        result: None,
        error: None,
    };
    state.jobs.write().await.insert(job_id.clone(), record);

    Ok(Json(ProcessingResponse {
        job_id,
        video_id,
        status: JobStatus::Processing,
        mode: Some(request.mode),
        chapter_source: Some(request.chapter_source),
    }))
}

/// Current status of a recorded job.
pub async fn job_status(
    State(state): State<AppState>,
    AuthedUser(_user): AuthedUser,
    Path(job_id): Path<String>,
) -> Result<Json<ProcessingStatus>, Rejection> {
    state
        .jobs
        .read()
        .await
        .get(&job_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Rejection::not_found(format!("No job found with id '{}'", job_id)))
}
