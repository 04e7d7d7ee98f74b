use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docintel::{FileResult, Job, JobResults};
use serde::Serialize;
use tracing::{debug, info};

use super::ApiError;
use crate::state::AppState;

const JOB_NOT_FOUND: &str = "Job not found";

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub results: Vec<FileResult>,
}

#[derive(Debug, Serialize)]
pub struct ProcessingResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    debug!("Status request for job {}", job_id);
    state
        .store
        .get(&job_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(JOB_NOT_FOUND.to_string()))
}

/// 202 while any file is still running; the full result list once the job
/// has completed.
pub async fn get_results(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    match state.store.results(&job_id) {
        Some(JobResults::Processing) => {
            debug!("Job {} still processing", job_id);
            Ok((
                StatusCode::ACCEPTED,
                Json(ProcessingResponse {
                    status: "processing",
                    message: "Job is still processing",
                }),
            )
                .into_response())
        }
        Some(JobResults::Completed(results)) => {
            info!("Returning {} result(s) for job {}", results.len(), job_id);
            Ok(Json(ResultsResponse { results }).into_response())
        }
        None => Err(ApiError::NotFound(JOB_NOT_FOUND.to_string())),
    }
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(&job_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(JOB_NOT_FOUND.to_string()))
    }
}
