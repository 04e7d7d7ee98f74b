use axum::extract::{Multipart, State};
use axum::Json;
use docintel::{validate_uploads, UploadedFile};
use serde::Serialize;
use tracing::{info, warn};

use super::ApiError;
use crate::state::{Analysis, AppState};

/// Multipart field carrying the documents; repeated once per file.
const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub job_id: String,
    pub total_files: usize,
}

/// Accepts a batch of documents and starts a job for them.
///
/// Returns 400 when the batch is empty, a name has an unsupported extension
/// or a file is empty, and 503 when the analysis client is not configured.
pub async fn analyze_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?;
        files.push(UploadedFile::new(filename, content.to_vec()));
    }

    info!("Received request to analyze {} file(s)", files.len());

    if let Err(e) = validate_uploads(&files, &state.allowed_extensions) {
        warn!("Rejected upload: {}", e);
        return Err(e.into());
    }

    let orchestrator = match state.analysis.as_ref() {
        Analysis::Ready(orchestrator) => orchestrator,
        Analysis::Unavailable(reason) => {
            return Err(ApiError::ServiceUnavailable(reason.clone()));
        }
    };

    let total_size: usize = files.iter().map(|f| f.content.len()).sum();
    let submitted = orchestrator.submit(files);
    info!(
        "Started job {} ({} file(s), {} bytes)",
        submitted.job_id, submitted.total_files, total_size
    );

    Ok(Json(AnalyzeResponse {
        job_id: submitted.job_id,
        total_files: submitted.total_files,
    }))
}
