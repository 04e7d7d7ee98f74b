use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub jobs: JobsSummary,
}

#[derive(Debug, Serialize)]
pub struct JobsSummary {
    pub processing: usize,
    pub completed: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let counts = state.store.counts();
    Json(HealthResponse {
        status: "healthy",
        jobs: JobsSummary {
            processing: counts.processing,
            completed: counts.completed,
        },
    })
}
