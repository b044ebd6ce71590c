//! Axum route handlers for the Pipeline API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::llm_client::ModelChoice;
use crate::pipeline::service::{run_tailoring, RunRequest, RunResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<&'static str>,
    pub default: &'static str,
}

/// GET /api/v1/models
///
/// Lists the selectable models; the first entry is the default.
pub async fn handle_list_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: ModelChoice::ALL.iter().map(|m| m.id()).collect(),
        default: ModelChoice::default().id(),
    })
}

/// POST /api/v1/pipeline/run
///
/// Runs job analysis → candidate profile → resume → interview prep and returns both
/// markdown documents. Blocks until every task has finished.
pub async fn handle_run(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunResponse>, AppError> {
    let response = run_tailoring(&state, request).await?;
    Ok(Json(response))
}
