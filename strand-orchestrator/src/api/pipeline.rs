//! Pipeline API Handlers
//!
//! HTTP endpoints for pipeline management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use strand_core::domain::pipeline::Pipeline;
use strand_core::dto::pipeline::CreatePipeline;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;

/// POST /pipeline/create
/// Create a new pipeline
pub async fn create_pipeline(
    State(state): State<AppState>,
    Json(req): Json<CreatePipeline>,
) -> ApiResult<Json<Pipeline>> {
    tracing::info!("Creating pipeline: {}", req.name);

    let pipeline = state.pipelines.create_pipeline(req).await?;

    Ok(Json(pipeline))
}

/// GET /pipeline/{id}
/// Get pipeline details by ID
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Pipeline>> {
    tracing::debug!("Getting pipeline: {}", id);

    let pipeline = state.pipelines.get_pipeline(id).await?;

    Ok(Json(pipeline))
}

/// GET /pipeline/list
/// List all pipelines
pub async fn list_pipelines(State(state): State<AppState>) -> ApiResult<Json<Vec<Pipeline>>> {
    tracing::debug!("Listing all pipelines");

    let pipelines = state.pipelines.list_pipelines().await?;

    Ok(Json(pipelines))
}

/// DELETE /pipeline/{id}
/// Delete a pipeline
pub async fn delete_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting pipeline: {}", id);

    state.pipelines.delete_pipeline(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
