//! Run API Handlers
//!
//! HTTP endpoints for run lifecycle management.

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use strand_core::domain::run::{Run, RunDisk};
use strand_core::dto::run::{DiskAttachRequest, LaunchRun, RunDto, RunIds, RunStatusUpdate, RunWithTool};
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::api::{AppState, principal};

/// POST /run/launch
/// Create a new run from a pipeline
pub async fn launch_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LaunchRun>,
) -> ApiResult<Json<Run>> {
    tracing::info!("Launching run for pipeline: {}", req.pipeline_id);

    let run = state.runs.launch_run(&principal(&headers), req).await?;

    Ok(Json(run))
}

/// GET /run/{id}
/// Get run details by ID
pub async fn get_run(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Run>> {
    tracing::debug!("Getting run: {}", id);

    let run = state.runs.get_run(id).await?;

    Ok(Json(run))
}

/// GET /run/list
/// List all runs
pub async fn list_runs(State(state): State<AppState>) -> ApiResult<Json<Vec<RunDto>>> {
    tracing::debug!("Listing all runs");

    let runs = state.runs.list_runs().await?;

    Ok(Json(runs.into_iter().map(RunDto::from).collect()))
}

/// POST /run/{id}/terminate
/// Terminate a paused run and its compute node
pub async fn terminate_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Run>> {
    tracing::info!("Terminating run: {}", id);

    let run = state.runs.terminate_run(&principal(&headers), id).await?;

    Ok(Json(run))
}

/// POST /run/{id}/pause
/// Request that a running run be paused
pub async fn pause_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Run>> {
    tracing::info!("Pausing run: {}", id);

    let run = state.runs.pause_run(&principal(&headers), id).await?;

    Ok(Json(run))
}

/// POST /run/{id}/resume
/// Request that a paused run be resumed
pub async fn resume_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Run>> {
    tracing::info!("Resuming run: {}", id);

    let run = state.runs.resume_run(&principal(&headers), id).await?;

    Ok(Json(run))
}

/// POST /run/{id}/disk
/// Attach an additional disk to a live run
pub async fn attach_disk(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<DiskAttachRequest>,
) -> ApiResult<Json<RunDisk>> {
    tracing::info!("Attaching disk to run: {}", id);

    let disk = state
        .runs
        .attach_disk(&principal(&headers), id, req)
        .await?;

    Ok(Json(disk))
}

/// POST /run/{id}/status
/// Record a run's final status
pub async fn update_run_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RunStatusUpdate>,
) -> ApiResult<Json<Run>> {
    tracing::info!("Updating run {} status to {:?}", id, req.status);

    let run = state.runs.update_run_status(id, req.status).await?;

    Ok(Json(run))
}

/// POST /run/tools
/// Load runs together with the tools backing their docker images
pub async fn load_runs_with_tools(
    State(state): State<AppState>,
    Json(req): Json<RunIds>,
) -> ApiResult<Json<Vec<RunWithTool>>> {
    tracing::debug!("Loading {} run(s) with tools", req.run_ids.len());

    let runs = state.runs.load_runs_with_tools(&req.run_ids).await?;

    Ok(Json(runs))
}
