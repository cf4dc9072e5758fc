//! Registry API Handlers
//!
//! HTTP endpoints for docker registry management and push notifications.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use strand_core::domain::registry::{DockerRegistry, Tool};
use strand_core::dto::registry::{CreateRegistry, DockerRegistryEventEnvelope};

use crate::api::error::ApiResult;
use crate::api::{AppState, REGISTRY_PATH_HEADER, principal};

/// POST /registry/create
/// Register a docker registry
pub async fn create_registry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRegistry>,
) -> ApiResult<Json<DockerRegistry>> {
    tracing::info!("Creating registry: {}", req.path);

    let registry = state
        .registries
        .create_registry(&principal(&headers), req)
        .await?;

    Ok(Json(registry))
}

/// GET /registry/list
/// List all registries
pub async fn list_registries(State(state): State<AppState>) -> ApiResult<Json<Vec<DockerRegistry>>> {
    tracing::debug!("Listing all registries");

    let registries = state.registries.list_registries().await?;

    Ok(Json(registries))
}

/// POST /registry/notify
/// Process a push-notification envelope from a docker registry
///
/// The optional Registry-Path header names the host the registry was
/// registered under; without it each event's own request host is used. The
/// envelope is deserialized here, at the service boundary.
pub async fn notify_registry_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(envelope): Json<DockerRegistryEventEnvelope>,
) -> ApiResult<Json<Vec<Tool>>> {
    let registry_host = headers
        .get(REGISTRY_PATH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    tracing::info!(
        "Processing {} registry event(s) for host {:?}",
        envelope.events.len(),
        registry_host
    );

    let tools = state
        .notifications
        .notify_registry_events(registry_host, envelope)
        .await?;

    Ok(Json(tools))
}
