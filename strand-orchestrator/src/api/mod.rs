//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod pipeline;
pub mod registry;
pub mod run;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::service::pipeline::PipelineService;
use crate::service::registry::{RegistryNotificationService, RegistryService};
use crate::service::run::RunService;

/// Header carrying the caller identity.
///
/// Explicit replacement for interception-based security: every guarded
/// operation receives the principal and checks permissions itself.
pub const USER_HEADER: &str = "X-User";

/// Header under which a registry addresses its push notifications.
pub const REGISTRY_PATH_HEADER: &str = "Registry-Path";

const ANONYMOUS: &str = "anonymous";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub runs: Arc<RunService>,
    pub pipelines: Arc<PipelineService>,
    pub registries: Arc<RegistryService>,
    pub notifications: Arc<RegistryNotificationService>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Pipeline endpoints
        .route("/pipeline/create", post(pipeline::create_pipeline))
        .route("/pipeline/list", get(pipeline::list_pipelines))
        .route("/pipeline/{id}", get(pipeline::get_pipeline))
        .route("/pipeline/{id}", delete(pipeline::delete_pipeline))
        // Run endpoints
        .route("/run/launch", post(run::launch_run))
        .route("/run/list", get(run::list_runs))
        .route("/run/tools", post(run::load_runs_with_tools))
        .route("/run/{id}", get(run::get_run))
        .route("/run/{id}/terminate", post(run::terminate_run))
        .route("/run/{id}/pause", post(run::pause_run))
        .route("/run/{id}/resume", post(run::resume_run))
        .route("/run/{id}/disk", post(run::attach_disk))
        .route("/run/{id}/status", post(run::update_run_status))
        // Registry endpoints
        .route("/registry/create", post(registry::create_registry))
        .route("/registry/list", get(registry::list_registries))
        .route("/registry/notify", post(registry::notify_registry_events))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Extract the caller identity from request headers
pub fn principal(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(ANONYMOUS)
        .to_string()
}
