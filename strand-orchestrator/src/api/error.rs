//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::repository::StoreError;
use crate::service::pipeline::PipelineError;
use crate::service::registry::RegistryError;
use crate::service::run::RunError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Forbidden(String),
    Conflict(String),
    DatabaseError(StoreError),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::DatabaseError(other),
        }
    }
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::NotFound(id) => ApiError::NotFound(format!("Run {} not found", id)),
            RunError::PipelineNotFound(id) => {
                ApiError::NotFound(format!("Pipeline {} not found", id))
            }
            RunError::Validation(msg) => ApiError::BadRequest(msg),
            RunError::IllegalState(msg) => ApiError::BadRequest(msg),
            RunError::PermissionDenied(msg) => ApiError::Forbidden(msg),
            RunError::Store(err) => err.into(),
            RunError::Node(err) => ApiError::InternalError(format!("Node operation failed: {}", err)),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NotFound(id) => {
                ApiError::NotFound(format!("Pipeline {} not found", id))
            }
            PipelineError::Validation(msg) => ApiError::BadRequest(msg),
            PipelineError::Store(err) => err.into(),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation(msg) => ApiError::BadRequest(msg),
            RegistryError::Store(err) => err.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
