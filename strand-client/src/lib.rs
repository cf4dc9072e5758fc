//! Strand HTTP Client
//!
//! A simple, type-safe HTTP client for communicating with the Strand
//! orchestrator API.
//!
//! This crate provides a unified interface for the CLI and other tooling to
//! interact with the orchestrator, eliminating code duplication and ensuring
//! consistency.
//!
//! # Example
//!
//! ```no_run
//! use strand_client::ApiClient;
//! use strand_core::dto::pipeline::CreatePipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strand_client::ClientError> {
//!     let client = ApiClient::new("http://localhost:8080").as_user("researcher");
//!
//!     // Create a pipeline
//!     let pipeline = client.create_pipeline(CreatePipeline {
//!         name: "rnaseq".to_string(),
//!         description: None,
//!         docker_image: "registry:5000/library/rnaseq:latest".to_string(),
//!         tags: vec![],
//!         config: None,
//!     }).await?;
//!
//!     println!("Created pipeline: {}", pipeline.id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod pipelines;
mod registries;
mod runs;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Header carrying the caller identity, checked by guarded operations.
pub const USER_HEADER: &str = "X-User";

/// HTTP client for the Strand orchestrator API
///
/// This client provides methods for all orchestrator API endpoints, organized
/// into logical groups:
/// - Pipeline management (create, list, get, delete)
/// - Run lifecycle (launch, terminate, pause, resume, disks, status)
/// - Registry management and push notifications
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Identity sent with every request, when set
    user: Option<String>,
}

impl ApiClient {
    /// Create a new orchestrator client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator API (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            user: None,
        }
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            user: None,
        }
    }

    /// Set the identity sent with every request
    pub fn as_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Request Builders
    // =============================================================================

    fn get(&self, url: String) -> RequestBuilder {
        self.with_user(self.client.get(url))
    }

    fn post(&self, url: String) -> RequestBuilder {
        self.with_user(self.client.post(url))
    }

    fn delete(&self, url: String) -> RequestBuilder {
        self.with_user(self.client.delete(url))
    }

    fn with_user(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.user {
            Some(user) => builder.header(USER_HEADER, user),
            None => builder,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    ///
    /// This method checks the status code and returns an error if the request failed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = ApiClient::with_client("http://localhost:8080", http_client);
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_keeps_user_identity() {
        let client = ApiClient::new("http://localhost:8080").as_user("researcher");
        assert_eq!(client.user.as_deref(), Some("researcher"));
    }
}
