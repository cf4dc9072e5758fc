//! Registry-related API endpoints

use crate::ApiClient;
use crate::error::Result;
use strand_core::domain::registry::{DockerRegistry, Tool};
use strand_core::dto::registry::{CreateRegistry, DockerRegistryEventEnvelope};

/// Header under which a registry addresses its push notifications.
pub const REGISTRY_PATH_HEADER: &str = "Registry-Path";

impl ApiClient {
    // =============================================================================
    // Registry Management
    // =============================================================================

    /// Register a docker registry
    pub async fn create_registry(&self, req: CreateRegistry) -> Result<DockerRegistry> {
        let url = format!("{}/registry/create", self.base_url);
        let response = self.post(url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// List all registries
    pub async fn list_registries(&self) -> Result<Vec<DockerRegistry>> {
        let url = format!("{}/registry/list", self.base_url);
        let response = self.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Post a push-notification envelope on behalf of a registry
    ///
    /// # Arguments
    /// * `registry_host` - The host the registry is registered under; when
    ///   absent each event's own request host is used
    /// * `envelope` - The event envelope
    ///
    /// # Returns
    /// The tools affected by the envelope's push events
    pub async fn notify_registry_events(
        &self,
        registry_host: Option<&str>,
        envelope: DockerRegistryEventEnvelope,
    ) -> Result<Vec<Tool>> {
        let url = format!("{}/registry/notify", self.base_url);

        let mut request = self.post(url).json(&envelope);
        if let Some(host) = registry_host {
            request = request.header(REGISTRY_PATH_HEADER, host);
        }

        let response = request.send().await?;

        self.handle_response(response).await
    }
}
