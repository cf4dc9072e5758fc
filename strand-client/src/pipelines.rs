//! Pipeline-related API endpoints

use crate::ApiClient;
use crate::error::Result;
use strand_core::domain::pipeline::Pipeline;
use strand_core::dto::pipeline::CreatePipeline;
use uuid::Uuid;

impl ApiClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// Create a new pipeline
    ///
    /// # Arguments
    /// * `req` - The pipeline creation request
    ///
    /// # Returns
    /// The created pipeline
    pub async fn create_pipeline(&self, req: CreatePipeline) -> Result<Pipeline> {
        let url = format!("{}/pipeline/create", self.base_url);
        let response = self.post(url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// List all pipelines
    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
        let url = format!("{}/pipeline/list", self.base_url);
        let response = self.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Get a pipeline by ID
    pub async fn get_pipeline(&self, pipeline_id: Uuid) -> Result<Pipeline> {
        let url = format!("{}/pipeline/{}", self.base_url, pipeline_id);
        let response = self.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Delete a pipeline
    pub async fn delete_pipeline(&self, pipeline_id: Uuid) -> Result<()> {
        let url = format!("{}/pipeline/{}", self.base_url, pipeline_id);
        let response = self.delete(url).send().await?;

        self.handle_empty_response(response).await
    }
}
