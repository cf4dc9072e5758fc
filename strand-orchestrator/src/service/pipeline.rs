//! Pipeline Service
//!
//! Business logic for pipeline management.

use std::sync::Arc;

use strand_core::domain::pipeline::Pipeline;
use strand_core::dto::pipeline::CreatePipeline;
use uuid::Uuid;

use crate::repository::StoreError;
use crate::repository::pipeline::PipelineStore;

/// Service error type
#[derive(Debug)]
pub enum PipelineError {
    NotFound(Uuid),
    Validation(String),
    Store(StoreError),
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        PipelineError::Store(err)
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline management service
pub struct PipelineService {
    pipelines: Arc<dyn PipelineStore>,
}

impl PipelineService {
    pub fn new(pipelines: Arc<dyn PipelineStore>) -> Self {
        Self { pipelines }
    }

    /// Create a new pipeline
    pub async fn create_pipeline(&self, req: CreatePipeline) -> Result<Pipeline> {
        validate_pipeline_request(&req)?;

        let pipeline = self.pipelines.create(req).await?;

        tracing::info!("Pipeline created: {} ({})", pipeline.name, pipeline.id);

        Ok(pipeline)
    }

    /// Get a pipeline by ID
    pub async fn get_pipeline(&self, id: Uuid) -> Result<Pipeline> {
        let pipeline = self
            .pipelines
            .load(id)
            .await?
            .ok_or(PipelineError::NotFound(id))?;

        Ok(pipeline)
    }

    /// List all pipelines
    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
        let pipelines = self.pipelines.list_all().await?;
        Ok(pipelines)
    }

    /// Delete a pipeline
    pub async fn delete_pipeline(&self, id: Uuid) -> Result<()> {
        let deleted = self.pipelines.delete(id).await?;

        if !deleted {
            return Err(PipelineError::NotFound(id));
        }

        tracing::info!("Pipeline deleted: {}", id);

        Ok(())
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_pipeline_request(req: &CreatePipeline) -> Result<()> {
    if req.name.trim().is_empty() {
        return Err(PipelineError::Validation(
            "Pipeline name cannot be empty".to_string(),
        ));
    }

    if req.name.len() > 255 {
        return Err(PipelineError::Validation(
            "Pipeline name is too long (max 255 characters)".to_string(),
        ));
    }

    if req.docker_image.trim().is_empty() {
        return Err(PipelineError::Validation(
            "Pipeline docker image cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, docker_image: &str) -> CreatePipeline {
        CreatePipeline {
            name: name.to_string(),
            description: None,
            docker_image: docker_image.to_string(),
            tags: vec![],
            config: None,
        }
    }

    #[test]
    fn test_validate_empty_name() {
        let result = validate_pipeline_request(&request("", "registry:5000/library/tool"));
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_validate_empty_docker_image() {
        let result = validate_pipeline_request(&request("rnaseq", ""));
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_validate_valid_request() {
        let result = validate_pipeline_request(&request("rnaseq", "registry:5000/library/rnaseq"));
        assert!(result.is_ok());
    }
}
