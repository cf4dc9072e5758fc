//! Pipeline DTOs for API communication

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::PipelineConfig;

/// Request to create a new pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePipeline {
    pub name: String,
    pub description: Option<String>,
    pub docker_image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub config: Option<PipelineConfig>,
}
