//! Pipeline domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Pipeline definition
///
/// Structure shared between the orchestrator (persists) and clients (launch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub docker_image: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub tags: Vec<String>,
    pub config: PipelineConfig,
}

/// Pipeline configuration options
///
/// `env_vars` is the environment used to resolve `${NAME}`/`$NAME` tokens in
/// run parameters at launch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub instance_type: Option<String>,
    pub disk_size: Option<i64>,
    pub env_vars: HashMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            instance_type: None,
            disk_size: Some(20),
            env_vars: HashMap::new(),
        }
    }
}
