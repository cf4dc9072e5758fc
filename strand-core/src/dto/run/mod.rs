//! Run DTOs for API communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::registry::Tool;
use crate::domain::run::{Run, RunParameter, RunStatus};

/// Request to launch a new run from a pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchRun {
    pub pipeline_id: Uuid,
    /// Literal parameters; resolved values submitted here are ignored and
    /// recomputed against the pipeline's environment.
    #[serde(default)]
    pub parameters: Vec<RunParameter>,
}

/// Request to attach an additional disk to a live run
///
/// `size` must be present and positive; anything else is rejected before the
/// run's status is even considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskAttachRequest {
    pub size: Option<i64>,
}

impl DiskAttachRequest {
    pub fn new(size: i64) -> Self {
        Self { size: Some(size) }
    }
}

/// Final status report for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatusUpdate {
    pub status: RunStatus,
}

/// A run paired with the tool backing its docker image, if one is registered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunWithTool {
    pub run: Run,
    pub tool: Option<Tool>,
}

/// Request to look up runs together with their tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunIds {
    pub run_ids: Vec<Uuid>,
}

/// Lightweight run summary for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDto {
    pub id: Uuid,
    pub pipeline_id: Option<Uuid>,
    pub status: RunStatus,
    pub docker_image: String,
    pub owner: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Run> for RunDto {
    fn from(run: Run) -> Self {
        Self {
            id: run.id,
            pipeline_id: run.pipeline_id,
            status: run.status,
            docker_image: run.docker_image,
            owner: run.owner,
            started_at: run.started_at,
            finished_at: run.finished_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_dto_conversion() {
        let run = Run {
            id: Uuid::new_v4(),
            pipeline_id: Some(Uuid::new_v4()),
            status: RunStatus::Running,
            docker_image: "registry:5000/library/tool:latest".to_string(),
            owner: "user".to_string(),
            instance: None,
            service_urls: Default::default(),
            parameters: vec![],
            started_at: chrono::Utc::now(),
            finished_at: None,
        };

        let dto: RunDto = run.clone().into();
        assert_eq!(dto.id, run.id);
        assert_eq!(dto.status, run.status);
        assert_eq!(dto.docker_image, run.docker_image);
    }

    #[test]
    fn test_disk_attach_request_roundtrip() {
        let req = DiskAttachRequest::new(50);
        let json = serde_json::to_string(&req).unwrap();
        let back: DiskAttachRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
