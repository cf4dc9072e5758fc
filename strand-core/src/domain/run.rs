//! Run domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Pipeline run record
///
/// Structure shared between the orchestrator (persists) and clients (inspect).
/// A run is created on pipeline launch and mutated only through the lifecycle
/// service; once it reaches a terminal status it never changes again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub pipeline_id: Option<Uuid>,
    pub status: RunStatus,
    pub docker_image: String,
    pub owner: String,
    pub instance: Option<RunInstance>,
    pub service_urls: HashMap<String, String>,
    pub parameters: Vec<RunParameter>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Run execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Pausing,
    Paused,
    Resuming,
    Stopped,
    Failure,
    Success,
}

impl RunStatus {
    /// Whether the status is final. Terminal runs are never mutated again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Stopped | RunStatus::Failure | RunStatus::Success
        )
    }
}

/// Compute node backing a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInstance {
    pub node_name: String,
    pub node_type: Option<String>,
    pub node_disk: Option<i64>,
}

/// A single run parameter
///
/// `value` is the literal as submitted at launch and may embed `${NAME}` or
/// `$NAME` environment tokens; `resolved_value` is the substituted form.
/// The literal is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameter {
    pub name: String,
    pub value: String,
    pub resolved_value: Option<String>,
}

impl RunParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            resolved_value: None,
        }
    }

    /// The resolved form when substitution ran, else the literal value.
    pub fn effective_value(&self) -> &str {
        self.resolved_value.as_deref().unwrap_or(&self.value)
    }
}

/// A disk provisioned for a run by the node manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDisk {
    pub run_id: Uuid,
    pub device: String,
    pub size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(RunStatus::Stopped.is_terminal());
        assert!(RunStatus::Failure.is_terminal());
        assert!(RunStatus::Success.is_terminal());

        assert!(!RunStatus::Running.is_terminal());
        assert!(!RunStatus::Pausing.is_terminal());
        assert!(!RunStatus::Paused.is_terminal());
        assert!(!RunStatus::Resuming.is_terminal());
    }

    #[test]
    fn test_run_parameter_starts_unresolved() {
        let param = RunParameter::new("input", "s3://bucket/$RUN_ID/");
        assert_eq!(param.value, "s3://bucket/$RUN_ID/");
        assert!(param.resolved_value.is_none());
        // an unresolved parameter reads as its literal
        assert_eq!(param.effective_value(), "s3://bucket/$RUN_ID/");
    }
}
