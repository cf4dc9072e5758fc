//! Node management
//!
//! Talks to the node-management service for instance-level operations:
//! - Terminating the compute node behind a run
//! - Attaching additional disks to a live node
//!
//! The trait is the seam the lifecycle service is tested against; the HTTP
//! implementation is the production adapter.

use async_trait::async_trait;
use serde::Serialize;
use strand_core::domain::run::{Run, RunDisk};
use strand_core::dto::run::DiskAttachRequest;
use thiserror::Error;

/// Errors surfaced by node management calls
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("node request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("node service error (status {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("run {0} has no instance")]
    NoInstance(uuid::Uuid),
}

/// Collaborator trait for node-level side effects
#[async_trait]
pub trait NodeManager: Send + Sync {
    /// Terminates the compute node backing the run
    async fn terminate_run(&self, run: &Run) -> Result<(), NodeError>;

    /// Attaches a disk of the requested size to the run's node
    async fn attach_disk(
        &self,
        run: &Run,
        request: &DiskAttachRequest,
    ) -> Result<RunDisk, NodeError>;
}

/// HTTP implementation of [`NodeManager`]
pub struct HttpNodeManager {
    client: reqwest::Client,
    node_service_url: String,
}

impl HttpNodeManager {
    /// Creates a new HTTP node manager
    ///
    /// # Arguments
    /// * `node_service_url` - Base URL of the node-management service
    pub fn new(node_service_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            node_service_url,
        }
    }
}

#[async_trait]
impl NodeManager for HttpNodeManager {
    async fn terminate_run(&self, run: &Run) -> Result<(), NodeError> {
        let instance = run
            .instance
            .as_ref()
            .ok_or(NodeError::NoInstance(run.id))?;

        let url = format!(
            "{}/nodes/{}/terminate",
            self.node_service_url, instance.node_name
        );

        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NodeError::ServiceError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }

    async fn attach_disk(
        &self,
        run: &Run,
        request: &DiskAttachRequest,
    ) -> Result<RunDisk, NodeError> {
        let instance = run
            .instance
            .as_ref()
            .ok_or(NodeError::NoInstance(run.id))?;

        let url = format!(
            "{}/nodes/{}/disks",
            self.node_service_url, instance.node_name
        );

        let body = AttachDiskBody {
            run_id: run.id,
            size: request.size.unwrap_or_default(),
        };

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(NodeError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Serialize)]
struct AttachDiskBody {
    run_id: uuid::Uuid,
    size: i64,
}
