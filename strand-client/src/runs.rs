//! Run-related API endpoints

use crate::ApiClient;
use crate::error::Result;
use strand_core::domain::run::{Run, RunDisk, RunStatus};
use strand_core::dto::run::{
    DiskAttachRequest, LaunchRun, RunDto, RunIds, RunStatusUpdate, RunWithTool,
};
use uuid::Uuid;

impl ApiClient {
    // =============================================================================
    // Run Lifecycle
    // =============================================================================

    /// Launch a new run from a pipeline
    ///
    /// # Arguments
    /// * `req` - The launch request
    ///
    /// # Returns
    /// The created run
    pub async fn launch_run(&self, req: LaunchRun) -> Result<Run> {
        let url = format!("{}/run/launch", self.base_url);
        let response = self.post(url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Get a run by ID
    pub async fn get_run(&self, run_id: Uuid) -> Result<Run> {
        let url = format!("{}/run/{}", self.base_url, run_id);
        let response = self.get(url).send().await?;

        self.handle_response(response).await
    }

    /// List all runs
    pub async fn list_runs(&self) -> Result<Vec<RunDto>> {
        let url = format!("{}/run/list", self.base_url);
        let response = self.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Terminate a paused run and its compute node
    ///
    /// Only runs in the Paused state may be terminated.
    pub async fn terminate_run(&self, run_id: Uuid) -> Result<Run> {
        let url = format!("{}/run/{}/terminate", self.base_url, run_id);
        let response = self.post(url).send().await?;

        self.handle_response(response).await
    }

    /// Request that a running run be paused
    pub async fn pause_run(&self, run_id: Uuid) -> Result<Run> {
        let url = format!("{}/run/{}/pause", self.base_url, run_id);
        let response = self.post(url).send().await?;

        self.handle_response(response).await
    }

    /// Request that a paused run be resumed
    pub async fn resume_run(&self, run_id: Uuid) -> Result<Run> {
        let url = format!("{}/run/{}/resume", self.base_url, run_id);
        let response = self.post(url).send().await?;

        self.handle_response(response).await
    }

    /// Attach an additional disk to a live run
    ///
    /// # Arguments
    /// * `run_id` - The run to attach the disk to
    /// * `size` - Requested disk size in GB, must be positive
    pub async fn attach_disk(&self, run_id: Uuid, size: i64) -> Result<RunDisk> {
        let url = format!("{}/run/{}/disk", self.base_url, run_id);
        let response = self
            .post(url)
            .json(&DiskAttachRequest::new(size))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Record a run's final status
    pub async fn update_run_status(&self, run_id: Uuid, status: RunStatus) -> Result<Run> {
        let url = format!("{}/run/{}/status", self.base_url, run_id);
        let response = self
            .post(url)
            .json(&RunStatusUpdate { status })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Load runs together with the tools backing their docker images
    pub async fn load_runs_with_tools(&self, run_ids: Vec<Uuid>) -> Result<Vec<RunWithTool>> {
        let url = format!("{}/run/tools", self.base_url);
        let response = self.post(url).json(&RunIds { run_ids }).send().await?;

        self.handle_response(response).await
    }
}
