//! Run Service
//!
//! Business logic for run lifecycle management: launching runs from
//! pipelines, the status-gated terminate/pause/resume transitions, disk
//! attachment, and run/tool correlation.

use std::collections::HashMap;
use std::sync::Arc;

use strand_core::domain::run::{Run, RunDisk, RunStatus};
use strand_core::dto::run::{DiskAttachRequest, LaunchRun, RunWithTool};
use uuid::Uuid;

use crate::nodes::{NodeError, NodeManager};
use crate::repository::StoreError;
use crate::repository::permission::{AclTarget, PermissionChecker};
use crate::repository::pipeline::PipelineStore;
use crate::repository::registry::RegistryStore;
use crate::repository::run::RunStore;
use crate::repository::tool::ToolStore;
use crate::service::params::resolve_parameters;

/// Service error type
#[derive(Debug)]
pub enum RunError {
    NotFound(Uuid),
    PipelineNotFound(Uuid),
    Validation(String),
    IllegalState(String),
    PermissionDenied(String),
    Store(StoreError),
    Node(NodeError),
}

impl From<StoreError> for RunError {
    fn from(err: StoreError) -> Self {
        RunError::Store(err)
    }
}

impl From<NodeError> for RunError {
    fn from(err: NodeError) -> Self {
        RunError::Node(err)
    }
}

pub type Result<T> = std::result::Result<T, RunError>;

/// Run lifecycle service
pub struct RunService {
    runs: Arc<dyn RunStore>,
    pipelines: Arc<dyn PipelineStore>,
    registries: Arc<dyn RegistryStore>,
    tools: Arc<dyn ToolStore>,
    nodes: Arc<dyn NodeManager>,
    permissions: Arc<dyn PermissionChecker>,
}

impl RunService {
    pub fn new(
        runs: Arc<dyn RunStore>,
        pipelines: Arc<dyn PipelineStore>,
        registries: Arc<dyn RegistryStore>,
        tools: Arc<dyn ToolStore>,
        nodes: Arc<dyn NodeManager>,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        Self {
            runs,
            pipelines,
            registries,
            tools,
            nodes,
            permissions,
        }
    }

    /// Launch a new run from a pipeline
    ///
    /// Parameters are resolved against the pipeline's configured environment
    /// before the run is persisted; the literal values are kept as submitted.
    pub async fn launch_run(&self, principal: &str, req: LaunchRun) -> Result<Run> {
        let pipeline = self
            .pipelines
            .load(req.pipeline_id)
            .await?
            .ok_or(RunError::PipelineNotFound(req.pipeline_id))?;

        let parameters = resolve_parameters(req.parameters, &pipeline.config.env_vars);

        let run = Run {
            id: Uuid::new_v4(),
            pipeline_id: Some(pipeline.id),
            status: RunStatus::Running,
            docker_image: pipeline.docker_image.clone(),
            owner: principal.to_string(),
            instance: None,
            service_urls: HashMap::new(),
            parameters,
            started_at: chrono::Utc::now(),
            finished_at: None,
        };

        self.runs.create(&run).await?;

        tracing::info!("Run created: {} for pipeline: {}", run.id, pipeline.id);

        Ok(run)
    }

    /// Get a run by ID
    pub async fn get_run(&self, id: Uuid) -> Result<Run> {
        let run = self.runs.load(id).await?.ok_or(RunError::NotFound(id))?;
        Ok(run)
    }

    /// List all runs
    pub async fn list_runs(&self) -> Result<Vec<Run>> {
        let runs = self.runs.list_all().await?;
        Ok(runs)
    }

    /// Terminate a paused run
    ///
    /// The run's node is terminated first; only then is the status driven to
    /// Stopped. Any precondition failure leaves the run untouched.
    pub async fn terminate_run(&self, principal: &str, run_id: Uuid) -> Result<Run> {
        let mut run = self
            .runs
            .load(run_id)
            .await?
            .ok_or(RunError::NotFound(run_id))?;

        self.ensure_run_write(principal, &run).await?;

        if run.status != RunStatus::Paused {
            return Err(RunError::IllegalState(format!(
                "Run {} is not in Paused state (current: {:?})",
                run_id, run.status
            )));
        }

        self.nodes.terminate_run(&run).await?;

        run.status = RunStatus::Stopped;
        run.finished_at = Some(chrono::Utc::now());
        self.runs.update_status(&run).await?;

        tracing::info!("Run {} terminated", run_id);

        Ok(run)
    }

    /// Attach a disk to a live run
    ///
    /// Delegates to the node manager with the unchanged run and request and
    /// passes its result through.
    pub async fn attach_disk(
        &self,
        principal: &str,
        run_id: Uuid,
        request: DiskAttachRequest,
    ) -> Result<RunDisk> {
        let run = self
            .runs
            .load(run_id)
            .await?
            .ok_or(RunError::NotFound(run_id))?;

        match request.size {
            Some(size) if size > 0 => {}
            _ => {
                return Err(RunError::Validation(format!(
                    "Invalid disk size: {:?}",
                    request.size
                )));
            }
        }

        self.ensure_run_write(principal, &run).await?;

        match run.status {
            RunStatus::Running | RunStatus::Pausing | RunStatus::Paused | RunStatus::Resuming => {}
            other => {
                return Err(RunError::IllegalState(format!(
                    "Cannot attach disk to run {} in state {:?}",
                    run_id, other
                )));
            }
        }

        let disk = self.nodes.attach_disk(&run, &request).await?;

        tracing::info!("Disk of {} GB attached to run {}", disk.size, run_id);

        Ok(disk)
    }

    /// Request that a running run be paused
    pub async fn pause_run(&self, principal: &str, run_id: Uuid) -> Result<Run> {
        self.transition(principal, run_id, RunStatus::Running, RunStatus::Pausing)
            .await
    }

    /// Request that a paused run be resumed
    pub async fn resume_run(&self, principal: &str, run_id: Uuid) -> Result<Run> {
        self.transition(principal, run_id, RunStatus::Paused, RunStatus::Resuming)
            .await
    }

    /// Record a run's final status
    pub async fn update_run_status(&self, run_id: Uuid, status: RunStatus) -> Result<Run> {
        if !status.is_terminal() {
            return Err(RunError::Validation(format!(
                "Invalid final status: {:?}",
                status
            )));
        }

        let mut run = self
            .runs
            .load(run_id)
            .await?
            .ok_or(RunError::NotFound(run_id))?;

        run.status = status;
        run.finished_at = Some(chrono::Utc::now());
        self.runs.update_status(&run).await?;

        tracing::info!("Run {} finished with status: {:?}", run_id, status);

        Ok(run)
    }

    /// Load runs together with the tools backing their docker images
    ///
    /// A run's image is matched to a registry by host prefix, the tag is
    /// stripped, and the remaining repository path is looked up within that
    /// registry. Runs with no matching registry or tool pair with None.
    pub async fn load_runs_with_tools(&self, run_ids: &[Uuid]) -> Result<Vec<RunWithTool>> {
        let registries = self.registries.list_all().await?;
        let runs = self.runs.load_by_ids(run_ids).await?;

        // (registry id, image) for every run whose image matches a registry
        let keys: Vec<Option<(Uuid, String)>> = runs
            .iter()
            .map(|run| {
                registries
                    .iter()
                    .find(|registry| {
                        run.docker_image
                            .strip_prefix(&registry.path)
                            .is_some_and(|rest| rest.starts_with('/'))
                    })
                    .map(|registry| {
                        let image = run.docker_image[registry.path.len() + 1..]
                            .split(':')
                            .next()
                            .unwrap_or_default()
                            .to_string();
                        (registry.id, image)
                    })
            })
            .collect();

        let mut images_by_registry: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (registry_id, image) in keys.iter().flatten() {
            images_by_registry
                .entry(*registry_id)
                .or_default()
                .push(image.clone());
        }

        let mut tools_by_key = HashMap::new();
        for (registry_id, images) in &images_by_registry {
            let tools = self
                .tools
                .load_all_by_registry_and_image_in(*registry_id, images)
                .await?;
            for tool in tools {
                tools_by_key.insert((*registry_id, tool.image.clone()), tool);
            }
        }

        Ok(runs
            .into_iter()
            .zip(keys)
            .map(|(run, key)| {
                let tool = key.and_then(|k| tools_by_key.get(&k).cloned());
                RunWithTool { run, tool }
            })
            .collect())
    }

    async fn transition(
        &self,
        principal: &str,
        run_id: Uuid,
        expected: RunStatus,
        next: RunStatus,
    ) -> Result<Run> {
        let mut run = self
            .runs
            .load(run_id)
            .await?
            .ok_or(RunError::NotFound(run_id))?;

        self.ensure_run_write(principal, &run).await?;

        if run.status != expected {
            return Err(RunError::IllegalState(format!(
                "Run {} is not in {:?} state (current: {:?})",
                run_id, expected, run.status
            )));
        }

        run.status = next;
        self.runs.update_status(&run).await?;

        tracing::info!("Run {} moved to {:?}", run_id, next);

        Ok(run)
    }

    async fn ensure_run_write(&self, principal: &str, run: &Run) -> Result<()> {
        let target = AclTarget::Run {
            id: run.id,
            owner: run.owner.clone(),
        };

        if !self.permissions.is_write_allowed(principal, &target).await? {
            return Err(RunError::PermissionDenied(format!(
                "User {} may not modify run {}",
                principal, run.id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{
        AllowAllPermissions, InMemoryPipelineStore, InMemoryRegistryStore, InMemoryRunStore,
        InMemoryToolStore, RecordingNodeManager,
    };
    use strand_core::domain::pipeline::{Pipeline, PipelineConfig};
    use strand_core::domain::registry::{DockerRegistry, Tool};
    use strand_core::domain::run::{RunInstance, RunParameter};

    const OWNER: &str = "user";
    const NODE_NAME: &str = "node-1";
    const SIZE: i64 = 10;

    struct Fixture {
        runs: Arc<InMemoryRunStore>,
        pipelines: Arc<InMemoryPipelineStore>,
        registries: Arc<InMemoryRegistryStore>,
        tools: Arc<InMemoryToolStore>,
        nodes: Arc<RecordingNodeManager>,
        service: RunService,
    }

    fn fixture() -> Fixture {
        let runs = Arc::new(InMemoryRunStore::default());
        let pipelines = Arc::new(InMemoryPipelineStore::default());
        let registries = Arc::new(InMemoryRegistryStore::default());
        let tools = Arc::new(InMemoryToolStore::default());
        let nodes = Arc::new(RecordingNodeManager::default());

        let service = RunService::new(
            runs.clone(),
            pipelines.clone(),
            registries.clone(),
            tools.clone(),
            nodes.clone(),
            Arc::new(AllowAllPermissions),
        );

        Fixture {
            runs,
            pipelines,
            registries,
            tools,
            nodes,
            service,
        }
    }

    fn run(status: RunStatus) -> Run {
        Run {
            id: Uuid::new_v4(),
            pipeline_id: None,
            status,
            docker_image: "registry:5000/library/tool:latest".to_string(),
            owner: OWNER.to_string(),
            instance: Some(RunInstance {
                node_name: NODE_NAME.to_string(),
                node_type: None,
                node_disk: None,
            }),
            service_urls: HashMap::new(),
            parameters: vec![],
            started_at: chrono::Utc::now(),
            finished_at: None,
        }
    }

    #[tokio::test]
    async fn test_terminate_not_existing_run() {
        let f = fixture();

        let result = f.service.terminate_run(OWNER, Uuid::new_v4()).await;

        assert!(matches!(result, Err(RunError::NotFound(_))));
        assert_eq!(f.nodes.terminations(), 0);
    }

    #[tokio::test]
    async fn test_terminate_not_paused_run() {
        let f = fixture();
        let run = run(RunStatus::Running);
        f.runs.insert(run.clone());

        let result = f.service.terminate_run(OWNER, run.id).await;

        assert!(matches!(result, Err(RunError::IllegalState(_))));
        // status untouched, node never called
        assert_eq!(f.runs.status_of(run.id), RunStatus::Running);
        assert_eq!(f.nodes.terminations(), 0);
    }

    #[tokio::test]
    async fn test_terminate_paused_run_terminates_instance_node() {
        let f = fixture();
        let run = run(RunStatus::Paused);
        f.runs.insert(run.clone());

        f.service.terminate_run(OWNER, run.id).await.unwrap();

        assert_eq!(f.nodes.terminations(), 1);
        assert_eq!(f.nodes.terminated_runs(), vec![run.id]);
    }

    #[tokio::test]
    async fn test_terminate_paused_run_changes_status_to_stopped() {
        let f = fixture();
        let run = run(RunStatus::Paused);
        f.runs.insert(run.clone());

        let terminated = f.service.terminate_run(OWNER, run.id).await.unwrap();

        assert_eq!(terminated.status, RunStatus::Stopped);
        assert_eq!(f.runs.status_of(run.id), RunStatus::Stopped);
    }

    #[tokio::test]
    async fn test_attach_disk_to_not_existing_run() {
        let f = fixture();

        let result = f
            .service
            .attach_disk(OWNER, Uuid::new_v4(), DiskAttachRequest::new(SIZE))
            .await;

        assert!(matches!(result, Err(RunError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_attach_disk_with_invalid_size() {
        let f = fixture();

        // rejected before the status guard, so even a stopped run reports
        // the bad size rather than its state
        for status in [RunStatus::Running, RunStatus::Stopped] {
            let run = run(status);
            f.runs.insert(run.clone());

            for request in [
                DiskAttachRequest { size: None },
                DiskAttachRequest::new(-SIZE),
                DiskAttachRequest::new(0),
            ] {
                let result = f.service.attach_disk(OWNER, run.id, request).await;
                assert!(matches!(result, Err(RunError::Validation(_))));
            }
        }
        assert_eq!(f.nodes.attachments(), 0);
    }

    #[tokio::test]
    async fn test_attach_disk_to_invalid_runs() {
        let f = fixture();

        for status in [RunStatus::Stopped, RunStatus::Failure, RunStatus::Success] {
            let run = run(status);
            f.runs.insert(run.clone());

            let result = f
                .service
                .attach_disk(OWNER, run.id, DiskAttachRequest::new(SIZE))
                .await;
            assert!(matches!(result, Err(RunError::IllegalState(_))));
        }
        assert_eq!(f.nodes.attachments(), 0);
    }

    #[tokio::test]
    async fn test_attach_disk_to_valid_runs() {
        let f = fixture();

        for status in [
            RunStatus::Running,
            RunStatus::Pausing,
            RunStatus::Paused,
            RunStatus::Resuming,
        ] {
            let run = run(status);
            f.runs.insert(run.clone());

            let disk = f
                .service
                .attach_disk(OWNER, run.id, DiskAttachRequest::new(SIZE))
                .await
                .unwrap();

            // the node manager's result is passed through unchanged
            assert_eq!(disk, f.nodes.last_disk().unwrap());
            assert_eq!(disk.run_id, run.id);
            assert_eq!(disk.size, SIZE);
        }
        assert_eq!(f.nodes.attachments(), 4);
    }

    #[tokio::test]
    async fn test_pause_requires_running() {
        let f = fixture();
        let paused = run(RunStatus::Paused);
        f.runs.insert(paused.clone());

        let result = f.service.pause_run(OWNER, paused.id).await;
        assert!(matches!(result, Err(RunError::IllegalState(_))));

        let running = run(RunStatus::Running);
        f.runs.insert(running.clone());

        let updated = f.service.pause_run(OWNER, running.id).await.unwrap();
        assert_eq!(updated.status, RunStatus::Pausing);
    }

    #[tokio::test]
    async fn test_resume_requires_paused() {
        let f = fixture();
        let running = run(RunStatus::Running);
        f.runs.insert(running.clone());

        let result = f.service.resume_run(OWNER, running.id).await;
        assert!(matches!(result, Err(RunError::IllegalState(_))));

        let paused = run(RunStatus::Paused);
        f.runs.insert(paused.clone());

        let updated = f.service.resume_run(OWNER, paused.id).await.unwrap();
        assert_eq!(updated.status, RunStatus::Resuming);
    }

    #[tokio::test]
    async fn test_update_run_status_rejects_non_terminal_targets() {
        let f = fixture();
        let run = run(RunStatus::Running);
        f.runs.insert(run.clone());

        for status in [RunStatus::Running, RunStatus::Pausing, RunStatus::Resuming] {
            let result = f.service.update_run_status(run.id, status).await;
            assert!(matches!(result, Err(RunError::Validation(_))));
        }

        let updated = f
            .service
            .update_run_status(run.id, RunStatus::Success)
            .await
            .unwrap();
        assert_eq!(updated.status, RunStatus::Success);
        assert!(updated.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_launch_resolves_parameters_against_pipeline_env() {
        let f = fixture();

        let mut env_vars = HashMap::new();
        env_vars.insert("SAMPLES".to_string(), "s3://samples".to_string());

        let pipeline = Pipeline {
            id: Uuid::new_v4(),
            name: "rnaseq".to_string(),
            description: None,
            docker_image: "registry:5000/library/rnaseq:latest".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            tags: vec![],
            config: PipelineConfig {
                instance_type: None,
                disk_size: Some(20),
                env_vars,
            },
        };
        f.pipelines.insert(pipeline.clone());

        let launched = f
            .service
            .launch_run(
                OWNER,
                LaunchRun {
                    pipeline_id: pipeline.id,
                    parameters: vec![RunParameter::new("input", "$SAMPLES/batch-1/")],
                },
            )
            .await
            .unwrap();

        assert_eq!(launched.status, RunStatus::Running);
        assert_eq!(launched.docker_image, pipeline.docker_image);
        assert_eq!(launched.parameters[0].value, "$SAMPLES/batch-1/");
        assert_eq!(
            launched.parameters[0].resolved_value.as_deref(),
            Some("s3://samples/batch-1/")
        );
        // persisted as returned
        assert_eq!(f.runs.status_of(launched.id), RunStatus::Running);
    }

    #[tokio::test]
    async fn test_launch_fails_for_missing_pipeline() {
        let f = fixture();

        let result = f
            .service
            .launch_run(
                OWNER,
                LaunchRun {
                    pipeline_id: Uuid::new_v4(),
                    parameters: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(RunError::PipelineNotFound(_))));
    }

    #[tokio::test]
    async fn test_load_runs_with_tools_matches_registry_prefix() {
        let f = fixture();

        let registry = DockerRegistry {
            id: Uuid::new_v4(),
            path: "registry:5000".to_string(),
            description: None,
            external_url: None,
            owner: OWNER.to_string(),
            created_at: chrono::Utc::now(),
        };
        f.registries.insert(registry.clone());

        let tool = Tool {
            id: Uuid::new_v4(),
            registry_id: registry.id,
            registry: registry.path.clone(),
            tool_group_id: Uuid::new_v4(),
            tool_group: "library".to_string(),
            image: "library/tool".to_string(),
            owner: OWNER.to_string(),
            cpu: "1000mi".to_string(),
            ram: "1Gi".to_string(),
            created_at: chrono::Utc::now(),
        };
        f.tools.insert(tool.clone());

        let known = run(RunStatus::Running);
        f.runs.insert(known.clone());

        let mut unknown = run(RunStatus::Running);
        unknown.docker_image = "elsewhere:5000/library/tool:latest".to_string();
        f.runs.insert(unknown.clone());

        let result = f
            .service
            .load_runs_with_tools(&[known.id, unknown.id])
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        for entry in result {
            if entry.run.id == known.id {
                assert_eq!(entry.tool.as_ref().map(|t| t.id), Some(tool.id));
            } else {
                assert!(entry.tool.is_none());
            }
        }
    }
}
