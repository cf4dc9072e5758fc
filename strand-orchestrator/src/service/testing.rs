//! In-memory store implementations for service tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use strand_core::domain::pipeline::Pipeline;
use strand_core::domain::registry::{DockerRegistry, Tool, ToolGroup, ToolVersion};
use strand_core::domain::run::{Run, RunDisk, RunStatus};
use strand_core::dto::pipeline::CreatePipeline;
use strand_core::dto::run::DiskAttachRequest;
use uuid::Uuid;

use crate::nodes::{NodeError, NodeManager};
use crate::repository::StoreResult;
use crate::repository::permission::{AclTarget, PermissionChecker};
use crate::repository::pipeline::PipelineStore;
use crate::repository::registry::RegistryStore;
use crate::repository::run::RunStore;
use crate::repository::tool::{ToolStore, ToolVersionStore};
use crate::repository::tool_group::ToolGroupStore;

#[derive(Default)]
pub struct InMemoryRunStore {
    runs: Mutex<HashMap<Uuid, Run>>,
}

impl InMemoryRunStore {
    pub fn insert(&self, run: Run) {
        self.runs.lock().unwrap().insert(run.id, run);
    }

    pub fn status_of(&self, id: Uuid) -> RunStatus {
        self.runs.lock().unwrap().get(&id).unwrap().status
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn load(&self, id: Uuid) -> StoreResult<Option<Run>> {
        Ok(self.runs.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, run: &Run) -> StoreResult<()> {
        self.runs.lock().unwrap().insert(run.id, run.clone());
        Ok(())
    }

    async fn update_status(&self, run: &Run) -> StoreResult<()> {
        if let Some(stored) = self.runs.lock().unwrap().get_mut(&run.id) {
            stored.status = run.status;
            stored.finished_at = run.finished_at;
        }
        Ok(())
    }

    async fn load_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Run>> {
        let runs = self.runs.lock().unwrap();
        Ok(ids.iter().filter_map(|id| runs.get(id).cloned()).collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<Run>> {
        Ok(self.runs.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryPipelineStore {
    pipelines: Mutex<HashMap<Uuid, Pipeline>>,
}

impl InMemoryPipelineStore {
    pub fn insert(&self, pipeline: Pipeline) {
        self.pipelines
            .lock()
            .unwrap()
            .insert(pipeline.id, pipeline);
    }
}

#[async_trait]
impl PipelineStore for InMemoryPipelineStore {
    async fn create(&self, req: CreatePipeline) -> StoreResult<Pipeline> {
        let now = chrono::Utc::now();
        let pipeline = Pipeline {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            docker_image: req.docker_image,
            created_at: now,
            updated_at: now,
            tags: req.tags,
            config: req.config.unwrap_or_default(),
        };
        self.insert(pipeline.clone());
        Ok(pipeline)
    }

    async fn load(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
        Ok(self.pipelines.lock().unwrap().get(&id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Pipeline>> {
        Ok(self.pipelines.lock().unwrap().values().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.pipelines.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryRegistryStore {
    registries: Mutex<Vec<DockerRegistry>>,
}

impl InMemoryRegistryStore {
    pub fn insert(&self, registry: DockerRegistry) {
        self.registries.lock().unwrap().push(registry);
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn create(&self, registry: &DockerRegistry) -> StoreResult<()> {
        self.insert(registry.clone());
        Ok(())
    }

    async fn load_by_path(&self, path: &str) -> StoreResult<Option<DockerRegistry>> {
        Ok(self
            .registries
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.path == path)
            .cloned())
    }

    async fn load_by_external_url(&self, url: &str) -> StoreResult<Option<DockerRegistry>> {
        Ok(self
            .registries
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.external_url.as_deref() == Some(url))
            .cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<DockerRegistry>> {
        Ok(self.registries.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct InMemoryToolGroupStore {
    groups: Mutex<Vec<ToolGroup>>,
}

impl InMemoryToolGroupStore {
    pub fn insert(&self, group: ToolGroup) {
        self.groups.lock().unwrap().push(group);
    }

    pub fn count(&self) -> usize {
        self.groups.lock().unwrap().len()
    }
}

#[async_trait]
impl ToolGroupStore for InMemoryToolGroupStore {
    async fn exists(&self, registry_id: Uuid, name: &str) -> StoreResult<bool> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .iter()
            .any(|g| g.registry_id == registry_id && g.name == name))
    }

    async fn load(&self, registry_id: Uuid, name: &str) -> StoreResult<Option<ToolGroup>> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.registry_id == registry_id && g.name == name)
            .cloned())
    }

    async fn create(&self, group: &ToolGroup) -> StoreResult<()> {
        self.insert(group.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryToolStore {
    tools: Mutex<Vec<Tool>>,
    created: Mutex<usize>,
}

impl InMemoryToolStore {
    pub fn insert(&self, tool: Tool) {
        self.tools.lock().unwrap().push(tool);
    }

    /// Number of tools created through the store trait (not seeded)
    pub fn created_count(&self) -> usize {
        *self.created.lock().unwrap()
    }
}

#[async_trait]
impl ToolStore for InMemoryToolStore {
    async fn find_by_image(&self, registry_id: Uuid, image: &str) -> StoreResult<Option<Tool>> {
        Ok(self
            .tools
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.registry_id == registry_id && t.image == image)
            .cloned())
    }

    async fn create(&self, tool: &Tool) -> StoreResult<Tool> {
        self.insert(tool.clone());
        *self.created.lock().unwrap() += 1;
        Ok(tool.clone())
    }

    async fn load_all_by_registry_and_image_in(
        &self,
        registry_id: Uuid,
        images: &[String],
    ) -> StoreResult<Vec<Tool>> {
        Ok(self
            .tools
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.registry_id == registry_id && images.contains(&t.image))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingToolVersionStore {
    versions: Mutex<Vec<ToolVersion>>,
}

impl RecordingToolVersionStore {
    pub fn recorded(&self) -> Vec<ToolVersion> {
        self.versions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolVersionStore for RecordingToolVersionStore {
    async fn upsert_version(
        &self,
        tool_id: Uuid,
        version: &str,
        digest: &str,
        size: i64,
    ) -> StoreResult<()> {
        self.versions.lock().unwrap().push(ToolVersion {
            tool_id,
            version: version.to_string(),
            digest: digest.to_string(),
            size,
            modified_at: chrono::Utc::now(),
        });
        Ok(())
    }
}

/// Node manager that records calls and fabricates disk results
#[derive(Default)]
pub struct RecordingNodeManager {
    terminated: Mutex<Vec<Uuid>>,
    disks: Mutex<Vec<RunDisk>>,
}

impl RecordingNodeManager {
    pub fn terminations(&self) -> usize {
        self.terminated.lock().unwrap().len()
    }

    pub fn terminated_runs(&self) -> Vec<Uuid> {
        self.terminated.lock().unwrap().clone()
    }

    pub fn attachments(&self) -> usize {
        self.disks.lock().unwrap().len()
    }

    pub fn last_disk(&self) -> Option<RunDisk> {
        self.disks.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl NodeManager for RecordingNodeManager {
    async fn terminate_run(&self, run: &Run) -> Result<(), NodeError> {
        self.terminated.lock().unwrap().push(run.id);
        Ok(())
    }

    async fn attach_disk(
        &self,
        run: &Run,
        request: &DiskAttachRequest,
    ) -> Result<RunDisk, NodeError> {
        let disk = RunDisk {
            run_id: run.id,
            device: "/dev/sdb".to_string(),
            size: request.size.unwrap_or_default(),
        };
        self.disks.lock().unwrap().push(disk.clone());
        Ok(disk)
    }
}

/// Permission checker that accepts every write
pub struct AllowAllPermissions;

#[async_trait]
impl PermissionChecker for AllowAllPermissions {
    async fn is_write_allowed(&self, _user: &str, _target: &AclTarget) -> StoreResult<bool> {
        Ok(true)
    }
}

/// Permission checker with the production owner rule and no grant rows
pub struct OwnerOnlyPermissions;

#[async_trait]
impl PermissionChecker for OwnerOnlyPermissions {
    async fn is_write_allowed(&self, user: &str, target: &AclTarget) -> StoreResult<bool> {
        let owner = match target {
            AclTarget::Registry { owner, .. }
            | AclTarget::ToolGroup { owner, .. }
            | AclTarget::Run { owner, .. } => owner,
        };
        Ok(user == owner)
    }
}
