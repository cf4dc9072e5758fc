//! Registry Service
//!
//! Business logic for docker registry management and push-notification
//! handling. The notification flow is batch-tolerant: a single event that
//! cannot be processed (unknown registry, malformed path, missing write
//! permission) is logged and skipped while the rest of the envelope still
//! processes.

use std::sync::Arc;

use strand_core::domain::registry::{DockerRegistry, Tool, ToolGroup};
use strand_core::dto::registry::{CreateRegistry, DockerRegistryEvent, DockerRegistryEventEnvelope};
use uuid::Uuid;

use crate::repository::StoreError;
use crate::repository::permission::{AclTarget, PermissionChecker};
use crate::repository::registry::RegistryStore;
use crate::repository::tool::{ToolStore, ToolVersionStore};
use crate::repository::tool_group::ToolGroupStore;

const PUSH_ACTION: &str = "push";

const DEFAULT_TOOL_CPU: &str = "1000mi";
const DEFAULT_TOOL_RAM: &str = "1Gi";

/// Service error type
#[derive(Debug)]
pub enum RegistryError {
    Validation(String),
    Store(StoreError),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        RegistryError::Store(err)
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Registry management service
pub struct RegistryService {
    registries: Arc<dyn RegistryStore>,
}

impl RegistryService {
    pub fn new(registries: Arc<dyn RegistryStore>) -> Self {
        Self { registries }
    }

    /// Register a docker registry
    pub async fn create_registry(
        &self,
        principal: &str,
        req: CreateRegistry,
    ) -> Result<DockerRegistry> {
        if req.path.trim().is_empty() {
            return Err(RegistryError::Validation(
                "Registry path cannot be empty".to_string(),
            ));
        }

        let registry = DockerRegistry {
            id: Uuid::new_v4(),
            path: req.path,
            description: req.description,
            external_url: req.external_url,
            owner: principal.to_string(),
            created_at: chrono::Utc::now(),
        };

        self.registries.create(&registry).await?;

        tracing::info!("Registry created: {} ({})", registry.path, registry.id);

        Ok(registry)
    }

    /// List all registries
    pub async fn list_registries(&self) -> Result<Vec<DockerRegistry>> {
        let registries = self.registries.list_all().await?;
        Ok(registries)
    }
}

/// Push-notification handler
///
/// Consumes registry event envelopes and registers new tool versions,
/// creating groups and tools lazily when the acting user is allowed to.
pub struct RegistryNotificationService {
    registries: Arc<dyn RegistryStore>,
    groups: Arc<dyn ToolGroupStore>,
    tools: Arc<dyn ToolStore>,
    versions: Arc<dyn ToolVersionStore>,
    permissions: Arc<dyn PermissionChecker>,
}

impl RegistryNotificationService {
    pub fn new(
        registries: Arc<dyn RegistryStore>,
        groups: Arc<dyn ToolGroupStore>,
        tools: Arc<dyn ToolStore>,
        versions: Arc<dyn ToolVersionStore>,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        Self {
            registries,
            groups,
            tools,
            versions,
            permissions,
        }
    }

    /// Process a registry event envelope
    ///
    /// `registry_host` is the host the notification endpoint was addressed
    /// under; when absent, each event's own request host is used. Returns the
    /// affected tool for every successfully processed push event, in event
    /// order. Repeated pushes of one image yield the same tool identity.
    pub async fn notify_registry_events(
        &self,
        registry_host: Option<String>,
        envelope: DockerRegistryEventEnvelope,
    ) -> Result<Vec<Tool>> {
        let mut affected = Vec::new();

        for event in &envelope.events {
            if event.action != PUSH_ACTION {
                tracing::debug!(
                    "Skipping {} event for {}",
                    event.action,
                    event.target.repository
                );
                continue;
            }

            if let Some(tool) = self.process_push_event(registry_host.as_deref(), event).await? {
                affected.push(tool);
            }
        }

        Ok(affected)
    }

    /// Handle one push event; Ok(None) means the event was skipped
    async fn process_push_event(
        &self,
        registry_host: Option<&str>,
        event: &DockerRegistryEvent,
    ) -> Result<Option<Tool>> {
        let host = registry_host.unwrap_or(&event.request.host);

        let Some(registry) = self.resolve_registry(host).await? else {
            tracing::warn!("No registry is configured for host {}, skipping event", host);
            return Ok(None);
        };

        let Some((group_name, _tool_name)) = event.group_and_tool() else {
            tracing::warn!(
                "Malformed repository path {}, skipping event",
                event.target.repository
            );
            return Ok(None);
        };

        let actor = &event.actor.name;
        let image = &event.target.repository;

        let Some(group) = self.resolve_group(&registry, group_name, actor).await? else {
            return Ok(None);
        };

        let Some(tool) = self.resolve_tool(&registry, &group, image, actor).await? else {
            return Ok(None);
        };

        self.versions
            .upsert_version(
                tool.id,
                &event.target.tag,
                &event.target.digest,
                event.target.length,
            )
            .await?;

        Ok(Some(tool))
    }

    /// Look the registry up by primary host, falling back to external URL
    async fn resolve_registry(&self, host: &str) -> Result<Option<DockerRegistry>> {
        if let Some(registry) = self.registries.load_by_path(host).await? {
            return Ok(Some(registry));
        }
        Ok(self.registries.load_by_external_url(host).await?)
    }

    /// Load the destination group, creating it when the actor may write to
    /// the registry. Ok(None) means the event must be skipped.
    async fn resolve_group(
        &self,
        registry: &DockerRegistry,
        group_name: &str,
        actor: &str,
    ) -> Result<Option<ToolGroup>> {
        if self.groups.exists(registry.id, group_name).await? {
            return Ok(self.groups.load(registry.id, group_name).await?);
        }

        let target = AclTarget::Registry {
            id: registry.id,
            owner: registry.owner.clone(),
        };
        if !self.permissions.is_write_allowed(actor, &target).await? {
            tracing::warn!(
                "User {} may not create group {} in registry {}, skipping event",
                actor,
                group_name,
                registry.path
            );
            return Ok(None);
        }

        let group = ToolGroup {
            id: Uuid::new_v4(),
            registry_id: registry.id,
            name: group_name.to_string(),
            owner: actor.to_string(),
            created_at: chrono::Utc::now(),
        };
        self.groups.create(&group).await?;

        tracing::info!("Tool group created: {}/{}", registry.path, group.name);

        Ok(Some(group))
    }

    /// Reuse the registered tool for this image, creating it when absent and
    /// the actor may write to the group. Ok(None) means the event must be
    /// skipped.
    async fn resolve_tool(
        &self,
        registry: &DockerRegistry,
        group: &ToolGroup,
        image: &str,
        actor: &str,
    ) -> Result<Option<Tool>> {
        if let Some(existing) = self.tools.find_by_image(registry.id, image).await? {
            return Ok(Some(existing));
        }

        let target = AclTarget::ToolGroup {
            id: group.id,
            owner: group.owner.clone(),
        };
        if !self.permissions.is_write_allowed(actor, &target).await? {
            tracing::warn!(
                "User {} may not register tools in group {}/{}, skipping event",
                actor,
                registry.path,
                group.name
            );
            return Ok(None);
        }

        let tool = Tool {
            id: Uuid::new_v4(),
            registry_id: registry.id,
            registry: registry.path.clone(),
            tool_group_id: group.id,
            tool_group: group.name.clone(),
            image: image.to_string(),
            owner: actor.to_string(),
            cpu: DEFAULT_TOOL_CPU.to_string(),
            ram: DEFAULT_TOOL_RAM.to_string(),
            created_at: chrono::Utc::now(),
        };
        let created = self.tools.create(&tool).await?;

        tracing::info!("Tool registered: {}/{}", registry.path, created.image);

        Ok(Some(created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{
        InMemoryRegistryStore, InMemoryToolGroupStore, InMemoryToolStore, OwnerOnlyPermissions,
        RecordingToolVersionStore,
    };
    use strand_core::dto::registry::{EventActor, EventRequest, EventTarget};

    const TEST_USER: &str = "USER";
    const ADMIN: &str = "ADMIN";
    const TEST_REPO: &str = "repository";
    const TEST_REPO_WITHOUT_WRITE_ACCESS: &str = "repository2";
    const TEST_REPO_WITH_EXTERNAL_PATH: &str = "repository3";
    const EXTERNAL_REPO_PATH: &str = "external_repository";
    const TEST_IMAGE: &str = "library/image";
    const TEST_IMAGE_NEW_GROUP: &str = "library2/image";
    const LATEST: &str = "latest";
    const DIGEST: &str = "sha256:4d2f";
    const DOCKER_SIZE: i64 = 123_456;

    struct Fixture {
        registries: Arc<InMemoryRegistryStore>,
        groups: Arc<InMemoryToolGroupStore>,
        tools: Arc<InMemoryToolStore>,
        versions: Arc<RecordingToolVersionStore>,
        service: RegistryNotificationService,
        repo_registry_id: Uuid,
        library_group_id: Uuid,
    }

    /// Mirrors the standard setup: `repository` and its `library` group are
    /// owned (and therefore writable) by USER, `repository2` is owned by
    /// ADMIN only, `repository3` is reachable through an external URL but
    /// its `library` group is writable by USER.
    fn fixture() -> Fixture {
        let registries = Arc::new(InMemoryRegistryStore::default());
        let groups = Arc::new(InMemoryToolGroupStore::default());
        let tools = Arc::new(InMemoryToolStore::default());
        let versions = Arc::new(RecordingToolVersionStore::default());

        let registry1 = registry(TEST_REPO, None, TEST_USER);
        let registry2 = registry(TEST_REPO_WITHOUT_WRITE_ACCESS, None, ADMIN);
        let registry3 = registry(
            TEST_REPO_WITH_EXTERNAL_PATH,
            Some(EXTERNAL_REPO_PATH),
            ADMIN,
        );
        let repo_registry_id = registry1.id;

        let library_group = group(registry1.id, "library", TEST_USER);
        let library_group_id = library_group.id;
        let external_library_group = group(registry3.id, "library", TEST_USER);

        registries.insert(registry1);
        registries.insert(registry2);
        registries.insert(registry3);
        groups.insert(library_group);
        groups.insert(external_library_group);

        let service = RegistryNotificationService::new(
            registries.clone(),
            groups.clone(),
            tools.clone(),
            versions.clone(),
            Arc::new(OwnerOnlyPermissions),
        );

        Fixture {
            registries,
            groups,
            tools,
            versions,
            service,
            repo_registry_id,
            library_group_id,
        }
    }

    fn registry(path: &str, external_url: Option<&str>, owner: &str) -> DockerRegistry {
        DockerRegistry {
            id: Uuid::new_v4(),
            path: path.to_string(),
            description: None,
            external_url: external_url.map(str::to_string),
            owner: owner.to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    fn group(registry_id: Uuid, name: &str, owner: &str) -> ToolGroup {
        ToolGroup {
            id: Uuid::new_v4(),
            registry_id,
            name: name.to_string(),
            owner: owner.to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    fn event(user: &str, host: &str, repository: &str, action: &str) -> DockerRegistryEvent {
        DockerRegistryEvent {
            action: action.to_string(),
            actor: EventActor {
                name: user.to_string(),
            },
            target: EventTarget {
                repository: repository.to_string(),
                tag: LATEST.to_string(),
                digest: DIGEST.to_string(),
                length: DOCKER_SIZE,
            },
            request: EventRequest {
                host: host.to_string(),
            },
        }
    }

    fn envelope(events: Vec<DockerRegistryEvent>) -> DockerRegistryEventEnvelope {
        DockerRegistryEventEnvelope { events }
    }

    #[tokio::test]
    async fn test_push_event_registers_tool_in_existing_group() {
        let f = fixture();
        let envelope = envelope(vec![event(TEST_USER, TEST_REPO, TEST_IMAGE, "push")]);

        let registered = f
            .service
            .notify_registry_events(Some(TEST_REPO.to_string()), envelope)
            .await
            .unwrap();

        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].image, TEST_IMAGE);
        assert_eq!(registered[0].registry_id, f.repo_registry_id);
        assert_eq!(registered[0].tool_group_id, f.library_group_id);
        assert_eq!(f.tools.created_count(), 1);
    }

    #[tokio::test]
    async fn test_push_event_creates_group_if_it_does_not_exist() {
        let f = fixture();
        let envelope = envelope(vec![event(TEST_USER, TEST_REPO, TEST_IMAGE_NEW_GROUP, "push")]);

        let registered = f
            .service
            .notify_registry_events(Some(TEST_REPO.to_string()), envelope)
            .await
            .unwrap();

        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].tool_group, "library2");
        // the two seeded groups plus the one created on demand
        assert_eq!(f.groups.count(), 3);
    }

    #[tokio::test]
    async fn test_pull_action_is_not_processed() {
        let f = fixture();
        let envelope = envelope(vec![event(TEST_USER, TEST_REPO, TEST_IMAGE, "pull")]);

        let registered = f
            .service
            .notify_registry_events(Some(TEST_REPO.to_string()), envelope)
            .await
            .unwrap();

        assert!(registered.is_empty());
        assert_eq!(f.tools.created_count(), 0);
        assert!(f.versions.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_registry_loaded_from_event_host_if_argument_absent() {
        let f = fixture();
        let envelope = envelope(vec![event(TEST_USER, TEST_REPO, TEST_IMAGE, "push")]);

        let registered = f
            .service
            .notify_registry_events(None, envelope)
            .await
            .unwrap();

        assert_eq!(registered.len(), 1);
    }

    #[tokio::test]
    async fn test_registry_loaded_by_external_host_name() {
        let f = fixture();
        let envelope = envelope(vec![event(TEST_USER, EXTERNAL_REPO_PATH, TEST_IMAGE, "push")]);

        let registered = f
            .service
            .notify_registry_events(Some(EXTERNAL_REPO_PATH.to_string()), envelope)
            .await
            .unwrap();

        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].registry, TEST_REPO_WITH_EXTERNAL_PATH);
    }

    #[tokio::test]
    async fn test_unknown_registry_skips_event() {
        let f = fixture();
        let envelope = envelope(vec![event(TEST_USER, "unknown-host", TEST_IMAGE, "push")]);

        let registered = f
            .service
            .notify_registry_events(None, envelope)
            .await
            .unwrap();

        assert!(registered.is_empty());
        assert_eq!(f.tools.created_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_repository_path_skips_event() {
        let f = fixture();
        let envelope = envelope(vec![event(TEST_USER, TEST_REPO, "no-delimiter", "push")]);

        let registered = f
            .service
            .notify_registry_events(Some(TEST_REPO.to_string()), envelope)
            .await
            .unwrap();

        assert!(registered.is_empty());
    }

    #[tokio::test]
    async fn test_tool_not_enabled_without_write_access_but_batch_continues() {
        let f = fixture();
        // first event targets a registry the actor may not write to and a
        // group that does not exist; second event is fine
        let envelope = envelope(vec![
            event(
                TEST_USER,
                TEST_REPO_WITHOUT_WRITE_ACCESS,
                TEST_IMAGE_NEW_GROUP,
                "push",
            ),
            event(TEST_USER, TEST_REPO, TEST_IMAGE, "push"),
        ]);

        let registered = f
            .service
            .notify_registry_events(None, envelope)
            .await
            .unwrap();

        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].registry, TEST_REPO);
        assert_eq!(f.tools.created_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_push_does_not_duplicate_tool() {
        let f = fixture();
        let envelope = envelope(vec![
            event(TEST_USER, TEST_REPO, TEST_IMAGE, "push"),
            event(TEST_USER, TEST_REPO, TEST_IMAGE, "push"),
        ]);

        let registered = f
            .service
            .notify_registry_events(Some(TEST_REPO.to_string()), envelope)
            .await
            .unwrap();

        assert_eq!(registered.len(), 2);
        assert_eq!(registered[0].id, registered[1].id);
        assert_eq!(f.tools.created_count(), 1);
        // both pushes still refreshed version metadata
        assert_eq!(f.versions.recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_existing_tool_is_reused_and_version_still_updated() {
        let f = fixture();
        let existing = Tool {
            id: Uuid::new_v4(),
            registry_id: f.repo_registry_id,
            registry: TEST_REPO.to_string(),
            tool_group_id: f.library_group_id,
            tool_group: "library".to_string(),
            image: TEST_IMAGE.to_string(),
            owner: TEST_USER.to_string(),
            cpu: DEFAULT_TOOL_CPU.to_string(),
            ram: DEFAULT_TOOL_RAM.to_string(),
            created_at: chrono::Utc::now(),
        };
        f.tools.insert(existing.clone());

        let envelope = envelope(vec![event(TEST_USER, TEST_REPO, TEST_IMAGE, "push")]);
        let registered = f
            .service
            .notify_registry_events(Some(TEST_REPO.to_string()), envelope)
            .await
            .unwrap();

        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].id, existing.id);
        assert_eq!(f.tools.created_count(), 0);

        let versions = f.versions.recorded();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].tool_id, existing.id);
        assert_eq!(versions[0].version, LATEST);
        assert_eq!(versions[0].digest, DIGEST);
        assert_eq!(versions[0].size, DOCKER_SIZE);
    }

    #[tokio::test]
    async fn test_registry_service_rejects_empty_path() {
        let f = fixture();
        let service = RegistryService::new(f.registries.clone());

        let result = service
            .create_registry(
                TEST_USER,
                CreateRegistry {
                    path: "  ".to_string(),
                    description: None,
                    external_url: None,
                },
            )
            .await;

        assert!(matches!(result, Err(RegistryError::Validation(_))));
    }
}
