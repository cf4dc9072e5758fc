//! Tool and tool version stores
//!
//! Tools are uniquely keyed by (registry, image); the `tools` table carries a
//! uniqueness constraint so concurrent registrations of the same image
//! surface as a conflict instead of a duplicate row.

use async_trait::async_trait;
use sqlx::PgPool;
use strand_core::domain::registry::Tool;
use uuid::Uuid;

use super::StoreResult;

/// Store trait for tool lookup and creation
#[async_trait]
pub trait ToolStore: Send + Sync {
    /// Find the tool registered for this image within a registry
    async fn find_by_image(&self, registry_id: Uuid, image: &str) -> StoreResult<Option<Tool>>;

    /// Persist a new tool, returning it with its stored identity
    async fn create(&self, tool: &Tool) -> StoreResult<Tool>;

    /// Load all tools of a registry whose image is in the given set
    async fn load_all_by_registry_and_image_in(
        &self,
        registry_id: Uuid,
        images: &[String],
    ) -> StoreResult<Vec<Tool>>;
}

/// Store trait for per-tag version metadata
///
/// Upserts are idempotent per (tool, version): a repeated push of the same
/// tag overwrites digest and size rather than adding a row.
#[async_trait]
pub trait ToolVersionStore: Send + Sync {
    async fn upsert_version(
        &self,
        tool_id: Uuid,
        version: &str,
        digest: &str,
        size: i64,
    ) -> StoreResult<()>;
}

/// Postgres implementation of [`ToolStore`]
pub struct PgToolStore {
    pool: PgPool,
}

impl PgToolStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ToolStore for PgToolStore {
    async fn find_by_image(&self, registry_id: Uuid, image: &str) -> StoreResult<Option<Tool>> {
        let row = sqlx::query_as::<_, ToolRow>(
            r#"
            SELECT t.id, t.registry_id, r.path AS registry, t.tool_group_id,
                   g.name AS tool_group, t.image, t.owner, t.cpu, t.ram,
                   t.created_at
            FROM tools t
            JOIN docker_registries r ON r.id = t.registry_id
            JOIN tool_groups g ON g.id = t.tool_group_id
            WHERE t.registry_id = $1 AND t.image = $2
            "#,
        )
        .bind(registry_id)
        .bind(image)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, tool: &Tool) -> StoreResult<Tool> {
        sqlx::query(
            r#"
            INSERT INTO tools (id, registry_id, tool_group_id, image, owner,
                               cpu, ram, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(tool.id)
        .bind(tool.registry_id)
        .bind(tool.tool_group_id)
        .bind(&tool.image)
        .bind(&tool.owner)
        .bind(&tool.cpu)
        .bind(&tool.ram)
        .bind(tool.created_at)
        .execute(&self.pool)
        .await?;

        Ok(tool.clone())
    }

    async fn load_all_by_registry_and_image_in(
        &self,
        registry_id: Uuid,
        images: &[String],
    ) -> StoreResult<Vec<Tool>> {
        let rows = sqlx::query_as::<_, ToolRow>(
            r#"
            SELECT t.id, t.registry_id, r.path AS registry, t.tool_group_id,
                   g.name AS tool_group, t.image, t.owner, t.cpu, t.ram,
                   t.created_at
            FROM tools t
            JOIN docker_registries r ON r.id = t.registry_id
            JOIN tool_groups g ON g.id = t.tool_group_id
            WHERE t.registry_id = $1 AND t.image = ANY($2)
            "#,
        )
        .bind(registry_id)
        .bind(images)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

/// Postgres implementation of [`ToolVersionStore`]
pub struct PgToolVersionStore {
    pool: PgPool,
}

impl PgToolVersionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ToolVersionStore for PgToolVersionStore {
    async fn upsert_version(
        &self,
        tool_id: Uuid,
        version: &str,
        digest: &str,
        size: i64,
    ) -> StoreResult<()> {
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO tool_versions (tool_id, version, digest, size, modified_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (tool_id, version) DO UPDATE SET
                digest = EXCLUDED.digest,
                size = EXCLUDED.size,
                modified_at = EXCLUDED.modified_at
            "#,
        )
        .bind(tool_id)
        .bind(version)
        .bind(digest)
        .bind(size)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ToolRow {
    id: Uuid,
    registry_id: Uuid,
    registry: String,
    tool_group_id: Uuid,
    tool_group: String,
    image: String,
    owner: String,
    cpu: String,
    ram: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ToolRow> for Tool {
    fn from(row: ToolRow) -> Self {
        Tool {
            id: row.id,
            registry_id: row.registry_id,
            registry: row.registry,
            tool_group_id: row.tool_group_id,
            tool_group: row.tool_group,
            image: row.image,
            owner: row.owner,
            cpu: row.cpu,
            ram: row.ram,
            created_at: row.created_at,
        }
    }
}
