//! Tool group store
//!
//! Handles all database operations related to tool groups.

use async_trait::async_trait;
use sqlx::PgPool;
use strand_core::domain::registry::ToolGroup;
use uuid::Uuid;

use super::StoreResult;

/// Store trait for tool group lookup and creation
#[async_trait]
pub trait ToolGroupStore: Send + Sync {
    /// Whether a group with this name exists within the registry
    async fn exists(&self, registry_id: Uuid, name: &str) -> StoreResult<bool>;

    /// Load a group by (registry, name)
    async fn load(&self, registry_id: Uuid, name: &str) -> StoreResult<Option<ToolGroup>>;

    /// Persist a new group
    async fn create(&self, group: &ToolGroup) -> StoreResult<()>;
}

/// Postgres implementation of [`ToolGroupStore`]
pub struct PgToolGroupStore {
    pool: PgPool,
}

impl PgToolGroupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ToolGroupStore for PgToolGroupStore {
    async fn exists(&self, registry_id: Uuid, name: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM tool_groups
            WHERE registry_id = $1 AND name = $2
            "#,
        )
        .bind(registry_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn load(&self, registry_id: Uuid, name: &str) -> StoreResult<Option<ToolGroup>> {
        let row = sqlx::query_as::<_, ToolGroupRow>(
            r#"
            SELECT id, registry_id, name, owner, created_at
            FROM tool_groups
            WHERE registry_id = $1 AND name = $2
            "#,
        )
        .bind(registry_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, group: &ToolGroup) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tool_groups (id, registry_id, name, owner, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(group.id)
        .bind(group.registry_id)
        .bind(&group.name)
        .bind(&group.owner)
        .bind(group.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ToolGroupRow {
    id: Uuid,
    registry_id: Uuid,
    name: String,
    owner: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ToolGroupRow> for ToolGroup {
    fn from(row: ToolGroupRow) -> Self {
        ToolGroup {
            id: row.id,
            registry_id: row.registry_id,
            name: row.name,
            owner: row.owner,
            created_at: row.created_at,
        }
    }
}
