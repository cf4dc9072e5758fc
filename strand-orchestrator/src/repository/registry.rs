//! Docker registry store
//!
//! Handles all database operations related to docker registries.

use async_trait::async_trait;
use sqlx::PgPool;
use strand_core::domain::registry::DockerRegistry;

use super::StoreResult;

/// Store trait for registry lookup and registration
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Persist a new registry
    async fn create(&self, registry: &DockerRegistry) -> StoreResult<()>;

    /// Load a registry by its primary host path
    async fn load_by_path(&self, path: &str) -> StoreResult<Option<DockerRegistry>>;

    /// Load a registry by its external URL, the fallback for notifications
    /// addressed to an alternative host
    async fn load_by_external_url(&self, url: &str) -> StoreResult<Option<DockerRegistry>>;

    /// List all registries
    async fn list_all(&self) -> StoreResult<Vec<DockerRegistry>>;
}

/// Postgres implementation of [`RegistryStore`]
pub struct PgRegistryStore {
    pool: PgPool,
}

impl PgRegistryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistryStore for PgRegistryStore {
    async fn create(&self, registry: &DockerRegistry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO docker_registries (id, path, description, external_url,
                                           owner, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(registry.id)
        .bind(&registry.path)
        .bind(&registry.description)
        .bind(&registry.external_url)
        .bind(&registry.owner)
        .bind(registry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_by_path(&self, path: &str) -> StoreResult<Option<DockerRegistry>> {
        let row = sqlx::query_as::<_, RegistryRow>(
            r#"
            SELECT id, path, description, external_url, owner, created_at
            FROM docker_registries
            WHERE path = $1
            "#,
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn load_by_external_url(&self, url: &str) -> StoreResult<Option<DockerRegistry>> {
        let row = sqlx::query_as::<_, RegistryRow>(
            r#"
            SELECT id, path, description, external_url, owner, created_at
            FROM docker_registries
            WHERE external_url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_all(&self) -> StoreResult<Vec<DockerRegistry>> {
        let rows = sqlx::query_as::<_, RegistryRow>(
            r#"
            SELECT id, path, description, external_url, owner, created_at
            FROM docker_registries
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct RegistryRow {
    id: uuid::Uuid,
    path: String,
    description: Option<String>,
    external_url: Option<String>,
    owner: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RegistryRow> for DockerRegistry {
    fn from(row: RegistryRow) -> Self {
        DockerRegistry {
            id: row.id,
            path: row.path,
            description: row.description,
            external_url: row.external_url,
            owner: row.owner,
            created_at: row.created_at,
        }
    }
}
