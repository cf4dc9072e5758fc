//! Pipeline store
//!
//! Handles all database operations related to pipelines.

use async_trait::async_trait;
use sqlx::PgPool;
use strand_core::domain::pipeline::{Pipeline, PipelineConfig};
use strand_core::dto::pipeline::CreatePipeline;
use uuid::Uuid;

use super::StoreResult;

/// Store trait for pipeline persistence
#[async_trait]
pub trait PipelineStore: Send + Sync {
    async fn create(&self, req: CreatePipeline) -> StoreResult<Pipeline>;
    async fn load(&self, id: Uuid) -> StoreResult<Option<Pipeline>>;
    async fn list_all(&self) -> StoreResult<Vec<Pipeline>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Postgres implementation of [`PipelineStore`]
pub struct PgPipelineStore {
    pool: PgPool,
}

impl PgPipelineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PipelineStore for PgPipelineStore {
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

        sqlx::query(
            r#"
            INSERT INTO pipelines (id, name, description, docker_image,
                                   created_at, updated_at, tags, instance_type,
                                   disk_size, env_vars)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(pipeline.id)
        .bind(&pipeline.name)
        .bind(&pipeline.description)
        .bind(&pipeline.docker_image)
        .bind(pipeline.created_at)
        .bind(pipeline.updated_at)
        .bind(&pipeline.tags)
        .bind(&pipeline.config.instance_type)
        .bind(pipeline.config.disk_size)
        .bind(serde_json::to_value(&pipeline.config.env_vars).unwrap_or_default())
        .execute(&self.pool)
        .await?;

        Ok(pipeline)
    }

    async fn load(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
        let row = sqlx::query_as::<_, PipelineRow>(
            r#"
            SELECT id, name, description, docker_image, created_at, updated_at,
                   tags, instance_type, disk_size, env_vars
            FROM pipelines
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_all(&self) -> StoreResult<Vec<Pipeline>> {
        let rows = sqlx::query_as::<_, PipelineRow>(
            r#"
            SELECT id, name, description, docker_image, created_at, updated_at,
                   tags, instance_type, disk_size, env_vars
            FROM pipelines
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM pipelines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct PipelineRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    docker_image: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    tags: Vec<String>,
    instance_type: Option<String>,
    disk_size: Option<i64>,
    env_vars: serde_json::Value,
}

impl From<PipelineRow> for Pipeline {
    fn from(row: PipelineRow) -> Self {
        let config = PipelineConfig {
            instance_type: row.instance_type,
            disk_size: row.disk_size,
            env_vars: serde_json::from_value(row.env_vars).unwrap_or_default(),
        };

        Pipeline {
            id: row.id,
            name: row.name,
            description: row.description,
            docker_image: row.docker_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
            tags: row.tags,
            config,
        }
    }
}
