//! Run store
//!
//! Handles all database operations related to runs.

use async_trait::async_trait;
use sqlx::PgPool;
use strand_core::domain::run::{Run, RunInstance, RunParameter, RunStatus};
use uuid::Uuid;

use super::{StoreError, StoreResult};

/// Store trait for run persistence
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Load a run by id
    async fn load(&self, id: Uuid) -> StoreResult<Option<Run>>;

    /// Persist a freshly launched run
    async fn create(&self, run: &Run) -> StoreResult<()>;

    /// Persist the run's current status (and finish time, when terminal)
    async fn update_status(&self, run: &Run) -> StoreResult<()>;

    /// Load runs by id, preserving no particular order
    async fn load_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Run>>;

    /// List all runs, most recently started first
    async fn list_all(&self) -> StoreResult<Vec<Run>>;
}

/// Postgres implementation of [`RunStore`]
pub struct PgRunStore {
    pool: PgPool,
}

impl PgRunStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunStore for PgRunStore {
    async fn load(&self, id: Uuid) -> StoreResult<Option<Run>> {
        let row = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT id, pipeline_id, status, docker_image, owner, node_name,
                   node_type, node_disk, service_urls, parameters,
                   started_at, finished_at
            FROM runs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, run: &Run) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO runs (id, pipeline_id, status, docker_image, owner,
                              node_name, node_type, node_disk, service_urls,
                              parameters, started_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(run.id)
        .bind(run.pipeline_id)
        .bind(status_to_string(run.status))
        .bind(&run.docker_image)
        .bind(&run.owner)
        .bind(run.instance.as_ref().map(|i| i.node_name.clone()))
        .bind(run.instance.as_ref().and_then(|i| i.node_type.clone()))
        .bind(run.instance.as_ref().and_then(|i| i.node_disk))
        .bind(serde_json::to_value(&run.service_urls).map_err(to_store_error)?)
        .bind(serde_json::to_value(&run.parameters).map_err(to_store_error)?)
        .bind(run.started_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status(&self, run: &Run) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE runs
            SET status = $1, finished_at = $2
            WHERE id = $3
            "#,
        )
        .bind(status_to_string(run.status))
        .bind(run.finished_at)
        .bind(run.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Run>> {
        let rows = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT id, pipeline_id, status, docker_image, owner, node_name,
                   node_type, node_disk, service_urls, parameters,
                   started_at, finished_at
            FROM runs
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<Run>> {
        let rows = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT id, pipeline_id, status, docker_image, owner, node_name,
                   node_type, node_disk, service_urls, parameters,
                   started_at, finished_at
            FROM runs
            ORDER BY started_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

fn to_store_error(err: serde_json::Error) -> StoreError {
    StoreError::Database(sqlx::Error::Encode(Box::new(err)))
}

// =============================================================================
// Helper Functions
// =============================================================================

pub(crate) fn status_to_string(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Running => "Running",
        RunStatus::Pausing => "Pausing",
        RunStatus::Paused => "Paused",
        RunStatus::Resuming => "Resuming",
        RunStatus::Stopped => "Stopped",
        RunStatus::Failure => "Failure",
        RunStatus::Success => "Success",
    }
}

pub(crate) fn string_to_status(s: &str) -> RunStatus {
    match s {
        "Running" => RunStatus::Running,
        "Pausing" => RunStatus::Pausing,
        "Paused" => RunStatus::Paused,
        "Resuming" => RunStatus::Resuming,
        "Stopped" => RunStatus::Stopped,
        "Failure" => RunStatus::Failure,
        "Success" => RunStatus::Success,
        _ => RunStatus::Failure,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct RunRow {
    id: Uuid,
    pipeline_id: Option<Uuid>,
    status: String,
    docker_image: String,
    owner: String,
    node_name: Option<String>,
    node_type: Option<String>,
    node_disk: Option<i64>,
    service_urls: serde_json::Value,
    parameters: serde_json::Value,
    started_at: chrono::DateTime<chrono::Utc>,
    finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<RunRow> for Run {
    fn from(row: RunRow) -> Self {
        let instance = row.node_name.map(|node_name| RunInstance {
            node_name,
            node_type: row.node_type,
            node_disk: row.node_disk,
        });

        let parameters: Vec<RunParameter> =
            serde_json::from_value(row.parameters).unwrap_or_default();
        let service_urls = serde_json::from_value(row.service_urls).unwrap_or_default();

        Run {
            id: row.id,
            pipeline_id: row.pipeline_id,
            status: string_to_status(&row.status),
            docker_image: row.docker_image,
            owner: row.owner,
            instance,
            service_urls,
            parameters,
            started_at: row.started_at,
            finished_at: row.finished_at,
        }
    }
}
