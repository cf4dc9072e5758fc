//! Permission checks
//!
//! Guarded operations call the checker explicitly at their start instead of
//! relying on interception. The rule is deliberately small: the owner of an
//! entity may always write it; anyone else needs an explicit grant row.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreResult;

/// The entity a write is being checked against
#[derive(Debug, Clone)]
pub enum AclTarget {
    Registry { id: Uuid, owner: String },
    ToolGroup { id: Uuid, owner: String },
    Run { id: Uuid, owner: String },
}

impl AclTarget {
    fn kind(&self) -> &'static str {
        match self {
            AclTarget::Registry { .. } => "registry",
            AclTarget::ToolGroup { .. } => "tool_group",
            AclTarget::Run { .. } => "run",
        }
    }

    fn id(&self) -> Uuid {
        match self {
            AclTarget::Registry { id, .. }
            | AclTarget::ToolGroup { id, .. }
            | AclTarget::Run { id, .. } => *id,
        }
    }

    fn owner(&self) -> &str {
        match self {
            AclTarget::Registry { owner, .. }
            | AclTarget::ToolGroup { owner, .. }
            | AclTarget::Run { owner, .. } => owner,
        }
    }
}

/// Checker trait for write permissions
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn is_write_allowed(&self, user: &str, target: &AclTarget) -> StoreResult<bool>;
}

/// Postgres implementation of [`PermissionChecker`]
pub struct PgPermissionChecker {
    pool: PgPool,
}

impl PgPermissionChecker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionChecker for PgPermissionChecker {
    async fn is_write_allowed(&self, user: &str, target: &AclTarget) -> StoreResult<bool> {
        if user == target.owner() {
            return Ok(true);
        }

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM permissions
            WHERE user_name = $1 AND entity_kind = $2 AND entity_id = $3
                  AND can_write
            "#,
        )
        .bind(user)
        .bind(target.kind())
        .bind(target.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}
