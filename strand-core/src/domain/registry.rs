//! Docker registry domain types
//!
//! A registry holds tool groups; a group holds tools; a tool accumulates
//! versions as tags are pushed. Tools are uniquely keyed by image path
//! within a registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A docker registry known to the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerRegistry {
    pub id: Uuid,
    /// Registry host path, e.g. "registry.example.com:5000". Unique.
    pub path: String,
    pub description: Option<String>,
    /// Alternative host under which push notifications may arrive.
    pub external_url: Option<String>,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// A named group of tools within a registry
///
/// Unique per (registry, name). Created lazily when a push event targets a
/// group that does not exist yet and the actor may write to the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolGroup {
    pub id: Uuid,
    pub registry_id: Uuid,
    pub name: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// A tool registered from pushed docker images
///
/// `image` is the repository path within the registry ("group/name").
/// Unique per (registry, image); repeated pushes resolve to the same tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: Uuid,
    pub registry_id: Uuid,
    /// Registry host path, denormalized for display.
    pub registry: String,
    pub tool_group_id: Uuid,
    /// Group name, denormalized for display.
    pub tool_group: String,
    pub image: String,
    pub owner: String,
    pub cpu: String,
    pub ram: String,
    pub created_at: DateTime<Utc>,
}

/// Metadata for one pushed tag of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolVersion {
    pub tool_id: Uuid,
    pub version: String,
    pub digest: String,
    pub size: i64,
    pub modified_at: DateTime<Utc>,
}
